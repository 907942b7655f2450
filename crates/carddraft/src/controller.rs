//! # Draft Lifecycle
//!
//! [`DraftController`] ties form events to [`DraftStore`] operations. Each form session is a
//! two-state machine:
//!
//! ```text
//!            on_form_opened                 on_note_created / on_form_closed
//!   Idle ───────────────────────► Open ─────────────────────────────────────► Idle
//!                                 │  ▲
//!                 on_tick,        │  │
//!                 on_template_changed
//!                                 └──┘
//! ```
//!
//! `Open` carries the tracked template key and the armed timer. The key changes in place when
//! the user switches templates; that never restores or migrates anything.
//!
//! ## Transitions
//!
//! - **Opened**: prune stale drafts, look up the draft for the form's template, push it into the
//!   form positionally if there is one, arm the autosave timer.
//! - **Tick**: snapshot the form under its current template key. Ticks for a timer the controller
//!   no longer holds do nothing.
//! - **Template changed**: track the new key. The old template's draft stays on disk.
//! - **Note created** / **Form closed**: disarm the timer and delete the draft for the tracked key.
//!   A close with no identified template clears all drafts.
//!
//! A crash fires none of these, which is exactly what leaves the last snapshot on disk for the
//! next session to restore.
//!
//! ## Failure Policy
//!
//! No handler returns an error. Store failures are logged and degrade to "no draft" or "not
//! saved this cycle"; the next tick simply tries again.

use crate::config::DraftConfig;
use crate::host::{Clock, FormHost, Scheduler, SystemClock, TimerHandle};
use crate::model::{self, Draft};
use crate::store::backend::DraftBackend;
use crate::store::DraftStore;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Open {
        template_key: String,
        timer: TimerHandle,
    },
}

/// What happened when a form was opened.
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    Restored(Draft),
    NoDraft,
}

/// What a timer tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Saved,
    /// The form reported no template identity.
    NoTemplate,
    /// The form was blank and `skip_blank` is on.
    SkippedBlank,
    /// The store couldn't flush; retried on the next tick.
    SaveFailed,
    /// No session owns this timer.
    Inactive,
}

pub struct DraftController<S: Scheduler, C: Clock = SystemClock> {
    config: DraftConfig,
    scheduler: S,
    clock: C,
    state: SessionState,
}

impl<S: Scheduler> DraftController<S, SystemClock> {
    pub fn new(config: DraftConfig, scheduler: S) -> Self {
        Self::with_clock(config, scheduler, SystemClock)
    }
}

impl<S: Scheduler, C: Clock> DraftController<S, C> {
    pub fn with_clock(config: DraftConfig, scheduler: S, clock: C) -> Self {
        Self {
            config,
            scheduler,
            clock,
            state: SessionState::Idle,
        }
    }

    pub fn config(&self) -> &DraftConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Template key of the open session, if any.
    pub fn active_template(&self) -> Option<&str> {
        match &self.state {
            SessionState::Open { template_key, .. } => Some(template_key),
            SessionState::Idle => None,
        }
    }

    pub fn on_form_opened<B: DraftBackend, F: FormHost>(
        &mut self,
        store: &mut DraftStore<B>,
        form: &mut F,
    ) -> RestoreOutcome {
        if let Some(timer) = self.disarm() {
            debug!(timer = timer.0, "Form reopened while a session was open, re-arming");
        }

        let template_key = form.current_template_identity();
        let now = self.clock.now();
        let max_age = self.config.max_age();

        if let Err(e) = store.prune_stale(max_age, now) {
            warn!(error = %e, "Failed to persist pruned drafts");
        }

        let outcome = match store.get(&template_key, max_age, now) {
            Some(draft) => {
                let slots = form.current_field_values().len();
                if draft.fields.len() != slots {
                    debug!(
                        template = %template_key,
                        stored = draft.fields.len(),
                        slots,
                        "Field count changed since save, restoring by position"
                    );
                }
                form.set_field_values(model::map_fields_positionally(&draft.fields, slots));
                form.set_tags(draft.tags.clone());
                info!(
                    template = %template_key,
                    age_secs = draft.age_seconds(now),
                    saved_at = ?draft.saved_at_utc(),
                    "Restored draft"
                );
                RestoreOutcome::Restored(draft)
            }
            None => RestoreOutcome::NoDraft,
        };

        let timer = self.scheduler.schedule(self.config.autosave_interval());
        self.state = SessionState::Open {
            template_key,
            timer,
        };
        outcome
    }

    pub fn on_tick<B: DraftBackend, F: FormHost>(
        &mut self,
        handle: TimerHandle,
        store: &mut DraftStore<B>,
        form: &F,
    ) -> TickOutcome {
        let tracked = match &mut self.state {
            SessionState::Open {
                template_key,
                timer,
            } if *timer == handle => template_key,
            _ => {
                debug!(timer = handle.0, "Ignoring tick for inactive timer");
                return TickOutcome::Inactive;
            }
        };

        let template_key = form.current_template_identity();
        if template_key.is_empty() {
            return TickOutcome::NoTemplate;
        }
        if *tracked != template_key {
            *tracked = template_key.clone();
        }

        let fields = form.current_field_values();
        let tags = form.current_tags();
        if self.config.skip_blank && model::is_blank(&fields, &tags) {
            return TickOutcome::SkippedBlank;
        }

        match store.put(&template_key, fields, tags, self.clock.now()) {
            Ok(()) => {
                debug!(template = %template_key, "Autosaved draft");
                TickOutcome::Saved
            }
            Err(e) => {
                warn!(template = %template_key, error = %e, "Autosave failed, will retry");
                TickOutcome::SaveFailed
            }
        }
    }

    /// Track a new template for the open form. Nothing is restored or migrated.
    pub fn on_template_changed(&mut self, new_identity: &str) {
        match &mut self.state {
            SessionState::Open { template_key, .. } => {
                debug!(from = %template_key, to = new_identity, "Template changed");
                *template_key = new_identity.to_string();
            }
            SessionState::Idle => {
                debug!(to = new_identity, "Template change with no open form, ignoring");
            }
        }
    }

    /// The note was added: its draft is no longer needed.
    pub fn on_note_created<B: DraftBackend>(&mut self, store: &mut DraftStore<B>) {
        let Some(template_key) = self.end_session() else {
            return;
        };
        if let Err(e) = store.delete(&template_key) {
            warn!(template = %template_key, error = %e, "Failed to discard draft after add");
        }
    }

    /// The user closed the form without adding: an explicit discard.
    pub fn on_form_closed<B: DraftBackend>(&mut self, store: &mut DraftStore<B>) {
        let Some(template_key) = self.end_session() else {
            return;
        };
        let result = if template_key.is_empty() {
            warn!("Form closed with no identified template, clearing drafts for every template");
            store.clear_all()
        } else {
            debug!(template = %template_key, "Form closed, discarding draft");
            store.delete(&template_key)
        };
        if let Err(e) = result {
            warn!(template = %template_key, error = %e, "Failed to discard draft on close");
        }
    }

    fn end_session(&mut self) -> Option<String> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Open {
                template_key,
                timer,
            } => {
                self.scheduler.cancel(timer);
                Some(template_key)
            }
            SessionState::Idle => None,
        }
    }

    fn disarm(&mut self) -> Option<TimerHandle> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::Open { timer, .. } => {
                self.scheduler.cancel(timer);
                Some(timer)
            }
            SessionState::Idle => None,
        }
    }
}
