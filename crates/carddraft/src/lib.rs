//! # Carddraft Architecture
//!
//! Carddraft is a **draft-recovery library** for a card-creation form embedded in a larger
//! host application. While the form is open it snapshots the unsaved field values and tags
//! every few seconds, keyed by the form's template, and offers them back the next time a form
//! for that template opens. A clean close or a successful add discards the snapshot; a crash
//! doesn't, and that's the whole point.
//!
//! ## The Two Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (window system, widgets, timers)                      │
//! │  - Implements FormHost / Scheduler                          │
//! │  - Delivers lifecycle events and timer ticks                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Controller (controller.rs)                                 │
//! │  - Idle / Open session state machine                        │
//! │  - Restore on open, snapshot on tick, discard on close/add  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - DraftStore: keyed, timestamped, write-through mapping    │
//! │  - FsBackend (production), MemBackend (testing)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Never Hurt the Host
//!
//! Losing a draft is acceptable; crashing or blocking the host is not. Controller event
//! handlers never return errors. Every storage failure degrades to "no draft available" or
//! "draft not saved this cycle" and is reported through [`tracing`] only. The library never
//! installs a subscriber.
//!
//! ## Wiring
//!
//! The host constructs one [`store::FileDraftStore`] per profile and one
//! [`controller::DraftController`] per form window, passing the store by reference into each
//! event:
//!
//! ```no_run
//! use carddraft::{DraftConfig, DraftController, FileDraftStore};
//! # use carddraft::host::{Scheduler, TimerHandle};
//! # struct HostTimers;
//! # impl Scheduler for HostTimers {
//! #     fn schedule(&mut self, _: std::time::Duration) -> TimerHandle { TimerHandle(1) }
//! #     fn cancel(&mut self, _: TimerHandle) {}
//! # }
//! # let profile_dir = std::path::Path::new("/tmp/profile");
//! let config = DraftConfig::load(None)?;
//! let mut store = FileDraftStore::open(profile_dir, &config);
//! let mut controller = DraftController::new(config, HostTimers);
//! // controller.on_form_opened(&mut store, &mut form);
//! # Ok::<(), carddraft::DraftError>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`controller`]: Form lifecycle state machine
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: The [`model::Draft`] type, timestamps, positional field mapping
//! - [`host`]: Collaborator traits the host implements
//! - [`config`]: Load-time settings
//! - [`error`]: Error types

pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod model;
pub mod store;

pub use config::DraftConfig;
pub use controller::{DraftController, RestoreOutcome, SessionState, TickOutcome};
pub use error::{DraftError, Result};
pub use model::Draft;
pub use store::{DraftStore, FileDraftStore, InMemoryDraftStore};
