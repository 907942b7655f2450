//! # Host Collaborators
//!
//! The draft subsystem doesn't own a window, a widget tree or an event loop. It talks to the
//! host application through three narrow seams:
//!
//! - [`FormHost`]: read and write the open card-creation form.
//! - [`Scheduler`]: arm and disarm the periodic autosave timer.
//! - [`Clock`]: the current time, so staleness can be tested without sleeping.
//!
//! ## Timer Delivery
//!
//! [`Scheduler::schedule`] only arms the timer and returns a [`TimerHandle`]. When the timer
//! fires, the host calls [`crate::controller::DraftController::on_tick`] with that handle. The
//! controller ignores ticks for handles it no longer holds, so a tick that was already queued when
//! the form closed is harmless.

use crate::model;
use std::time::Duration;

/// The open card-creation form.
pub trait FormHost {
    /// Name of the template the form is currently using. Empty if none is loaded.
    fn current_template_identity(&self) -> String;

    /// Field values in template slot order. The length is the template's slot count.
    fn current_field_values(&self) -> Vec<String>;

    fn current_tags(&self) -> Vec<String>;

    /// Replace the form's field values, one per slot.
    fn set_field_values(&mut self, fields: Vec<String>);

    fn set_tags(&mut self, tags: Vec<String>);
}

/// Opaque id of an armed periodic timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Periodic scheduling primitive provided by the host.
pub trait Scheduler {
    /// Arm a timer that fires every `interval` until cancelled.
    fn schedule(&mut self, interval: Duration) -> TimerHandle;

    /// Disarm a timer. Cancelling an unknown or already-cancelled handle is a no-op.
    fn cancel(&mut self, handle: TimerHandle);
}

pub trait Clock {
    /// Seconds since the Unix epoch, fractional.
    fn now(&self) -> f64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        model::now_timestamp()
    }
}
