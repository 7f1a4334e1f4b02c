//! Network link state as seen by the reporter.
//!
//! The reporter itself never reconnects. Rejoining after the access point
//! drops is the station's job, the same way the WiFi stack keeps trying in
//! the background once it has been told to join a network.

use std::{
    fmt::Debug,
    sync::atomic::{AtomicBool, Ordering},
};

use log::warn;

/// Network association the reporter checks before every post.
pub trait Link {
    fn is_connected(&self) -> bool;
}

/// Folds a status query into a plain answer. A driver that cannot answer
/// counts as disconnected.
pub fn connected_or_offline<E: Debug>(status: Result<bool, E>) -> bool {
    status.unwrap_or_else(|err| {
        warn!("Could not query link status: {:?}", err);
        false
    })
}

/// Station events that matter for rejoining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationEvent {
    Disconnected,
    Stopped,
}

/// Decides when the station should be asked to associate again.
///
/// Armed once a connection is requested, disarmed when the station is
/// stopped. Shared with the event loop callback, hence the atomic.
#[derive(Debug, Default)]
pub struct RejoinPolicy {
    armed: AtomicBool,
}

impl RejoinPolicy {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Returns true if `event` should trigger a new association attempt.
    pub fn should_rejoin(&self, event: StationEvent) -> bool {
        match event {
            StationEvent::Disconnected => self.is_armed(),
            StationEvent::Stopped => {
                self.disarm();
                false
            }
        }
    }
}
