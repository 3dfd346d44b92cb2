//! Periodic autosave.
//!
//! The host owns the clock and calls [`Autosave::tick`] from its event loop; nothing here spawns
//! threads. A tick saves only when the page is dirty and the interval has elapsed since the last
//! attempt, so a failing backend is retried once per interval rather than on every tick.

use crate::persistence::PersistenceGateway;
use crate::store::PageStore;
use std::time::{Duration, Instant};

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveOutcome {
    /// Nothing to save.
    Clean,
    /// Dirty, but the interval has not elapsed yet.
    NotDue,
    /// The page was saved and is now clean.
    Saved,
    /// The save failed; the page stays dirty.
    Failed(String),
}

/// Interval-driven autosave state.
#[derive(Debug, Clone)]
pub struct Autosave {
    interval: Duration,
    last_run: Option<Instant>,
}

impl Autosave {
    /// Autosave attempting at most one save per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the last save attempt happened.
    pub fn last_run(&self) -> Option<Instant> {
        self.last_run
    }

    /// Save `store` through `gateway` if it is dirty and due.
    ///
    /// The first dirty tick is always due.
    pub fn tick(
        &mut self,
        store: &mut PageStore,
        gateway: &mut dyn PersistenceGateway,
        now: Instant,
    ) -> AutosaveOutcome {
        if !store.is_dirty() {
            return AutosaveOutcome::Clean;
        }
        if let Some(last) = self.last_run
            && now.saturating_duration_since(last) < self.interval
        {
            return AutosaveOutcome::NotDue;
        }

        self.last_run = Some(now);
        match store.save(gateway) {
            Ok(()) => AutosaveOutcome::Saved,
            Err(err) => {
                tracing::warn!(error = %err, "autosave failed");
                AutosaveOutcome::Failed(err.to_string())
            }
        }
    }
}
