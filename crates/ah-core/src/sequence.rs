//! Last-request-wins result publication.
//!
//! Callers tag each computation with a ticket before starting it. When the
//! result is ready it is published through a [`LatestSlot`], which accepts
//! it only if no newer ticket has been issued in the meantime. Nothing is
//! cancelled; stale results are dropped on arrival.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;

/// Sequence number of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket newer than every ticket issued before it.
    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Sequence number of the most recently issued ticket (0 if none).
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest()
    }
}

/// Holds the result of the latest request.
#[derive(Debug)]
pub struct LatestSlot<T> {
    sequencer: Arc<RequestSequencer>,
    value: Mutex<Option<(RequestTicket, T)>>,
}

impl<T> LatestSlot<T> {
    pub fn new(sequencer: Arc<RequestSequencer>) -> Self {
        Self {
            sequencer,
            value: Mutex::new(None),
        }
    }

    pub fn sequencer(&self) -> &Arc<RequestSequencer> {
        &self.sequencer
    }

    /// Store `value` if `ticket` is still the latest issued ticket.
    ///
    /// Returns `false` (and drops `value`) for stale tickets.
    pub fn publish(&self, ticket: RequestTicket, value: T) -> bool {
        let mut guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
        // Checked under the lock so a stale publisher cannot overwrite a
        // result stored by a newer one.
        if !self.sequencer.is_current(ticket) {
            trace!(ticket = ticket.0, latest = self.sequencer.latest(), "discarded stale result");
            return false;
        }
        if matches!(guard.as_ref(), Some((stored, _)) if *stored > ticket) {
            return false;
        }
        *guard = Some((ticket, value));
        true
    }

    /// Ticket of the stored result.
    pub fn ticket(&self) -> Option<RequestTicket> {
        let guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|(t, _)| *t)
    }

    pub fn take(&self) -> Option<T> {
        let mut guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
        guard.take().map(|(_, v)| v)
    }
}

impl<T: Clone> LatestSlot<T> {
    pub fn get(&self) -> Option<T> {
        let guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|(_, v)| v.clone())
    }
}
