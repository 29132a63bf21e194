//! Request sequencing for background fetches.
//!
//! Every request gets a number from one monotonically increasing counter.
//! Completions are judged per kind against the newest committed number, so
//! an older response that lands after a newer one has committed is dropped
//! no matter when it arrives.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Forecast,
    Columns,
}

/// Where the most recent activity of one kind stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    Pending,
    Committed,
    Failed,
}

/// What to do with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Newest data so far: commit it (or record the failure).
    Accept,
    /// Older than something already committed, or never issued.
    Stale,
}

#[derive(Debug, Default)]
struct KindState {
    in_flight: BTreeSet<u64>,
    latest_committed: u64,
    /// Newest request that failed; an older success must not hide it.
    latest_failed: u64,
    last_outcome: RequestPhase,
    last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    last_issued: u64,
    forecast: KindState,
    columns: KindState,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sequence number and mark it pending.
    pub fn issue(&mut self, kind: FetchKind) -> u64 {
        self.last_issued = self.last_issued.wrapping_add(1);
        let seq = self.last_issued;
        self.kind_mut(kind).in_flight.insert(seq);
        seq
    }

    pub fn resolve_success(&mut self, kind: FetchKind, seq: u64) -> Verdict {
        let state = self.kind_mut(kind);
        if !state.in_flight.remove(&seq) || seq <= state.latest_committed {
            return Verdict::Stale;
        }
        state.latest_committed = seq;
        if seq > state.latest_failed {
            state.last_outcome = RequestPhase::Committed;
            state.last_error = None;
        }
        Verdict::Accept
    }

    pub fn resolve_failure(&mut self, kind: FetchKind, seq: u64, message: String) -> Verdict {
        let state = self.kind_mut(kind);
        if !state.in_flight.remove(&seq) || seq <= state.latest_committed {
            return Verdict::Stale;
        }
        if seq > state.latest_failed {
            state.latest_failed = seq;
            state.last_outcome = RequestPhase::Failed;
            state.last_error = Some(message);
        }
        Verdict::Accept
    }

    pub fn phase(&self, kind: FetchKind) -> RequestPhase {
        let state = self.kind(kind);
        if state.in_flight.is_empty() {
            state.last_outcome
        } else {
            RequestPhase::Pending
        }
    }

    pub fn is_pending(&self, kind: FetchKind) -> bool {
        !self.kind(kind).in_flight.is_empty()
    }

    #[cfg(test)]
    pub fn latest_committed(&self, kind: FetchKind) -> u64 {
        self.kind(kind).latest_committed
    }

    pub fn last_error(&self, kind: FetchKind) -> Option<&str> {
        self.kind(kind).last_error.as_deref()
    }

    fn kind(&self, kind: FetchKind) -> &KindState {
        match kind {
            FetchKind::Forecast => &self.forecast,
            FetchKind::Columns => &self.columns,
        }
    }

    fn kind_mut(&mut self, kind: FetchKind) -> &mut KindState {
        match kind {
            FetchKind::Forecast => &mut self.forecast,
            FetchKind::Columns => &mut self.columns,
        }
    }
}
