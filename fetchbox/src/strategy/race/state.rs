use fetchbox_core::ResponseSource;

/// What the race should do after one of its branches completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceStep {
    /// Resolve with the response of the branch that just completed.
    Resolve(ResponseSource),
    /// Both branches failed, resolve with the fallback substitute.
    Fallback,
    /// The other branch may still produce a usable result.
    Wait,
    /// The race was already decided by the other branch.
    Ignore,
}

/// Per-invocation bookkeeping of the two race branches.
///
/// All flags start `false`. The transitions are pure: they only look at and
/// update the flags and report the resulting [`RaceStep`], leaving side
/// effects (traces, store refresh, fallback) to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceState {
    /// The network produced the winning response.
    pub network_settled: bool,
    /// The store produced the winning response.
    pub cache_settled: bool,
    /// The network answered with something other than `200`.
    pub network_failed: bool,
    /// The store had nothing to offer.
    pub cache_failed: bool,
}

impl RaceState {
    /// Fresh state for a new invocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// The network branch completed.
    pub fn on_network(&mut self, success: bool) -> RaceStep {
        if self.cache_settled {
            return RaceStep::Ignore;
        }
        if success {
            self.network_settled = true;
            RaceStep::Resolve(ResponseSource::Network)
        } else {
            self.network_failed = true;
            self.both_failed()
        }
    }

    /// The store branch completed, with or without a stored response.
    pub fn on_store(&mut self, hit: bool) -> RaceStep {
        if hit && !self.network_settled {
            self.cache_settled = true;
            return RaceStep::Resolve(ResponseSource::Store);
        }
        self.cache_failed = true;
        if self.network_settled {
            RaceStep::Ignore
        } else {
            self.both_failed()
        }
    }

    /// Whether either branch already won.
    pub fn is_settled(&self) -> bool {
        self.network_settled || self.cache_settled
    }

    fn both_failed(&self) -> RaceStep {
        if self.network_failed && self.cache_failed {
            RaceStep::Fallback
        } else {
            RaceStep::Wait
        }
    }
}
