//! Per-core counter state and the snapshot arithmetic behind it.

use crate::regs::{CTR_MAX, NFIXED};
use derive_more::Index;

/// Software state for one core's fixed counters.
///
/// `snaps[i]` is the raw hardware value last written to or read from counter
/// `i`; `counts[i]` is the 64-bit running total of real events. At any point
/// outside a reconciliation, the total plus the delta still sitting in the
/// hardware register equals the true event count since counting began.
///
/// One instance exists per core and is owned by that core's transition and
/// interrupt code exclusively; nothing here is shared across cores.
#[derive(Default, Debug, Index)]
pub struct CoreCounts {
    /// Running totals, indexable by counter: `core[i]`.
    #[index]
    counts: [u64; NFIXED as usize],
    /// Raw hardware snapshots, the baselines for delta computation.
    snaps: [u64; NFIXED as usize],
}

impl CoreCounts {
    /// Fold the freshly read raw value `now` of counter `ctr` into the running
    /// total and advance the snapshot. Returns the new total.
    ///
    /// A raw value below the snapshot means the counter wrapped exactly once
    /// since the last reconciliation; any second wrap would have raised an
    /// overflow interrupt in between, which resets the snapshot to zero.
    pub(crate) fn fold(&mut self, ctr: u32, now: u64) -> u64 {
        let i = ctr as usize;
        let delta = if now < self.snaps[i] {
            (CTR_MAX - self.snaps[i]) + 1 + now
        } else {
            now - self.snaps[i]
        };
        self.counts[i] += delta;
        self.snaps[i] = now;
        self.counts[i]
    }

    /// Account for counter `ctr` having wrapped past `CTR_MAX` back to zero.
    ///
    /// Overflow interrupts are precise (one per wrap), so the events between
    /// the snapshot and the wrap point are exactly `CTR_MAX - snap + 1`. The
    /// snapshot resets to zero, the counter's new starting point. Returns the
    /// new total.
    pub(crate) fn wrap(&mut self, ctr: u32) -> u64 {
        let i = ctr as usize;
        let prior = (CTR_MAX - self.snaps[i]) + 1;
        self.counts[i] += prior;
        self.snaps[i] = 0;
        self.counts[i]
    }

    /// Raw hardware snapshot last recorded for counter `ctr`.
    pub fn snapshot(&self, ctr: u32) -> u64 {
        self.snaps[ctr as usize]
    }

    /// Accumulated event total for counter `ctr`.
    pub fn accumulated(&self, ctr: u32) -> u64 {
        self.counts[ctr as usize]
    }
}
