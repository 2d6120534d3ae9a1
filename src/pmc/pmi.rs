//! The performance-monitoring-interrupt handler.

use super::{CoreCounts, Subsystem};
use crate::regs::{fixed_overflow_bit, Msr, RegisterBank, GLOBAL_STATUS_PMC_MASK, NFIXED};

/// Consumer-facing sink for freshly reconciled totals.
///
/// The profiling subsystem that exports counts lives outside this crate; the
/// handler pushes every updated total through this hook.
pub trait CountSink {
    /// Counter `ctr`'s accumulated total changed to `total`.
    fn count_updated(&mut self, ctr: u32, total: u64);
}

impl CountSink for () {
    fn count_updated(&mut self, _ctr: u32, _total: u64) {}
}

/// Owner of the configurable (non-fixed) counters.
///
/// When an overflow-status bit outside the fixed set is raised, the interrupt
/// is theirs to finish.
pub trait ConfigurableHandler {
    /// One or more configurable counters overflowed in the current interrupt.
    fn handle_overflow(&mut self);
}

impl ConfigurableHandler for () {
    fn handle_overflow(&mut self) {}
}

/// What an overflow interrupt ended up covering.
///
/// Returned for diagnostics; the interrupt is considered handled by virtue of
/// the handler returning at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmiOutcome {
    /// Bitmask of fixed counters reconciled in this invocation.
    pub fixed: u32,
    /// Whether configurable-counter overflow was delegated.
    pub configurable: bool,
}

impl Subsystem {
    /// Handle a performance-monitoring interrupt on the calling core.
    ///
    /// Reads the global overflow status once, then folds the wrap of every
    /// flagged fixed counter into the running totals: the counter wrapped
    /// from its snapshot through the top back to zero, so the snapshot resets
    /// and the events in between land in `core`. Several counters wrapping
    /// coincidentally are all reconciled in this one invocation, and the
    /// processed bits are acknowledged so the hardware can raise the next
    /// interrupt. Overflow of configurable counters is delegated to `kpc`.
    ///
    /// Runs in interrupt context, interrupts disabled (asserted). Must not be
    /// invoked on unsupported hardware: the probe never installs it there.
    pub fn handle_pmi<B, S, K>(
        &self,
        regs: &mut B,
        core: &mut CoreCounts,
        sink: &mut S,
        kpc: &mut K,
    ) -> PmiOutcome
    where
        B: RegisterBank,
        S: CountSink,
        K: ConfigurableHandler,
    {
        debug_assert!(self.supported);
        assert!(!regs.interrupts_enabled());

        let status = regs.read_msr(Msr::IA32_PERF_GLOBAL_STATUS);
        self.count_pmi();

        let mut fixed = 0u32;
        for ctr in 0..NFIXED {
            if status & fixed_overflow_bit(ctr) != 0 {
                fixed |= 1 << ctr;
                let total = core.wrap(ctr);
                sink.count_updated(ctr, total);
            }
        }
        if fixed != 0 {
            regs.write_msr(
                Msr::IA32_PERF_GLOBAL_OVF_CTRL,
                u64::from(fixed) << 32,
            );
        }

        let configurable = status & GLOBAL_STATUS_PMC_MASK != 0;
        if configurable {
            kpc.handle_overflow();
        }

        PmiOutcome {
            fixed,
            configurable,
        }
    }
}
