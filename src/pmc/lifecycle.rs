//! Counter sequencing across core power-state transitions.

use super::{CoreCounts, Subsystem};
use crate::regs::{Msr, RegisterBank, FIXED_CTR_CTRL_INIT, GLOBAL_CTRL_FIXED_EN, NFIXED};

impl Subsystem {
    /// Stop the fixed counters ahead of the calling core going idle.
    ///
    /// Clears the global enable register first, then folds whatever each
    /// counter accrued since the last reconciliation into the running totals
    /// and records the final snapshots. The counters stop counting, but no
    /// event is lost. Safe to call when the counters are already disabled.
    ///
    /// Must run with interrupts disabled on the calling core: the overflow
    /// handler mutates the same per-core state, and the two must never
    /// interleave.
    pub fn quiesce<B: RegisterBank>(&self, regs: &mut B, core: &mut CoreCounts) {
        if !self.supported {
            return;
        }
        assert!(!regs.interrupts_enabled());

        regs.write_msr(Msr::IA32_PERF_GLOBAL_CTRL, 0);
        for ctr in 0..NFIXED {
            core.fold(ctr, regs.read_counter(ctr));
        }
    }

    /// Resume counting on the calling core after it powers back up.
    ///
    /// Restores every counter register to the snapshot captured at the last
    /// [`Subsystem::quiesce`], so counting continues from exactly where it
    /// left off rather than from zero, and programs the per-counter controls.
    /// Only once all of that is in place does the global enable turn the
    /// counters on, so none of them ticks under partially-configured control
    /// state.
    ///
    /// Same interrupts-disabled requirement as [`Subsystem::quiesce`].
    pub fn activate<B: RegisterBank>(&self, regs: &mut B, core: &mut CoreCounts) {
        if !self.supported {
            return;
        }
        assert!(!regs.interrupts_enabled());

        for ctr in 0..NFIXED {
            regs.write_msr(Msr::fixed_ctr(ctr), core.snapshot(ctr));
        }
        regs.write_msr(Msr::IA32_FIXED_CTR_CTRL, FIXED_CTR_CTRL_INIT);
        regs.write_msr(Msr::IA32_PERF_GLOBAL_CTRL, GLOBAL_CTRL_FIXED_EN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pmc::{PerfMonLeaf, PmiController};
    use crate::testing::{Access, FakeBank};

    struct NullController;
    impl PmiController for NullController {
        fn install_pmi_handler(&mut self) {}
    }

    fn supported() -> Subsystem {
        Subsystem::probe(PerfMonLeaf { version: 3 }, &mut NullController)
    }

    #[test]
    fn test_quiesce_disables_then_reconciles() {
        let sys = supported();
        let mut regs = FakeBank::new();
        let mut core = CoreCounts::default();

        regs.counters = [100, 200, 300];
        sys.quiesce(&mut regs, &mut core);

        assert_eq!(regs.msr(Msr::IA32_PERF_GLOBAL_CTRL), 0);
        for ctr in 0..NFIXED {
            assert_eq!(core.accumulated(ctr), regs.counters[ctr as usize]);
            assert_eq!(core.snapshot(ctr), regs.counters[ctr as usize]);
        }
        // The disable lands before any counter is read.
        assert_eq!(
            regs.log()[0],
            Access::WriteMsr(Msr::IA32_PERF_GLOBAL_CTRL, 0)
        );
    }

    #[test]
    fn test_quiesce_counts_increments_since_last_quiesce() {
        let sys = supported();
        let mut regs = FakeBank::new();
        let mut core = CoreCounts::default();

        regs.counters = [10, 0, 0];
        sys.quiesce(&mut regs, &mut core);
        regs.counters = [25, 0, 0];
        sys.quiesce(&mut regs, &mut core);

        assert_eq!(core.accumulated(0), 25);
        assert_eq!(core.snapshot(0), 25);
    }

    #[test]
    fn test_quiesce_idempotent_when_already_disabled() {
        let sys = supported();
        let mut regs = FakeBank::new();
        let mut core = CoreCounts::default();

        regs.counters = [40, 0, 0];
        sys.quiesce(&mut regs, &mut core);
        sys.quiesce(&mut regs, &mut core);

        assert_eq!(core.accumulated(0), 40);
    }

    #[test]
    fn test_activate_restores_snapshots_not_zero() {
        let sys = supported();
        let mut regs = FakeBank::new();
        let mut core = CoreCounts::default();

        regs.counters = [111, 222, 333];
        sys.quiesce(&mut regs, &mut core);
        sys.activate(&mut regs, &mut core);

        assert_eq!(regs.msr(Msr::IA32_FIXED_CTR0), 111);
        assert_eq!(regs.msr(Msr::IA32_FIXED_CTR1), 222);
        assert_eq!(regs.msr(Msr::IA32_FIXED_CTR2), 333);
        assert_eq!(regs.msr(Msr::IA32_FIXED_CTR_CTRL), FIXED_CTR_CTRL_INIT);
        assert_eq!(regs.msr(Msr::IA32_PERF_GLOBAL_CTRL), GLOBAL_CTRL_FIXED_EN);
    }

    #[test]
    fn test_activate_enables_globally_last() {
        let sys = supported();
        let mut regs = FakeBank::new();
        let mut core = CoreCounts::default();

        sys.activate(&mut regs, &mut core);

        let log = regs.log();
        let enable_at = log
            .iter()
            .position(|a| *a == Access::WriteMsr(Msr::IA32_PERF_GLOBAL_CTRL, GLOBAL_CTRL_FIXED_EN))
            .unwrap();
        assert_eq!(enable_at, log.len() - 1);
        // Every per-counter restore and the control setup precede it.
        assert_eq!(log.len(), NFIXED as usize + 2);
    }

    #[test]
    fn test_unsupported_transitions_touch_nothing() {
        let sys = Subsystem::unsupported();
        let mut regs = FakeBank::sealed();
        let mut core = CoreCounts::default();
        sys.quiesce(&mut regs, &mut core);
        sys.activate(&mut regs, &mut core);
        assert_eq!(core.accumulated(0), 0);
    }

    #[test]
    #[should_panic]
    fn test_quiesce_requires_interrupts_disabled() {
        let sys = supported();
        let mut regs = FakeBank::new();
        regs.intr_enabled = true;
        sys.quiesce(&mut regs, &mut CoreCounts::default());
    }

    #[test]
    #[should_panic]
    fn test_activate_requires_interrupts_disabled() {
        let sys = supported();
        let mut regs = FakeBank::new();
        regs.intr_enabled = true;
        sys.activate(&mut regs, &mut CoreCounts::default());
    }
}
