//! The fixed-counter subsystem: capability probing, counter access, core
//! power-transition sequencing and the overflow-interrupt handler.

use crate::regs::{Msr, RegisterBank, NFIXED};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};

mod counts;
pub use counts::CoreCounts;

mod lifecycle;

mod pmi;
pub use pmi::{ConfigurableHandler, CountSink, PmiOutcome};

/// Image of the processor identification leaf describing performance
/// monitoring capabilities (leaf 0xA on x86_64).
#[derive(Debug, Clone, Copy)]
pub struct PerfMonLeaf {
    /// Architectural performance monitoring version, low byte of EAX.
    ///
    /// Fixed-function counters are architecturally guaranteed from version 2
    /// onward.
    pub version: u32,
}

/// Binding point for the performance-monitoring-interrupt vector of the local
/// interrupt controller.
pub trait PmiController {
    /// Route the performance-monitoring interrupt to the overflow handler.
    fn install_pmi_handler(&mut self);
}

/// Human-readable name under which the fixed counters are enumerated to the
/// counter-management facility.
pub const CORE_DEV_NAME: &str = "core";

/// Initialization hook for the standalone core-counter driver path.
///
/// The fixed counters are owned by this subsystem and brought up through
/// [`Subsystem::probe`]; the separate driver path has nothing to set up and
/// reports that explicitly rather than returning partial data.
pub fn core_dev_init() -> crate::Result<()> {
    Err(crate::Error::NotSupported)
}

/// Process-wide state of the fixed-counter subsystem.
///
/// One instance exists per process and is shared by reference across every
/// core's transition and interrupt code. The capability flag is decided once
/// by [`Subsystem::probe`] and never changes afterwards; when it is false,
/// every operation on every core degrades to a no-op without touching a single
/// hardware register.
#[derive(Debug)]
pub struct Subsystem {
    /// Whether the hardware guarantees the fixed counters this subsystem needs.
    supported: bool,
    /// Overflow interrupts taken so far, across all cores. Diagnostic only;
    /// relaxed ordering, no relationship with any counter data.
    pmis: AtomicU64,
}

impl Subsystem {
    /// Probe processor identification data once at startup.
    ///
    /// When the hardware guarantees at least the version-2 fixed counters,
    /// this wires the overflow handler into the interrupt controller's
    /// performance-monitoring vector and marks the subsystem supported.
    /// Unsupported hardware is not an error; the subsystem simply stays inert.
    pub fn probe<I: PmiController>(leaf: PerfMonLeaf, intr: &mut I) -> Subsystem {
        let version = leaf.version & 0xff;
        let supported = version >= 2;
        if supported {
            intr.install_pmi_handler();
        }
        debug!(
            "Architectural perfmon version {} - fixed counters {}",
            version,
            if supported { "supported" } else { "unsupported" }
        );
        Subsystem {
            supported,
            pmis: AtomicU64::new(0),
        }
    }

    /// A subsystem for hardware without fixed counters; every operation no-ops.
    pub fn unsupported() -> Subsystem {
        Subsystem {
            supported: false,
            pmis: AtomicU64::new(0),
        }
    }

    /// Whether the fixed counters are usable on this hardware.
    pub fn supported(&self) -> bool {
        self.supported
    }

    /// Overflow interrupts handled so far across all cores.
    pub fn pmi_count(&self) -> u64 {
        self.pmis.load(Ordering::Relaxed)
    }

    pub(crate) fn count_pmi(&self) {
        self.pmis.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the raw value of fixed counter `ctr` on the calling core.
    ///
    /// Returns 0 when the subsystem is unsupported. Panics on an out-of-range
    /// index: that is a caller bug, not a runtime condition, and carrying on
    /// with a made-up value would corrupt every total downstream.
    pub fn counter_read<B: RegisterBank>(&self, regs: &B, ctr: u32) -> u64 {
        if !self.supported {
            return 0;
        }
        if ctr >= NFIXED {
            panic!("invalid fixed counter read: {}", ctr);
        }
        regs.read_counter(ctr)
    }

    /// Write `value` into fixed counter `ctr` on the calling core.
    ///
    /// No-op when the subsystem is unsupported; panics on an out-of-range
    /// index, as for [`Subsystem::counter_read`].
    pub fn counter_write<B: RegisterBank>(&self, regs: &mut B, ctr: u32, value: u64) {
        if !self.supported {
            return;
        }
        if ctr >= NFIXED {
            panic!("invalid fixed counter write: {}", ctr);
        }
        regs.write_msr(Msr::fixed_ctr(ctr), value);
    }
}
