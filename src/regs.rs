//! Register access layer for the performance monitoring hardware.
//!
//! The counter logic in [`crate::pmc`] never touches registers directly; it
//! goes through the [`RegisterBank`] trait so it can run against the real
//! model-specific registers (see [`crate::arch`]) or against a scripted bank
//! in unit tests.

/// Number of fixed-function counters managed per core.
pub const NFIXED: u32 = 3;

/// Largest value a 48-bit fixed counter can hold before wrapping.
pub const CTR_MAX: u64 = (1 << 48) - 1;

/// MSR addresses from "Intel 64 and IA-32 Architectures Software Developers Manual Volume 4:
/// Model-Specific Registers".
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types, missing_docs)]
pub enum Msr {
    IA32_FIXED_CTR0 = 0x309,
    IA32_FIXED_CTR1 = 0x30A,
    IA32_FIXED_CTR2 = 0x30B,
    IA32_FIXED_CTR_CTRL = 0x38D,
    IA32_PERF_GLOBAL_STATUS = 0x38E,
    IA32_PERF_GLOBAL_CTRL = 0x38F,
    IA32_PERF_GLOBAL_OVF_CTRL = 0x390,
}

impl Msr {
    /// MSR backing fixed counter `ctr`.
    ///
    /// Callers validate `ctr` first; see [`crate::pmc::Subsystem::counter_write`].
    pub(crate) fn fixed_ctr(ctr: u32) -> Msr {
        match ctr {
            0 => Msr::IA32_FIXED_CTR0,
            1 => Msr::IA32_FIXED_CTR1,
            2 => Msr::IA32_FIXED_CTR2,
            _ => unreachable!(),
        }
    }
}

/// IA32_FIXED_CTR_CTRL holds 4 control bits per fixed counter: [0:1] select the
/// rings the counter runs in, [2] extends counting to every hardware thread on
/// the logical core, and [3] raises a PMI on overflow.
///
/// All counters count in all rings with PMIs delivered and the any-thread bit
/// clear, so the register state is a constant.
pub const FIXED_CTR_CTRL_INIT: u64 = 0x888 | 0x333;

/// IA32_PERF_GLOBAL_CTRL enable bits for the three fixed counters.
///
/// The high 32 bits of the register control the fixed counters; the low half is
/// for the configurable counters and stays out of this crate's hands.
pub const GLOBAL_CTRL_FIXED_EN: u64 = ((1 << NFIXED as u64) - 1) << 32;

/// Overflow-status mask covering the configurable (non-fixed) counters.
pub const GLOBAL_STATUS_PMC_MASK: u64 = (1 << 4) - 1;

/// Overflow-status bit for fixed counter `ctr`.
#[inline]
pub fn fixed_overflow_bit(ctr: u32) -> u64 {
    (1 << u64::from(ctr)) << 32
}

/// Primitive access to the performance monitoring registers of one core.
///
/// Implementations are per-core: a bank handed to the lifecycle or interrupt
/// code must address the calling core's own registers, never another core's.
pub trait RegisterBank {
    /// Read the model-specific register `msr`.
    fn read_msr(&self, msr: Msr) -> u64;

    /// Write `value` to the model-specific register `msr`.
    fn write_msr(&mut self, msr: Msr, value: u64);

    /// Read the raw 48-bit value of fixed counter `ctr` through the hardware
    /// counter-read path.
    fn read_counter(&self, ctr: u32) -> u64;

    /// Whether interrupts are currently deliverable on the calling core.
    ///
    /// Used only to assert the disabled-interrupts invariant, never for
    /// control flow.
    fn interrupts_enabled(&self) -> bool;
}
