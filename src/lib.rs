//! Management of the fixed-function performance counters on each processor core.
//!
//! Hardware fixed counters are narrow (48 bits) and stop counting when a core
//! powers down. This crate keeps a monotonically increasing 64-bit total per
//! counter anyway, by folding the raw hardware value into a software count at
//! every overflow interrupt and around every core power transition.

#![deny(missing_docs, missing_debug_implementations)]

mod errors;
pub use errors::{Error, Result};

pub mod regs;
pub use regs::RegisterBank;

pub mod pmc;
pub use pmc::{CoreCounts, Subsystem};

/// Architecture specific implementation details of performance counters:
#[cfg(target_arch = "x86_64")]
#[path = "arch/x86_64/mod.rs"]
pub mod arch;

#[cfg(test)]
pub(crate) mod testing;
