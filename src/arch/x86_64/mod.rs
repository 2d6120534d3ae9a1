//! Utilities specific to the x86_64 architecture.

mod msr;
pub use msr::*;

mod cpuid;
pub use cpuid::*;
