//! Processor identification via the `cpuid` instruction.

use crate::pmc::PerfMonLeaf;
use core::arch::x86_64::__cpuid;
use log::debug;

/// Query the architectural performance monitoring leaf (0xA) of the local CPU.
///
/// More information at https://en.wikipedia.org/wiki/CPUID.
pub fn perfmon_leaf() -> PerfMonLeaf {
    let basic = unsafe { __cpuid(0) };
    let version = if basic.eax >= 0xA {
        let res = unsafe { __cpuid(0xA) };
        res.eax & 0xff
    } else {
        0
    };

    debug!("Detected architectural perfmon version - {}", version);

    PerfMonLeaf { version }
}
