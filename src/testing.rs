//! Scripted register bank shared by the unit tests.
//!
//! This is not part of the public interface of the crate.

use crate::regs::{Msr, RegisterBank, NFIXED};
use std::cell::RefCell;
use std::collections::HashMap;

/// One recorded register access, in program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    ReadMsr(Msr),
    WriteMsr(Msr, u64),
    ReadCounter(u32),
}

/// An in-memory register bank for one simulated core.
///
/// Reads come from plain fields the test scripts beforehand; every access is
/// recorded in program order so tests can assert sequencing. A sealed bank
/// panics on any access at all, for the paths that must never touch hardware.
#[derive(Debug, Default)]
pub(crate) struct FakeBank {
    msrs: HashMap<Msr, u64>,
    pub counters: [u64; NFIXED as usize],
    pub intr_enabled: bool,
    log: RefCell<Vec<Access>>,
    sealed: bool,
}

impl FakeBank {
    pub fn new() -> FakeBank {
        FakeBank::default()
    }

    /// A bank on which any register access is a test failure.
    pub fn sealed() -> FakeBank {
        FakeBank {
            sealed: true,
            ..FakeBank::default()
        }
    }

    pub fn set_msr(&mut self, msr: Msr, value: u64) {
        self.msrs.insert(msr, value);
    }

    /// Last value written to (or scripted into) `msr`; 0 if untouched.
    pub fn msr(&self, msr: Msr) -> u64 {
        self.msrs.get(&msr).copied().unwrap_or(0)
    }

    /// The accesses performed so far, in program order.
    pub fn log(&self) -> Vec<Access> {
        self.log.borrow().clone()
    }

    fn record(&self, access: Access) {
        if self.sealed {
            panic!("register access on a sealed bank: {:?}", access);
        }
        self.log.borrow_mut().push(access);
    }
}

impl RegisterBank for FakeBank {
    fn read_msr(&self, msr: Msr) -> u64 {
        self.record(Access::ReadMsr(msr));
        self.msr(msr)
    }

    fn write_msr(&mut self, msr: Msr, value: u64) {
        self.record(Access::WriteMsr(msr, value));
        self.msrs.insert(msr, value);
    }

    fn read_counter(&self, ctr: u32) -> u64 {
        self.record(Access::ReadCounter(ctr));
        self.counters[ctr as usize]
    }

    fn interrupts_enabled(&self) -> bool {
        self.intr_enabled
    }
}
