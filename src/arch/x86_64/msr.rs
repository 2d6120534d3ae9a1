//! Model specific register access for one CPU's performance counters.

use crate::regs::{Msr, RegisterBank};
use nix::libc;

/// Register bank backed by a CPU specific MSR device file.
///
/// Requires the `msr` kernel module loaded.
#[derive(Debug)]
pub struct MsrBank {
    /// File descriptor for MSR device file.
    fd: libc::c_int,
}

impl MsrBank {
    /// Open the MSR device of CPU `cpu`.
    pub fn open(cpu: u32) -> crate::Result<MsrBank> {
        match unsafe {
            libc::open(
                format!("/dev/cpu/{}/msr\0", cpu).as_ptr() as _,
                libc::O_RDWR,
            )
        } {
            err if err < 0 => Err(crate::Error::from_errno()),
            fd => Ok(MsrBank { fd }),
        }
    }

    fn pread(&self, msr: u64) -> u64 {
        let mut value = 0u64;
        unsafe {
            libc::pread(
                self.fd,
                &mut value as *mut u64 as _,
                std::mem::size_of_val(&value),
                msr as libc::off_t,
            );
        }
        value
    }
}

impl RegisterBank for MsrBank {
    fn read_msr(&self, msr: Msr) -> u64 {
        self.pread(msr as u64)
    }

    fn write_msr(&mut self, msr: Msr, value: u64) {
        unsafe {
            libc::pwrite(
                self.fd,
                &value as *const u64 as _,
                std::mem::size_of_val(&value),
                msr as u64 as libc::off_t,
            );
        }
    }

    fn read_counter(&self, ctr: u32) -> u64 {
        // The rdpmc path is closed to user space; the counter MSR aliases the
        // same 48 bits.
        self.pread(Msr::IA32_FIXED_CTR0 as u64 + u64::from(ctr))
    }

    fn interrupts_enabled(&self) -> bool {
        // No interrupt masking is visible from user space; hosted callers run
        // outside interrupt context by construction.
        false
    }
}

impl Drop for MsrBank {
    fn drop(&mut self) {
        if self.fd >= 0 {
            unsafe {
                libc::close(self.fd);
            }
        }
    }
}
