//! The violation oracle: a process-wide arithmetic-fault interceptor.
//!
//! Installed once, before any protocol thread starts. When the probe's
//! division traps, the kernel delivers SIGFPE to the faulting thread;
//! the handler classifies the cause, writes a one-line diagnosis to
//! stderr, and terminates the whole process with exit status 1.
//!
//! No recovery is attempted. A single violation anywhere disproves the
//! protocol configuration under test, so continuing any other pair
//! would be meaningless.
//!
//! The handler runs in async-signal context and therefore uses only
//! `write(2)` and `_exit(2)`.

use thiserror::Error;

/// Failure to register the process-wide fault handler.
#[derive(Debug, Error)]
pub enum InstallError {
    /// `sigaction(2)` rejected the handler registration.
    #[error("sigaction(SIGFPE) failed: {0}")]
    Sigaction(#[source] std::io::Error),
}

// SIGFPE si_code values from asm-generic/siginfo.h. libc 0.2.189 does not
// export these for linux_like targets, so they are declared here with their
// canonical kernel values.
const FPE_INTDIV: libc::c_int = 1;
const FPE_FLTDIV: libc::c_int = 3;

const DIVIDE_BY_ZERO_MSG: &[u8] =
    b"ERROR: integer division by zero detected: mutual exclusion was violated\n";
const UNEXPECTED_MSG: &[u8] = b"ERROR: unexpected SIGFPE (not integer division by zero)\n";

/// Pick the diagnosis line for a delivered fault.
fn diagnosis(signum: libc::c_int, si_code: libc::c_int) -> &'static [u8] {
    if signum == libc::SIGFPE && si_code == FPE_INTDIV {
        DIVIDE_BY_ZERO_MSG
    } else {
        UNEXPECTED_MSG
    }
}

/// Write a diagnosis to stderr and terminate the process.
///
/// Async-signal-safe; also the shared exit path for the portable
/// checked-division probe, which detects the zero divisor itself
/// instead of trapping.
pub fn divide_by_zero_abort() -> ! {
    abort_with(DIVIDE_BY_ZERO_MSG)
}

fn abort_with(msg: &[u8]) -> ! {
    unsafe {
        libc::write(libc::STDERR_FILENO, msg.as_ptr().cast(), msg.len());
        libc::_exit(1);
    }
}

extern "C" fn on_arithmetic_fault(
    signum: libc::c_int,
    info: *mut libc::siginfo_t,
    _ucontext: *mut libc::c_void,
) {
    let si_code = if info.is_null() {
        0
    } else {
        unsafe { (*info).si_code }
    };
    abort_with(diagnosis(signum, si_code));
}

/// Install the process-wide SIGFPE interceptor.
///
/// Must be called before the first protocol thread spawns; signal
/// dispositions are process-global, so one installation covers every
/// pair.
pub fn install() -> Result<(), InstallError> {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = on_arithmetic_fault as libc::sighandler_t;
        sa.sa_flags = libc::SA_SIGINFO;
        libc::sigemptyset(&mut sa.sa_mask);
        if libc::sigaction(libc::SIGFPE, &sa, std::ptr::null_mut()) != 0 {
            return Err(InstallError::Sigaction(std::io::Error::last_os_error()));
        }
    }
    log::debug!("SIGFPE violation oracle installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_divide_fault_is_diagnosed_as_violation() {
        assert_eq!(
            diagnosis(libc::SIGFPE, FPE_INTDIV),
            DIVIDE_BY_ZERO_MSG
        );
    }

    #[test]
    fn other_fpe_codes_are_diagnosed_as_unexpected() {
        assert_eq!(diagnosis(libc::SIGFPE, FPE_FLTDIV), UNEXPECTED_MSG);
        assert_eq!(diagnosis(libc::SIGFPE, 0), UNEXPECTED_MSG);
    }

    #[test]
    fn install_registers_a_siginfo_handler() {
        install().unwrap();

        let mut old: libc::sigaction = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::sigaction(libc::SIGFPE, std::ptr::null(), &mut old) };
        assert_eq!(rc, 0);
        assert_ne!(old.sa_flags & libc::SA_SIGINFO, 0);
        assert_eq!(old.sa_sigaction, on_arithmetic_fault as libc::sighandler_t);
    }
}
