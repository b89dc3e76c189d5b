use std::{
    mem::{align_of, size_of, MaybeUninit},
    ptr::addr_of_mut,
};

use libc::{c_int, c_long, c_short, c_void, pid_t, uid_t};

use crate::common::Error;

use super::{Dispatched, Field, SignalClass, SignalNumber};

// The leading part of the kernel's `siginfo_t`. Only the union members that
// can be fabricated from a `Field` are spelled out.
#[repr(C)]
struct RawSigInfo {
    si_signo: c_int,
    #[cfg(not(any(target_arch = "mips", target_arch = "mips64")))]
    si_errno: c_int,
    si_code: c_int,
    #[cfg(any(target_arch = "mips", target_arch = "mips64"))]
    si_errno: c_int,
    fields: RawFields,
}

#[repr(C)]
union RawFields {
    base: BaseFields,
    fault: FaultFields,
    poll: PollFields,
}

// `_sigchld`; its first two members overlap `_kill`.
#[repr(C)]
#[derive(Clone, Copy)]
struct BaseFields {
    pid: pid_t,
    uid: uid_t,
    status: c_int,
}

// `_sigfault`; `addr_lsb` shares its slot with the padding before the bounds.
#[repr(C)]
#[derive(Clone, Copy)]
struct FaultFields {
    addr: *mut c_void,
    addr_lsb: c_short,
    lower: *mut c_void,
    upper: *mut c_void,
}

// `_sigpoll`
#[repr(C)]
#[derive(Clone, Copy)]
struct PollFields {
    band: c_long,
    fd: c_int,
}

enum Payload {
    Fault(FaultFields),
    Poll(PollFields),
    Base(BaseFields),
}

const _: () = assert!(size_of::<RawSigInfo>() <= size_of::<libc::siginfo_t>());
const _: () = assert!(align_of::<RawSigInfo>() <= align_of::<libc::siginfo_t>());

/// A fabricated `siginfo_t`, ready to be handed to a [`super::Formatter`].
#[repr(transparent)]
pub struct SignalInfo {
    info: libc::siginfo_t,
}

impl SignalInfo {
    pub(crate) const SIZE: usize = size_of::<Self>();

    /// Build the native record for a dispatched field set.
    ///
    /// The record starts out zeroed and only the union member of the record's
    /// class is written. Missing fields stay zero.
    pub fn build(dispatched: &Dispatched) -> Result<Self, Error> {
        let value = |field| dispatched.get(field).unwrap_or(0);

        let signo = narrow::<SignalNumber>(Field::Signum, value(Field::Signum))?;
        let code = narrow::<c_int>(Field::Code, value(Field::Code))?;
        let errno = narrow::<c_int>(Field::Errno, value(Field::Errno))?;

        let payload = match dispatched.class() {
            SignalClass::Fault => Payload::Fault(FaultFields {
                addr: address(Field::Addr, value(Field::Addr))?,
                addr_lsb: narrow(Field::AddrLsb, value(Field::AddrLsb))?,
                lower: address(Field::Lower, value(Field::Lower))?,
                upper: address(Field::Upper, value(Field::Upper))?,
            }),
            SignalClass::Poll => Payload::Poll(PollFields {
                band: narrow(Field::Band, value(Field::Band))?,
                fd: narrow(Field::Fd, value(Field::Fd))?,
            }),
            SignalClass::Base => Payload::Base(BaseFields {
                pid: narrow(Field::Pid, value(Field::Pid))?,
                uid: narrow(Field::Uid, value(Field::Uid))?,
                status: narrow(Field::Status, value(Field::Status))?,
            }),
        };

        let mut info = MaybeUninit::<libc::siginfo_t>::zeroed();
        let raw = info.as_mut_ptr().cast::<RawSigInfo>();
        // SAFETY: `RawSigInfo` mirrors the start of `siginfo_t` and fits inside it (see the
        // assertions above). Members are written one by one through raw pointers, so padding
        // keeps the zeroes written by `zeroed`.
        unsafe {
            addr_of_mut!((*raw).si_signo).write(signo);
            addr_of_mut!((*raw).si_errno).write(errno);
            addr_of_mut!((*raw).si_code).write(code);
            match payload {
                Payload::Fault(fault) => {
                    addr_of_mut!((*raw).fields.fault.addr).write(fault.addr);
                    addr_of_mut!((*raw).fields.fault.addr_lsb).write(fault.addr_lsb);
                    addr_of_mut!((*raw).fields.fault.lower).write(fault.lower);
                    addr_of_mut!((*raw).fields.fault.upper).write(fault.upper);
                }
                Payload::Poll(poll) => {
                    addr_of_mut!((*raw).fields.poll.band).write(poll.band);
                    addr_of_mut!((*raw).fields.poll.fd).write(poll.fd);
                }
                Payload::Base(base) => {
                    addr_of_mut!((*raw).fields.base.pid).write(base.pid);
                    addr_of_mut!((*raw).fields.base.uid).write(base.uid);
                    addr_of_mut!((*raw).fields.base.status).write(base.status);
                }
            }
        }

        // SAFETY: every byte was either zeroed or written above.
        Ok(Self {
            info: unsafe { info.assume_init() },
        })
    }

    /// Gets the signal number.
    pub fn signal(&self) -> SignalNumber {
        self.info.si_signo
    }

    pub fn code(&self) -> c_int {
        self.info.si_code
    }

    pub fn errno(&self) -> c_int {
        self.info.si_errno
    }

    pub(crate) fn as_ptr(&self) -> *const libc::siginfo_t {
        &self.info
    }

    /// The raw bytes of the record, for comparing two records.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: the record was fully initialised by `build` and lives as long as `self`.
        unsafe { std::slice::from_raw_parts(self.as_ptr().cast::<u8>(), Self::SIZE) }
    }
}

fn narrow<T: TryFrom<i64>>(field: Field, value: i64) -> Result<T, Error> {
    T::try_from(value).map_err(|_| Error::FieldOutOfRange { field, value })
}

// Addresses may be given as signed or unsigned pointer-sized integers.
fn address(field: Field, value: i64) -> Result<*mut c_void, Error> {
    let address = isize::try_from(value)
        .map(|signed| signed as usize)
        .or_else(|_| usize::try_from(value))
        .map_err(|_| Error::FieldOutOfRange { field, value })?;
    Ok(address as *mut c_void)
}
