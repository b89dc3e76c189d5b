use std::{ffi::CStr, io};

use crate::system::is_open;

use super::SignalInfo;

extern "C" {
    fn psiginfo(pinfo: *const libc::siginfo_t, message: *const libc::c_char);
}

/// Something that can write a textual description of a signal record to standard error.
pub trait Formatter {
    fn format(&self, info: &SignalInfo, message: Option<&CStr>) -> io::Result<()>;
}

/// The C library's `psiginfo`.
///
/// A present, non-empty message is printed first, followed by `: `.
#[derive(Clone, Copy, Debug, Default)]
pub struct Psiginfo;

impl Formatter for Psiginfo {
    fn format(&self, info: &SignalInfo, message: Option<&CStr>) -> io::Result<()> {
        // psiginfo has no way to report a failure, so check the one thing it depends on.
        is_open(libc::STDERR_FILENO)?;

        let message = message.map_or(std::ptr::null(), CStr::as_ptr);
        // SAFETY: `info` points to a fully initialised `siginfo_t` and `message` is either null
        // or a NUL-terminated string that outlives the call.
        unsafe { psiginfo(info.as_ptr(), message) };

        Ok(())
    }
}
