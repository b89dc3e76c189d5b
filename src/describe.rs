use std::{ffi::CString, fs::File, io::Read};

use crate::common::Error;
use crate::log::dev_debug;
use crate::system::{
    pipe,
    signal::{dispatch, Formatter, Psiginfo, Signal, SignalInfo},
    stderr::{capture_lock, StderrRedirect},
};

/// Longest message [`capture_signal_description`] accepts, in bytes.
///
/// glibc's `psiginfo` cuts its whole output off at 511 bytes, and the signal description
/// (including a fault address, or sender pid and uid) comes after the message. Up to this
/// length both still fit, which also keeps the output well within one pipe buffer.
pub const MAX_CAPTURED_MESSAGE: usize = 256;

/// A validated record and message, ready to be formatted.
struct Request {
    info: SignalInfo,
    message: Option<CString>,
}

impl Request {
    fn new<K: AsRef<str>>(
        signal: i64,
        message: Option<&str>,
        fields: impl IntoIterator<Item = (K, i64)>,
    ) -> Result<Self, Error> {
        let signal = Signal::new(signal)?;
        let message = message
            .map(CString::new)
            .transpose()
            .map_err(|_| Error::InvalidMessage)?;

        let dispatched = dispatch(signal, fields);
        dev_debug!("describing {signal} as a {} record", dispatched.class());
        let info = SignalInfo::build(&dispatched)?;

        Ok(Self { info, message })
    }

    fn format<F: Formatter + ?Sized>(&self, formatter: &F) -> Result<(), Error> {
        formatter
            .format(&self.info, self.message.as_deref())
            .map_err(Error::NativeCallFailure)
    }
}

/// Print a description of a fabricated signal record to standard error.
///
/// `fields` are `(name, value)` pairs such as `("si_addr", 0x1000)`. Fields that do not
/// apply to the signal's class, and names that are not fields at all, are ignored.
pub fn describe_signal<K: AsRef<str>>(
    signal: impl Into<i64>,
    message: Option<&str>,
    fields: impl IntoIterator<Item = (K, i64)>,
) -> Result<(), Error> {
    describe_signal_with(&Psiginfo, signal, message, fields)
}

/// Like [`describe_signal`], using `formatter` instead of `psiginfo`.
pub fn describe_signal_with<F: Formatter + ?Sized, K: AsRef<str>>(
    formatter: &F,
    signal: impl Into<i64>,
    message: Option<&str>,
    fields: impl IntoIterator<Item = (K, i64)>,
) -> Result<(), Error> {
    Request::new(signal.into(), message, fields)?.format(formatter)
}

/// Return the description [`describe_signal`] would print, instead of printing it.
///
/// Standard error is redirected into a pipe for the duration of the call and is always
/// restored before this function returns, also on failure. Calls through this crate are
/// serialised, but output written to standard error by other threads meanwhile ends up in
/// the captured text.
pub fn capture_signal_description<K: AsRef<str>>(
    signal: impl Into<i64>,
    message: Option<&str>,
    fields: impl IntoIterator<Item = (K, i64)>,
) -> Result<String, Error> {
    capture_signal_description_with(&Psiginfo, signal, message, fields)
}

/// Like [`capture_signal_description`], using `formatter` instead of `psiginfo`.
///
/// `formatter` must not capture a description itself.
pub fn capture_signal_description_with<F: Formatter + ?Sized, K: AsRef<str>>(
    formatter: &F,
    signal: impl Into<i64>,
    message: Option<&str>,
    fields: impl IntoIterator<Item = (K, i64)>,
) -> Result<String, Error> {
    if let Some(len) = message.map(str::len).filter(|len| *len > MAX_CAPTURED_MESSAGE) {
        return Err(Error::MessageTooLong(len));
    }
    let request = Request::new(signal.into(), message, fields)?;

    let _lock = capture_lock();
    let (read_end, write_end) = pipe().map_err(Error::ResourceExhaustion)?;
    let redirect = StderrRedirect::to(&write_end).map_err(Error::ResourceExhaustion)?;

    // on failure `redirect` is dropped here, which restores standard error
    request.format(formatter)?;

    redirect.restore()?;
    // the read end only sees EOF once every write end is closed
    drop(write_end);

    let mut captured = Vec::new();
    File::from(read_end).read_to_end(&mut captured)?;

    Ok(String::from_utf8_lossy(&captured).into_owned())
}
