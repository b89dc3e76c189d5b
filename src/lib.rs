//! Print or capture `psiginfo` descriptions of fabricated `siginfo_t` records.
#[macro_use]
mod macros;
pub(crate) mod common;
pub(crate) mod cutils;
pub(crate) mod log;
pub(crate) mod system;

mod cli;
mod describe;

pub use cli::main as psiginfo_main;
pub use common::error::Error;
pub use describe::{
    capture_signal_description, capture_signal_description_with, describe_signal,
    describe_signal_with, MAX_CAPTURED_MESSAGE,
};
pub use system::signal::{
    dispatch, Dispatched, Field, Formatter, Psiginfo, Signal, SignalClass, SignalInfo,
    SignalNumber,
};

#[cfg(not(target_os = "linux"))]
compile_error!("the siginfo_t layout used by psygnal is only known for Linux");
