//! Fabricated signal information records and their native description.
use std::fmt;

use libc::c_int;

use crate::common::Error;

mod class;
mod dispatch;
mod field;
mod format;
mod info;

pub use class::SignalClass;
pub use dispatch::{dispatch, Dispatched};
pub use field::Field;
pub use format::{Formatter, Psiginfo};
pub use info::SignalInfo;

pub type SignalNumber = c_int;

/// A signal number that fits the platform's signal type.
///
/// Numbers that do not name a known signal are still valid; they are
/// described as base-class signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Signal(SignalNumber);

impl Signal {
    pub fn new(value: impl Into<i64>) -> Result<Self, Error> {
        let value = value.into();
        SignalNumber::try_from(value)
            .map(Self)
            .map_err(|_| Error::InvalidSignalValue(value.to_string()))
    }

    pub fn number(self) -> SignalNumber {
        self.0
    }

    /// The conventional name, e.g. `SIGSEGV`, if the number is a known signal.
    pub fn name(self) -> Option<&'static str> {
        signal_name(self.0)
    }

    /// Look up a signal by name. `SIGSEGV`, `SEGV` and `segv` are all accepted.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_uppercase();
        let name = if name.starts_with("SIG") {
            name
        } else {
            format!("SIG{name}")
        };

        let number = match name.as_str() {
            "SIGIO" => consts::SIGPOLL,
            "SIGIOT" => consts::SIGABRT,
            "SIGCLD" => consts::SIGCHLD,
            name => signal_number(name)?,
        };
        Some(Self(number))
    }

    /// Parse either a signal name or a decimal signal number.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let digits = text.strip_prefix('-').unwrap_or(text);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            let value = text
                .parse::<i64>()
                .map_err(|_| Error::InvalidSignalValue(text.to_string()))?;
            Self::new(value)
        } else {
            Self::from_name(text).ok_or_else(|| Error::UnknownSignalName(text.to_string()))
        }
    }
}

impl From<Signal> for i64 {
    fn from(signal: Signal) -> Self {
        signal.0.into()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "signal {}", self.0),
        }
    }
}

macro_rules! define_consts {
    ($($signal:ident,)*) => {
        pub(crate) mod consts {
            pub(crate) use libc::{$($signal,)*};
        }

        pub(crate) fn signal_name(signal: SignalNumber) -> Option<&'static str> {
            match signal {
                $(consts::$signal => Some(stringify!($signal)),)*
                _ => None,
            }
        }

        fn signal_number(name: &str) -> Option<SignalNumber> {
            match name {
                $(stringify!($signal) => Some(consts::$signal),)*
                _ => None,
            }
        }
    };
}

define_consts! {
    SIGHUP,
    SIGINT,
    SIGQUIT,
    SIGILL,
    SIGTRAP,
    SIGABRT,
    SIGBUS,
    SIGFPE,
    SIGKILL,
    SIGUSR1,
    SIGSEGV,
    SIGUSR2,
    SIGPIPE,
    SIGALRM,
    SIGTERM,
    SIGCHLD,
    SIGCONT,
    SIGSTOP,
    SIGTSTP,
    SIGTTIN,
    SIGTTOU,
    SIGURG,
    SIGXCPU,
    SIGXFSZ,
    SIGVTALRM,
    SIGPROF,
    SIGWINCH,
    SIGPOLL,
    SIGPWR,
    SIGSYS,
}

#[cfg(test)]
mod tests {
    use super::{consts::*, Signal};
    use crate::common::Error;

    #[test]
    fn names_round_trip_through_numbers() {
        for (name, number) in [("SIGSEGV", SIGSEGV), ("SIGPOLL", SIGPOLL), ("SIGTERM", SIGTERM)] {
            let signal = Signal::from_name(name).unwrap();
            assert_eq!(signal.number(), number);
            assert_eq!(signal.name(), Some(name));
        }
    }

    #[test]
    fn short_and_lowercase_names() {
        assert_eq!(Signal::from_name("segv").unwrap().number(), SIGSEGV);
        assert_eq!(Signal::from_name("Int").unwrap().number(), SIGINT);
        assert_eq!(Signal::from_name("SIGIO").unwrap().number(), SIGPOLL);
        assert_eq!(Signal::from_name("IOT").unwrap().number(), SIGABRT);
        assert!(Signal::from_name("SIGFOO").is_none());
        assert!(Signal::from_name("").is_none());
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        assert!(matches!(
            Signal::new(i64::from(i32::MAX) + 1),
            Err(Error::InvalidSignalValue(_))
        ));
        assert!(matches!(
            Signal::parse("99999999999999999999999"),
            Err(Error::InvalidSignalValue(_))
        ));
    }

    #[test]
    fn unknown_numbers_are_still_signals() {
        let signal = Signal::new(1000).unwrap();
        assert_eq!(signal.name(), None);
        assert_eq!(signal.to_string(), "signal 1000");
    }

    #[test]
    fn parse_accepts_names_and_numbers() {
        assert_eq!(Signal::parse("11").unwrap().number(), 11);
        assert_eq!(Signal::parse("SIGBUS").unwrap().number(), SIGBUS);
        assert!(matches!(
            Signal::parse("12abc"),
            Err(Error::UnknownSignalName(name)) if name == "12abc"
        ));
    }
}
