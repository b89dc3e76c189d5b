use crate::describe::MAX_CAPTURED_MESSAGE;
use crate::system::signal::Field;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// The signal number does not fit the platform's signal type.
    InvalidSignalValue(String),
    UnknownSignalName(String),
    FieldOutOfRange {
        field: Field,
        value: i64,
    },
    InvalidMessage,
    MessageTooLong(usize),
    /// A pipe or a duplicate of standard error could not be created.
    ResourceExhaustion(std::io::Error),
    /// The formatter itself reported a failure.
    NativeCallFailure(std::io::Error),
    Io(std::io::Error),
    Options(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSignalValue(value) => write!(f, "invalid signal number: {value}"),
            Error::UnknownSignalName(name) => write!(f, "unknown signal '{name}'"),
            Error::FieldOutOfRange { field, value } => {
                write!(f, "value {value} is out of range for field '{field}'")
            }
            Error::InvalidMessage => f.write_str("message must not contain a NUL byte"),
            Error::MessageTooLong(len) => write!(
                f,
                "message of {len} bytes is too long to capture (at most {MAX_CAPTURED_MESSAGE})"
            ),
            Error::ResourceExhaustion(e) => write!(f, "cannot redirect standard error: {e}"),
            Error::NativeCallFailure(e) => write!(f, "psiginfo failed: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
            Error::Options(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ResourceExhaustion(e) | Error::NativeCallFailure(e) | Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl Error {
    /// Returns `true` if the error was caused by the arguments rather than by the OS.
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignalValue(_)
                | Self::UnknownSignalName(_)
                | Self::FieldOutOfRange { .. }
                | Self::InvalidMessage
                | Self::MessageTooLong(_)
                | Self::Options(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::system::signal::Field;
    use std::error::Error as _;

    #[test]
    fn display() {
        let err = Error::FieldOutOfRange {
            field: Field::AddrLsb,
            value: 1 << 20,
        };
        assert_eq!(
            err.to_string(),
            "value 1048576 is out of range for field 'si_addr_lsb'"
        );
        assert_eq!(
            Error::UnknownSignalName("SIGFOO".into()).to_string(),
            "unknown signal 'SIGFOO'"
        );
    }

    #[test]
    fn os_errors_keep_their_source() {
        let err = Error::ResourceExhaustion(std::io::Error::from_raw_os_error(libc::EMFILE));
        assert!(!err.is_usage());
        assert!(err.source().is_some());
        assert!(Error::InvalidMessage.is_usage());
        assert!(Error::InvalidMessage.source().is_none());
    }
}
