use std::fmt;

use super::{consts::*, Field, Signal};

/// Which member of the `siginfo_t` union describes a signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SignalClass {
    /// Hardware faults: `si_addr` and the bounds of the faulting access.
    Fault,
    /// `SIGPOLL`: the band event and the file descriptor.
    Poll,
    /// Everything else: the sending process and its exit status.
    Base,
}

impl SignalClass {
    const FAULT_FIELDS: &'static [Field] = &[
        Field::Signum,
        Field::Code,
        Field::Errno,
        Field::Addr,
        Field::AddrLsb,
        Field::Lower,
        Field::Upper,
    ];

    const POLL_FIELDS: &'static [Field] = &[
        Field::Signum,
        Field::Code,
        Field::Errno,
        Field::Band,
        Field::Fd,
    ];

    const BASE_FIELDS: &'static [Field] = &[
        Field::Signum,
        Field::Code,
        Field::Errno,
        Field::Pid,
        Field::Uid,
        Field::Status,
    ];

    pub fn of(signal: Signal) -> Self {
        match signal.number() {
            SIGILL | SIGFPE | SIGSEGV | SIGBUS => SignalClass::Fault,
            SIGPOLL => SignalClass::Poll,
            _ => SignalClass::Base,
        }
    }

    /// The fields a record of this class carries, common fields included.
    pub fn fields(self) -> &'static [Field] {
        match self {
            SignalClass::Fault => Self::FAULT_FIELDS,
            SignalClass::Poll => Self::POLL_FIELDS,
            SignalClass::Base => Self::BASE_FIELDS,
        }
    }

    pub fn accepts(self, field: Field) -> bool {
        self.fields().contains(&field)
    }
}

impl fmt::Display for SignalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SignalClass::Fault => "fault",
            SignalClass::Poll => "poll",
            SignalClass::Base => "base",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::{consts::*, Field, Signal};
    use super::SignalClass;

    fn class_of(number: libc::c_int) -> SignalClass {
        SignalClass::of(Signal::new(number).unwrap())
    }

    #[test]
    fn hardware_faults() {
        for number in [SIGILL, SIGFPE, SIGSEGV, SIGBUS] {
            assert_eq!(class_of(number), SignalClass::Fault);
        }
    }

    #[test]
    fn poll_and_base() {
        assert_eq!(class_of(SIGPOLL), SignalClass::Poll);
        for number in [SIGTERM, SIGINT, SIGCHLD, SIGKILL, 0, -4, 1000] {
            assert_eq!(class_of(number), SignalClass::Base);
        }
    }

    #[test]
    fn every_class_carries_the_common_fields() {
        for class in [SignalClass::Fault, SignalClass::Poll, SignalClass::Base] {
            for field in [Field::Signum, Field::Code, Field::Errno] {
                assert!(class.accepts(field), "{class} should accept {field}");
            }
        }
    }

    #[test]
    fn variant_fields_are_disjoint() {
        let classes = [SignalClass::Fault, SignalClass::Poll, SignalClass::Base];
        for field in Field::ALL {
            let accepting = classes.iter().filter(|c| c.accepts(*field)).count();
            if field.is_common() {
                assert_eq!(accepting, 3);
            } else {
                assert_eq!(accepting, 1, "{field} belongs to exactly one class");
            }
        }
    }
}
