use std::collections::BTreeMap;

use crate::log::dev_debug;

use super::{Field, Signal, SignalClass};

/// Named field values narrowed to the ones that apply to a signal's class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatched {
    signal: Signal,
    class: SignalClass,
    fields: BTreeMap<Field, i64>,
}

impl Dispatched {
    pub fn signal(&self) -> Signal {
        self.signal
    }

    pub fn class(&self) -> SignalClass {
        self.class
    }

    pub fn get(&self, field: Field) -> Option<i64> {
        self.fields.get(&field).copied()
    }

    /// The retained fields in declaration order; `signum` is always present.
    pub fn fields(&self) -> impl Iterator<Item = (Field, i64)> + '_ {
        self.fields.iter().map(|(field, value)| (*field, *value))
    }
}

/// Select the class of `signal` and keep only the fields legal for it.
///
/// Unknown names and fields of other classes are dropped without error.
/// A later value for the same field replaces an earlier one, and `signum`
/// is always set to `signal` itself.
pub fn dispatch<K: AsRef<str>>(
    signal: Signal,
    fields: impl IntoIterator<Item = (K, i64)>,
) -> Dispatched {
    let class = SignalClass::of(signal);

    let mut retained = BTreeMap::new();
    for (name, value) in fields {
        let name = name.as_ref();
        match Field::from_name(name) {
            Some(field) if class.accepts(field) => {
                retained.insert(field, value);
            }
            Some(_) => dev_debug!("dropping {name}: not part of a {class} record for {signal}"),
            None => dev_debug!("dropping unknown field {name:?}"),
        }
    }
    retained.insert(Field::Signum, signal.into());

    Dispatched {
        signal,
        class,
        fields: retained,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::{consts::*, Field, Signal, SignalClass};
    use super::dispatch;

    const EVERYTHING: &[(&str, i64)] = &[
        ("si_code", 1),
        ("si_errno", 2),
        ("si_addr", 0x1000),
        ("si_addr_lsb", 3),
        ("si_lower", 0x2000),
        ("si_upper", 0x3000),
        ("si_band", 4),
        ("si_fd", 5),
        ("si_pid", 6),
        ("si_uid", 7),
        ("si_status", 8),
        ("bogus_field", 9),
        ("message", 10),
    ];

    fn signal(number: libc::c_int) -> Signal {
        Signal::new(number).unwrap()
    }

    #[test]
    fn fault_signals_keep_common_and_fault_fields() {
        for number in [SIGILL, SIGFPE, SIGSEGV, SIGBUS] {
            let dispatched = dispatch(signal(number), EVERYTHING.iter().copied());
            assert_eq!(dispatched.class(), SignalClass::Fault);
            assert_eq!(
                dispatched.fields().collect::<Vec<_>>(),
                vec![
                    (Field::Signum, i64::from(number)),
                    (Field::Code, 1),
                    (Field::Errno, 2),
                    (Field::Addr, 0x1000),
                    (Field::AddrLsb, 3),
                    (Field::Lower, 0x2000),
                    (Field::Upper, 0x3000),
                ]
            );
        }
    }

    #[test]
    fn poll_signal_keeps_band_and_fd() {
        let dispatched = dispatch(signal(SIGPOLL), EVERYTHING.iter().copied());
        assert_eq!(dispatched.class(), SignalClass::Poll);
        assert_eq!(
            dispatched.fields().collect::<Vec<_>>(),
            vec![
                (Field::Signum, i64::from(SIGPOLL)),
                (Field::Code, 1),
                (Field::Errno, 2),
                (Field::Band, 4),
                (Field::Fd, 5),
            ]
        );
    }

    #[test]
    fn other_signals_keep_process_fields() {
        for number in [SIGTERM, SIGINT, SIGCHLD] {
            let dispatched = dispatch(signal(number), EVERYTHING.iter().copied());
            assert_eq!(dispatched.class(), SignalClass::Base);
            assert_eq!(
                dispatched.fields().collect::<Vec<_>>(),
                vec![
                    (Field::Signum, i64::from(number)),
                    (Field::Code, 1),
                    (Field::Errno, 2),
                    (Field::Pid, 6),
                    (Field::Uid, 7),
                    (Field::Status, 8),
                ]
            );
        }
    }

    #[test]
    fn retained_fields_always_belong_to_the_class() {
        let names = ["si_addr", "si_fd", "si_pid", "nonsense", "si_code", "", "si_upper"];
        for number in [SIGSEGV, SIGPOLL, SIGTERM, 0, 4242] {
            for take in 0..=names.len() {
                let input = names.iter().take(take).map(|name| (*name, 1));
                let dispatched = dispatch(signal(number), input);
                let class = dispatched.class();
                assert!(dispatched.fields().all(|(field, _)| class.accepts(field)));
            }
        }
    }

    #[test]
    fn signum_is_injected_and_wins() {
        let dispatched = dispatch(signal(SIGTERM), [("signum", 99)]);
        assert_eq!(dispatched.get(Field::Signum), Some(i64::from(SIGTERM)));

        let dispatched = dispatch(signal(SIGTERM), Vec::<(String, i64)>::new());
        assert_eq!(dispatched.get(Field::Signum), Some(i64::from(SIGTERM)));
        assert_eq!(dispatched.fields().count(), 1);
    }

    #[test]
    fn last_value_wins() {
        let dispatched = dispatch(signal(SIGSEGV), [("si_code", 1), ("si_code", 2)]);
        assert_eq!(dispatched.get(Field::Code), Some(2));
    }

    #[test]
    fn unknown_fields_change_nothing() {
        let plain = dispatch(signal(SIGSEGV), [("si_addr", 0x1000)]);
        let noisy = dispatch(
            signal(SIGSEGV),
            [("bogus_field", 5), ("si_addr", 0x1000), ("si_pid", 3)],
        );
        assert_eq!(plain, noisy);
    }
}
