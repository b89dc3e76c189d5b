use std::fmt;

/// A named `siginfo_t` member that callers may supply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Signum,
    Code,
    Errno,
    Addr,
    AddrLsb,
    Lower,
    Upper,
    Band,
    Fd,
    Pid,
    Uid,
    Status,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::Signum,
        Field::Code,
        Field::Errno,
        Field::Addr,
        Field::AddrLsb,
        Field::Lower,
        Field::Upper,
        Field::Band,
        Field::Fd,
        Field::Pid,
        Field::Uid,
        Field::Status,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Signum => "signum",
            Field::Code => "si_code",
            Field::Errno => "si_errno",
            Field::Addr => "si_addr",
            Field::AddrLsb => "si_addr_lsb",
            Field::Lower => "si_lower",
            Field::Upper => "si_upper",
            Field::Band => "si_band",
            Field::Fd => "si_fd",
            Field::Pid => "si_pid",
            Field::Uid => "si_uid",
            Field::Status => "si_status",
        }
    }

    /// Names are matched exactly; there are no aliases.
    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }

    /// Fields present in every record, whatever its class.
    pub fn is_common(self) -> bool {
        matches!(self, Field::Signum | Field::Code | Field::Errno)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Field;

    #[test]
    fn names_are_unique_and_resolvable() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(*field));
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(Field::from_name("si_addr"), Some(Field::Addr));
        assert_eq!(Field::from_name("SI_ADDR"), None);
        assert_eq!(Field::from_name("addr"), None);
        assert_eq!(Field::from_name("bogus_field"), None);
    }
}
