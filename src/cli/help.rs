pub(crate) const USAGE_MSG: &str = "usage: psiginfo [-chlV] [-m message] signal [field=value ...]";

const DESCRIPTOR: &str = "psiginfo - describe a fabricated signal information record

Fields that do not apply to the signal are ignored. Values may be decimal,
or hexadecimal, octal or binary with a 0x, 0o or 0b prefix.";

const HELP_MSG: &str = "Options:
  -c, --capture            capture the description and print it to stdout
  -h, --help               display help message and exit
  -l, --list-fields        list the fields accepted for the signal and exit
  -m, --message=message    print message before the description
  -V, --version            display version information and exit

Fields:
  all signals              signum si_code si_errno
  SIGILL SIGFPE SIGSEGV    si_addr si_addr_lsb si_lower si_upper
  SIGBUS
  SIGPOLL                  si_band si_fd
  any other signal         si_pid si_uid si_status
";

pub(crate) fn long_help_message() -> String {
    format!("{USAGE_MSG}\n\n{DESCRIPTOR}\n\n{HELP_MSG}")
}
