use std::process;

use crate::common::Error;
use crate::cutils::string_from_ptr;
use crate::describe::{capture_signal_description, describe_signal};
use crate::log::{user_warn, PsygnalLogger};
use crate::system::signal::{Field, Signal, SignalClass};

use help::{long_help_message, USAGE_MSG};

mod help;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, PartialEq)]
pub(crate) struct PsiginfoOptions {
    pub(crate) message: Option<String>,
    pub(crate) capture: bool,
    pub(crate) action: PsiginfoAction,
    pub(crate) signal: Option<String>,
    pub(crate) fields: Vec<(String, String)>,
}

impl Default for PsiginfoOptions {
    fn default() -> Self {
        Self {
            message: None,
            capture: false,
            action: PsiginfoAction::Run,
            signal: None,
            fields: Vec::new(),
        }
    }
}

#[derive(Debug, PartialEq)]
pub(crate) enum PsiginfoAction {
    Help,
    Version,
    ListFields,
    Run,
}

type OptionSetter = fn(&mut PsiginfoOptions, Option<String>) -> Result<(), String>;

struct PsiginfoOption {
    short: char,
    long: &'static str,
    takes_argument: bool,
    set: OptionSetter,
}

impl PsiginfoOptions {
    const PSIGINFO_OPTIONS: &[PsiginfoOption] = &[
        PsiginfoOption {
            short: 'c',
            long: "capture",
            takes_argument: false,
            set: |options, _| {
                options.capture = true;
                Ok(())
            },
        },
        PsiginfoOption {
            short: 'h',
            long: "help",
            takes_argument: false,
            set: |options, _| {
                options.action = PsiginfoAction::Help;
                Ok(())
            },
        },
        PsiginfoOption {
            short: 'l',
            long: "list-fields",
            takes_argument: false,
            set: |options, _| {
                if options.action == PsiginfoAction::Run {
                    options.action = PsiginfoAction::ListFields;
                }
                Ok(())
            },
        },
        PsiginfoOption {
            short: 'm',
            long: "message",
            takes_argument: true,
            set: |options, argument| {
                options.message = Some(argument.ok_or("option requires an argument -- 'm'")?);
                Ok(())
            },
        },
        PsiginfoOption {
            short: 'V',
            long: "version",
            takes_argument: false,
            set: |options, _| {
                options.action = PsiginfoAction::Version;
                Ok(())
            },
        },
    ];

    pub(crate) fn from_env() -> Result<PsiginfoOptions, String> {
        let args = std::env::args().collect();

        Self::parse_arguments(args)
    }

    /// parse psiginfo arguments into a PsiginfoOptions struct
    pub(crate) fn parse_arguments(arguments: Vec<String>) -> Result<PsiginfoOptions, String> {
        let mut options: PsiginfoOptions = PsiginfoOptions::default();
        let mut arg_iter = arguments.into_iter().skip(1);
        let mut options_ended = false;

        while let Some(arg) = arg_iter.next() {
            if options_ended || arg == "-" || !arg.starts_with('-') {
                options.positional(arg)?;
            } else if arg == "--" {
                // everything after '--' is positional, so negative signal numbers can be given
                options_ended = true;
            } else if let Some(long) = arg.strip_prefix("--") {
                // parse assignments like '--message=boom'
                let (key, value) = match long.split_once('=') {
                    Some((key, value)) => (key, Some(value.to_string())),
                    None => (long, None),
                };
                let Some(option) = Self::PSIGINFO_OPTIONS.iter().find(|o| o.long == key) else {
                    return Err(format!("unrecognized option '{arg}'"));
                };
                match (option.takes_argument, value) {
                    (true, Some(value)) => (option.set)(&mut options, Some(value))?,
                    (true, None) => {
                        let next_arg = arg_iter.next();
                        (option.set)(&mut options, next_arg)?;
                    }
                    (false, Some(_)) => {
                        return Err(format!("'--{}' does not take any arguments", option.long));
                    }
                    (false, None) => (option.set)(&mut options, None)?,
                }
            } else {
                // flags can be grouped, so we loop over the characters
                for (n, char) in arg.char_indices().skip(1) {
                    let Some(option) = Self::PSIGINFO_OPTIONS.iter().find(|o| o.short == char)
                    else {
                        return Err(format!("unrecognized option '{char}'"));
                    };
                    if option.takes_argument {
                        // the argument is either the rest of the flag group or the next argument
                        let rest = &arg[n + char.len_utf8()..];
                        let next_arg = if rest.is_empty() {
                            arg_iter.next()
                        } else {
                            Some(rest.to_string())
                        };
                        (option.set)(&mut options, next_arg)?;
                        break;
                    } else {
                        (option.set)(&mut options, None)?;
                    }
                }
            }
        }

        Ok(options)
    }

    fn positional(&mut self, arg: String) -> Result<(), String> {
        if self.signal.is_none() {
            self.signal = Some(arg);
            return Ok(());
        }

        match arg.split_once('=') {
            Some((name, value)) if !name.is_empty() => {
                self.fields.push((name.to_string(), value.to_string()));
                Ok(())
            }
            _ => Err(format!("expected field=value, found '{arg}'")),
        }
    }
}

/// Parse a field value: decimal, or `0x`/`0o`/`0b` prefixed, with an optional sign.
///
/// Prefixed literals above `i64::MAX` are taken as 64-bit patterns, so upper-half
/// addresses can be written as-is.
pub(crate) fn parse_value(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let prefix = unsigned.get(..2).map(str::to_ascii_lowercase);
    let (radix, digits) = match prefix.as_deref() {
        Some("0x") => (16, &unsigned[2..]),
        Some("0o") => (8, &unsigned[2..]),
        Some("0b") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    match (negative, radix) {
        (true, _) => i64::try_from(-i128::from(magnitude)).ok(),
        (false, 10) => i64::try_from(magnitude).ok(),
        (false, _) => Some(magnitude as i64),
    }
}

/// Turn `name=value` arguments into field values, warning about the ones that will be ignored.
fn parse_fields(signal: Signal, raw: &[(String, String)]) -> Result<Vec<(String, i64)>, Error> {
    let class = SignalClass::of(signal);
    let mut fields = Vec::with_capacity(raw.len());

    for (name, value) in raw {
        let ignored = match Field::from_name(name) {
            Some(field) if !class.accepts(field) => {
                user_warn!("ignoring {field}, which does not apply to {signal}");
                true
            }
            None => {
                user_warn!("ignoring unknown field '{name}'");
                true
            }
            Some(_) => false,
        };

        match parse_value(value) {
            Some(value) => fields.push((name.clone(), value)),
            // the value of an ignored field does not matter
            None if ignored => {}
            None => return Err(Error::Options(format!("invalid value for {name}: '{value}'"))),
        }
    }

    Ok(fields)
}

fn list_fields(signal: Signal) {
    let class = SignalClass::of(signal);
    // SAFETY: strsignal returns a valid C string, and nothing else in this process calls it
    // concurrently.
    let description = unsafe { string_from_ptr(libc::strsignal(signal.number())) };
    let fields = class
        .fields()
        .iter()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(" ");

    println_ignore_io_error!("{signal} ({description}) is a {class} signal");
    println_ignore_io_error!("fields: {fields}");
}

fn run(options: PsiginfoOptions) -> Result<(), Error> {
    let Some(signal) = options.signal.as_deref() else {
        return Err(Error::Options("no signal specified".to_string()));
    };
    let signal = Signal::parse(signal)?;

    if options.action == PsiginfoAction::ListFields {
        list_fields(signal);
        return Ok(());
    }

    let fields = parse_fields(signal, &options.fields)?;
    let message = options.message.as_deref();

    if options.capture {
        let text = capture_signal_description(signal, message, fields)?;
        println_ignore_io_error!("{}", text.trim_end_matches('\n'));
    } else {
        describe_signal(signal, message, fields)?;
    }

    Ok(())
}

pub fn main() {
    PsygnalLogger::new("psiginfo: ").into_global_logger();

    let options = match PsiginfoOptions::from_env() {
        Ok(options) => options,
        Err(error) => {
            println_ignore_io_error!("psiginfo: {error}\n{USAGE_MSG}");
            process::exit(1);
        }
    };

    match options.action {
        PsiginfoAction::Help => {
            println_ignore_io_error!("{}", long_help_message());
            process::exit(0);
        }
        PsiginfoAction::Version => {
            println_ignore_io_error!("psiginfo {VERSION}");
            process::exit(0);
        }
        PsiginfoAction::ListFields | PsiginfoAction::Run => {
            if let Err(error) = run(options) {
                eprintln_ignore_io_error!("psiginfo: {error}");
                if error.is_usage() {
                    eprintln_ignore_io_error!("{USAGE_MSG}");
                }
                process::exit(1);
            }
        }
    }
}
