use thiserror::Error;

/// Classification of a broken caller contract.
///
/// The core has no recoverable errors: every misuse (a coordinate outside the
/// grid, merging tiles that do not touch, removing a listener that was never
/// added) is a programming error and aborts with one of these reasons.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum Reason {
    #[error("argument out of range")]
    ArgumentOutOfRange,
    #[error("invalid operation")]
    InvalidOperation,
}

/// Panics with `"<reason>: <message>"` unless `cond` holds.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $reason:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::error::violation($reason, format_args!($($arg)+))
        }
    };
}

#[cold]
#[track_caller]
pub fn violation(reason: Reason, message: std::fmt::Arguments<'_>) -> ! {
    log::error!("{}: {}", reason, message);
    panic!("{}: {}", reason, message)
}
