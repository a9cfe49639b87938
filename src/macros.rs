// Logging shim: forwards to `tracing` when the feature is enabled, otherwise expands to nothing.

#[cfg(feature = "tracing")]
macro_rules! log_event {
    ($level:ident, $($arg:tt)+) => {
        tracing::$level!($($arg)+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! log_event {
    ($level:ident, $($arg:tt)+) => {{}};
}

macro_rules! trace {
    ($($arg:tt)+) => {
        log_event!(trace, $($arg)+)
    };
}

macro_rules! debug {
    ($($arg:tt)+) => {
        log_event!(debug, $($arg)+)
    };
}

macro_rules! info {
    ($($arg:tt)+) => {
        log_event!(info, $($arg)+)
    };
}

#[allow(unused_macros)]
macro_rules! error {
    ($($arg:tt)+) => {
        log_event!(error, $($arg)+)
    };
}
