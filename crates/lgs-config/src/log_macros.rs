/// Domain-aware logging macros shared by every crate in the workspace.
///
/// Each macro injects a `domain` field so events can be filtered by stage.
/// Domains in use: `conf`, `sink`, `pool`, `logger`.
///
/// ```ignore
/// lgs_debug!(sink, sink = %name, "sink resolved");
/// lgs_info!(conf, loggers = 3, "setup complete");
/// ```
///
/// The domain is a bare identifier, turned into a string literal by the macro.

/// Internal helper.  Do not call directly; use `lgs_warn!` … `lgs_trace!`.
#[doc(hidden)]
#[macro_export]
macro_rules! lgs_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        $crate::__tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

/// Log at WARN level with an automatic `domain` field.
#[macro_export]
macro_rules! lgs_warn {
    ($domain:ident, $($rest:tt)*) => {
        $crate::lgs_log!(warn, $domain, $($rest)*)
    };
}

/// Log at INFO level with an automatic `domain` field.
#[macro_export]
macro_rules! lgs_info {
    ($domain:ident, $($rest:tt)*) => {
        $crate::lgs_log!(info, $domain, $($rest)*)
    };
}

/// Log at DEBUG level with an automatic `domain` field.
#[macro_export]
macro_rules! lgs_debug {
    ($domain:ident, $($rest:tt)*) => {
        $crate::lgs_log!(debug, $domain, $($rest)*)
    };
}

/// Log at TRACE level with an automatic `domain` field.
#[macro_export]
macro_rules! lgs_trace {
    ($domain:ident, $($rest:tt)*) => {
        $crate::lgs_log!(trace, $domain, $($rest)*)
    };
}
