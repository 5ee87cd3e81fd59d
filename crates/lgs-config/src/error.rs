use std::fmt;

/// The single error kind surfaced by every setup operation.
///
/// Errors carry a human-readable message only. Context is layered on with
/// [`SetupError::context`], which renders chains such as:
///
/// ```text
/// Sink 'file_err' error:
///  > Missing 'filename' field of string value for basic_file_sink
/// ```
///
/// There is no machine-readable code; callers that need to tell a missing
/// file apart from invalid content have to match on the message text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SetupError {
    message: String,
}

impl SetupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wrap this error with an outer context line.
    pub fn context(self, context: impl fmt::Display) -> Self {
        Self {
            message: format!("{context}:\n > {}", self.message),
        }
    }
}

impl From<std::io::Error> for SetupError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<toml::de::Error> for SetupError {
    fn from(e: toml::de::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<toml::ser::Error> for SetupError {
    fn from(e: toml::ser::Error) -> Self {
        Self::new(e.to_string())
    }
}

pub type SetupResult<T> = Result<T, SetupError>;

/// Attach setup context to any result whose error converts into [`SetupError`].
pub trait ResultExt<T> {
    fn with_setup_context<C, F>(self, f: F) -> SetupResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Into<SetupError>,
{
    fn with_setup_context<C, F>(self, f: F) -> SetupResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.into().context(f()))
    }
}

/// Return early with a [`SetupError`] built from a format string.
#[macro_export]
macro_rules! setup_bail {
    ($($arg:tt)*) => {
        return Err($crate::SetupError::new(format!($($arg)*)))
    };
}
