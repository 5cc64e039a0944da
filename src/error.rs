//! # Errors
//!
//! Error types used across the crate. Errors carry a typed code ([`Err`]) and,
//! optionally, a human readable context message.

use std::fmt::Display;

use thiserror::Error;

/// Log an error with `tracing` and return it from the enclosing function.
///
/// # Example
/// ```
/// use credibil_vc::error::Err;
/// use credibil_vc::{tracerr, Result};
///
/// fn with_msg() -> Result<()> {
///     tracerr!(Err::InvalidInput, "message: {}", "some message")
/// }
///
/// fn no_msg() -> Result<()> {
///     tracerr!(Err::InvalidInput)
/// }
/// ```
#[macro_export]
macro_rules! tracerr {
    // with context
    ($code:expr, $($msg:tt)*) => {
        {
        use $crate::error::Context as _;
        tracing::error!($($msg)*);
        return Err($code).context(format!($($msg)*));
        }
    };
    // no context
    ($code:expr) => {
        {
        tracing::error!("{}", $code);
        return Err($code.into());
        }
    }
}

/// Public error type.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] anyhow::Error);

impl Error {
    /// Render the error as `{"error": <code>, "error_description": <detail>}`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.0.root_cause().to_string(),
            "error_description": self.to_string(),
        })
    }

    /// Returns true if the error carries the code `err`.
    #[must_use]
    pub fn is(&self, err: Err) -> bool {
        self.0.downcast_ref::<Err>().is_some_and(|e| e == &err)
    }
}

/// Typed error codes.
#[derive(Clone, Copy, Error, Debug, PartialEq, Eq)]
pub enum Err {
    /// Caller supplied input that failed validation. (See context for
    /// details)
    #[error("invalid_input")]
    InvalidInput,

    /// Invalid format, such as an identifier that cannot be parsed.
    #[error("invalid_format")]
    InvalidFormat,

    /// Key material could not be parsed or used.
    #[error("invalid_key")]
    InvalidKey,

    /// The service configuration is unusable.
    #[error("invalid_config")]
    InvalidConfig,

    /// A signing operation was attempted before the key pair was
    /// initialized.
    #[error("key_not_initialized")]
    KeyNotInitialized,

    /// The requested DID, verification method or record does not exist.
    #[error("not_found")]
    NotFound,

    /// The request is well formed but cannot be served by this service.
    #[error("not_supported")]
    NotSupported,

    /// A record with the same identifier already exists.
    #[error("conflict")]
    Conflict,

    /// File system failure.
    #[error("io_error")]
    Io,

    /// Data could not be serialized.
    #[error("serialization_error")]
    Serialization,
}

/// Context is used to decorate errors with useful context information.
pub trait Context<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Adds context to the error.
    ///
    /// # Errors
    ///
    /// Returns the original error with context appended.
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> Context<T, E> for core::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(e) => Err(Error(anyhow::Error::from(e).context(context))),
        }
    }
}

impl From<Err> for Error {
    fn from(error: Err) -> Self {
        Self(error.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self(anyhow::Error::from(Err::Serialization).context(err.to_string()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self(anyhow::Error::from(Err::Io).context(err.to_string()))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self(anyhow::Error::from(Err::InvalidConfig).context(err.to_string()))
    }
}

impl From<rsa::Error> for Error {
    fn from(err: rsa::Error) -> Self {
        Self(anyhow::Error::from(Err::InvalidKey).context(err.to_string()))
    }
}

impl From<rsa::pkcs8::Error> for Error {
    fn from(err: rsa::pkcs8::Error) -> Self {
        Self(anyhow::Error::from(Err::InvalidKey).context(err.to_string()))
    }
}

impl From<rsa::pkcs8::spki::Error> for Error {
    fn from(err: rsa::pkcs8::spki::Error) -> Self {
        Self(anyhow::Error::from(Err::InvalidKey).context(err.to_string()))
    }
}
