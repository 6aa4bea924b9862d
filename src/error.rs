//! Error model for the dispatch pipeline
//!
//! Anything a controller or handler can raise is a [`Raised`]: either a real
//! error object, whose message becomes the response body, or some other value,
//! which is reported as `Unknown Error`.

use std::any::Any;
use std::fmt;

/// Body text used when the raised value is not an error object
pub const UNKNOWN_ERROR: &str = "Unknown Error";

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A value raised by a controller constructor, the router, or a handler
#[derive(Debug)]
pub enum Raised {
    /// An error object carrying a message
    Error(BoxError),
    /// Any other raised value
    Value(serde_json::Value),
}

impl Raised {
    /// Raise an error object with the given message
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Error(BoxError::from(message.into()))
    }

    /// Raise a value that is not an error object
    pub fn value(value: impl Into<serde_json::Value>) -> Self {
        Self::Value(value.into())
    }

    /// Text reported to the caller
    pub fn message(&self) -> String {
        match self {
            Self::Error(err) => err.to_string(),
            Self::Value(_) => UNKNOWN_ERROR.to_string(),
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Borrow the error object as a concrete type
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Self::Error(err) => err.downcast_ref::<E>(),
            Self::Value(_) => None,
        }
    }

    /// Convert a panic payload into a raised value
    ///
    /// Panics are never error objects, the payload text is only kept for logs.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let text = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned());
        Self::Value(text.map_or(serde_json::Value::Null, serde_json::Value::String))
    }
}

impl<E> From<E> for Raised
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::Error(Box::new(err))
    }
}

/// Failures produced by the route table itself
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("Not Found: {method} {path}")]
    NotFound { method: String, path: String },
}

/// Pipeline phase a failure originated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Registration,
    Routing,
    Handler,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Registration => "registration",
            Self::Routing => "routing",
            Self::Handler => "handler",
        })
    }
}

/// A raised value tagged with the phase it came from
#[derive(Debug)]
pub struct Failure {
    pub phase: Phase,
    pub raised: Raised,
}

impl Failure {
    pub const fn new(phase: Phase, raised: Raised) -> Self {
        Self { phase, raised }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self.raised.downcast_ref::<RouteError>(),
            Some(RouteError::NotFound { .. })
        )
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raised {
            Raised::Error(err) => write!(f, "[{}] {err}", self.phase),
            Raised::Value(value) => write!(f, "[{}] non-error value raised: {value}", self.phase),
        }
    }
}
