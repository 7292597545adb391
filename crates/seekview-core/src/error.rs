use crate::{
    config::ConfigError,
    db::{NavigateError, predicate::PredicateError},
    model::{BuildError, ResolveError},
    traits::AccessError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Structured error with a stable classification.
/// Every area-specific error converts into this shape at the public boundary.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct Error {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    #[must_use]
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Render the error with its class and origin prefixed.
    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    /// Metadata could not be built for a type.
    Construction,
    /// A property path does not resolve against a model.
    Resolution,
    /// A well-formed request the runtime does not support.
    Unsupported,
    InvariantViolation,
    /// The backing executor failed its round trip.
    Store,
    Config,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Construction => "construction",
            Self::Resolution => "resolution",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Store => "store",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Model,
    Path,
    Predicate,
    Navigator,
    Executor,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Model => "model",
            Self::Path => "path",
            Self::Predicate => "predicate",
            Self::Navigator => "navigator",
            Self::Executor => "executor",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Self::new(ErrorClass::Construction, ErrorOrigin::Model, err.to_string())
    }
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        Self::new(ErrorClass::Resolution, ErrorOrigin::Path, err.to_string())
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Path, err.to_string())
    }
}

impl From<PredicateError> for Error {
    fn from(err: PredicateError) -> Self {
        let class = match &err {
            PredicateError::Resolve(_) => ErrorClass::Resolution,
            _ => ErrorClass::Unsupported,
        };

        Self::new(class, ErrorOrigin::Predicate, err.to_string())
    }
}

impl From<NavigateError> for Error {
    fn from(err: NavigateError) -> Self {
        let (class, origin) = match &err {
            NavigateError::Store(_) => (ErrorClass::Store, ErrorOrigin::Executor),
            NavigateError::Resolve(_) => (ErrorClass::Resolution, ErrorOrigin::Navigator),
            NavigateError::Predicate(_)
            | NavigateError::TooManySortKeys { .. }
            | NavigateError::AnchorArity { .. }
            | NavigateError::IdentifierArity { .. } => {
                (ErrorClass::Unsupported, ErrorOrigin::Navigator)
            }
            NavigateError::NoIdentifier { .. }
            | NavigateError::UnsortableKey { .. }
            | NavigateError::MalformedRow { .. } => {
                (ErrorClass::InvariantViolation, ErrorOrigin::Navigator)
            }
        };

        Self::new(class, origin, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Config, err.to_string())
    }
}
