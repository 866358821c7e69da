//! Error types for the polytwin core library.
//!
//! Defines the error enum exposed by the public API, its stable error codes,
//! and a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::{feature::Feature, response::Response};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Describes why a feature value was rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputProblem {
    /// The value was NaN or infinite.
    NonFinite(f64),
    /// The field was not supplied at all.
    Missing,
}

impl fmt::Display for InputProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite(value) => write!(f, "value {value} is not finite"),
            Self::Missing => f.write_str("value is missing"),
        }
    }
}

/// Error type produced when generating data, fitting models, or predicting.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TwinError {
    /// A generator, trainer, or sweep parameter was rejected.
    #[error("invalid configuration for `{parameter}`: {reason}")]
    InvalidConfig {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
    /// The caller asked for a response the model bank was not fit for.
    #[error("unknown response `{name}`")]
    UnknownResponse {
        /// Name supplied by the caller.
        name: String,
    },
    /// The caller named a feature that does not exist.
    #[error("unknown feature `{name}`")]
    UnknownFeature {
        /// Name supplied by the caller.
        name: String,
    },
    /// A feature value in a prediction request was missing or non-finite.
    #[error("invalid input for feature `{feature}`: {problem}")]
    InvalidInput {
        /// Feature holding the rejected value.
        feature: Feature,
        /// What was wrong with the value.
        problem: InputProblem,
    },
    /// A trainer could not produce a model from the training data.
    #[error("training for response `{response}` failed: {reason}")]
    DegenerateTraining {
        /// Response whose model could not be fit.
        response: Response,
        /// Human-readable explanation.
        reason: String,
    },
}

impl TwinError {
    pub(crate) fn invalid_config(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter,
            reason: reason.into(),
        }
    }
}

define_error_codes! {
    /// Stable codes describing [`TwinError`] variants.
    enum TwinErrorCode for TwinError {
        /// A generator, trainer, or sweep parameter was rejected.
        InvalidConfig => InvalidConfig { .. } => "POLYTWIN_INVALID_CONFIG",
        /// The caller asked for a response the model bank was not fit for.
        UnknownResponse => UnknownResponse { .. } => "POLYTWIN_UNKNOWN_RESPONSE",
        /// The caller named a feature that does not exist.
        UnknownFeature => UnknownFeature { .. } => "POLYTWIN_UNKNOWN_FEATURE",
        /// A feature value in a prediction request was missing or non-finite.
        InvalidInput => InvalidInput { .. } => "POLYTWIN_INVALID_INPUT",
        /// A trainer could not produce a model from the training data.
        DegenerateTraining => DegenerateTraining { .. } => "POLYTWIN_DEGENERATE_TRAINING",
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TwinError>;
