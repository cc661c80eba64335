//! Error and diagnostic types for configuration handling.
//!
//! Hard failures ([`ConfigError`]) are raised for desired-state input and
//! command emission. Problems found while scanning device text are never
//! fatal: they are collected as [`Diagnostic`] values so the parser stays
//! total.

use std::fmt;
use thiserror::Error;

use crate::schema::Kind;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised by the configuration core.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Entity kind name is not known to the schema.
    #[error("Unknown entity kind '{0}'")]
    UnknownKind(String),

    /// Attribute is not declared for the entity kind.
    #[error("Unknown attribute '{attribute}' for {kind}")]
    UnknownAttribute {
        /// The entity kind.
        kind: Kind,
        /// The attribute name as supplied.
        attribute: String,
    },

    /// A desired-state value cannot be converted to the declared value type.
    #[error("Cannot coerce {kind}[{identity}].{attribute} = '{value}' to {expected}")]
    TypeCoercion {
        /// The entity kind.
        kind: Kind,
        /// The entity identity string.
        identity: String,
        /// The attribute name.
        attribute: String,
        /// The rejected value, rendered for display.
        value: String,
        /// Name of the expected value type.
        expected: &'static str,
    },

    /// Identity string has the wrong shape for the entity kind.
    #[error("Invalid identity '{identity}' for {kind}: {message}")]
    InvalidIdentity {
        /// The entity kind.
        kind: Kind,
        /// The identity as supplied.
        identity: String,
        /// What is wrong with it.
        message: String,
    },

    /// A command needs context the entity identity does not provide
    /// (e.g. destroying a peer without knowing its AS).
    #[error("Missing context '{field}' for {kind}[{identity}]")]
    MissingContext {
        /// The entity kind.
        kind: Kind,
        /// The entity identity string.
        identity: String,
        /// The identity field or attribute that could not be resolved.
        field: String,
    },

    /// Desired-state document could not be decoded.
    #[error("Desired state decode error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Creates a missing context error.
    pub fn missing_context(
        kind: Kind,
        identity: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::MissingContext {
            kind,
            identity: identity.into(),
            field: field.into(),
        }
    }

    /// Creates an invalid identity error.
    pub fn invalid_identity(
        kind: Kind,
        identity: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidIdentity {
            kind,
            identity: identity.into(),
            message: message.into(),
        }
    }
}

/// Warning-level problem found while parsing device configuration text.
///
/// The affected attribute keeps its schema default; the rest of the parse
/// continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number in the scanned text.
    pub line: usize,
    /// The entity kind the line was attributed to.
    pub kind: Kind,
    /// Identity string of the affected instance.
    pub identity: String,
    /// The attribute whose assignment failed.
    pub attribute: &'static str,
    /// The captured text that failed conversion.
    pub raw: String,
    /// Name of the expected value type.
    pub expected: &'static str,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {}[{}].{}: cannot coerce '{}' to {}",
            self.line, self.kind, self.identity, self.attribute, self.raw, self.expected
        )
    }
}
