// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Error types for proxy setup and dispatch.
//!
//! **DDD Context:** Dispatch
//!
//! Two families of errors exist and never mix:
//! - [`ConfigError`]: raised while describing a delegate class or loading
//!   configuration, before any call is made.
//! - [`DispatchError`]: raised by a call. Resolution failures
//!   ([`DispatchError::NoMatchingMethod`]) stay distinguishable from the
//!   delegate's own failures ([`DispatchError::Delegate`]).
//!
//! Both integrate with [`miette`] for reporting.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

/// A failure raised by a delegate method body.
///
/// Bodies return whatever error type they like; callers get it back through
/// [`DispatchError::Delegate`] and can downcast to the original type.
pub type DelegateError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error raised while handling a proxied call.
#[derive(Debug, Error, Diagnostic)]
pub enum DispatchError {
    /// No strategy matched on the delegate or on any sub-delegate.
    #[error("no delegate method matches '{name}{param_types}'")]
    #[diagnostic(
        code(duckprxy::no_matching_method),
        help("declare a method with this name, a matching pattern, or a fallback method")
    )]
    NoMatchingMethod {
        /// The invoked method name.
        name: EcoString,
        /// The declared parameter types, rendered as `(int, string)`.
        param_types: String,
    },

    /// The sub-delegate accessor failed or returned something unusable.
    #[error("sub-delegate accessor '{class}.{accessor}' failed: {reason}")]
    #[diagnostic(code(duckprxy::subdelegate_access))]
    SubDelegateAccess {
        /// Class declaring the accessor.
        class: EcoString,
        /// Accessor method name.
        accessor: EcoString,
        /// What went wrong.
        reason: String,
        /// The accessor's own error, if it raised one.
        #[source]
        source: Option<DelegateError>,
    },

    /// The resolved delegate method raised an error. The original error is
    /// passed through unchanged.
    #[error(transparent)]
    #[diagnostic(code(duckprxy::delegate))]
    Delegate(DelegateError),

    /// Sub-delegate recursion went deeper than the configured limit.
    #[error("sub-delegate chain for '{name}' exceeded depth {depth}")]
    #[diagnostic(
        code(duckprxy::subdelegate_depth),
        help("check for a sub-delegate accessor that returns its own delegate")
    )]
    SubDelegateDepthExceeded {
        /// The invoked method name.
        name: EcoString,
        /// The configured limit.
        depth: usize,
    },

    /// The proxy was called with a method none of its interfaces declare.
    #[error("'{name}' is not declared by any interface of this proxy")]
    #[diagnostic(code(duckprxy::not_an_interface_method))]
    NotAnInterfaceMethod {
        /// The requested method name.
        name: EcoString,
    },

    /// A method body was invoked on a delegate of another Rust type.
    #[error("method '{class}.{method}' was invoked on a delegate of another type")]
    #[diagnostic(code(duckprxy::receiver_mismatch))]
    ReceiverMismatch {
        /// Class that declared the method.
        class: EcoString,
        /// Method name.
        method: EcoString,
    },
}

impl DispatchError {
    /// Returns `true` for failures of the resolution engine itself, as opposed
    /// to failures raised by delegate code.
    #[must_use]
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            DispatchError::NoMatchingMethod { .. }
                | DispatchError::SubDelegateDepthExceeded { .. }
                | DispatchError::NotAnInterfaceMethod { .. }
        )
    }

    /// Returns the delegate's own error, if this is one.
    #[must_use]
    pub fn delegate_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DispatchError::Delegate(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// An error raised while describing a delegate class or loading configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A name pattern is not a valid regular expression.
    #[error("invalid name pattern '{pattern}' on '{class}.{method}'")]
    #[diagnostic(code(duckprxy::invalid_pattern))]
    InvalidPattern {
        class: EcoString,
        method: EcoString,
        pattern: EcoString,
        #[source]
        source: regex::Error,
    },

    /// A sub-delegate accessor must take no call arguments and return an object.
    #[error("sub-delegate accessor '{class}.{method}' {reason}")]
    #[diagnostic(
        code(duckprxy::invalid_subdelegate_accessor),
        help("a sub-delegate accessor takes no arguments and returns `object`")
    )]
    InvalidSubDelegateAccessor {
        class: EcoString,
        method: EcoString,
        reason: &'static str,
    },

    /// More than one method is flagged as fallback.
    #[error("class '{class}' declares more than one fallback method ('{first}' and '{second}')")]
    #[diagnostic(code(duckprxy::ambiguous_fallback))]
    AmbiguousFallback {
        class: EcoString,
        first: EcoString,
        second: EcoString,
    },

    /// More than one method is flagged as sub-delegate accessor.
    #[error(
        "class '{class}' declares more than one sub-delegate accessor ('{first}' and '{second}')"
    )]
    #[diagnostic(code(duckprxy::ambiguous_subdelegate))]
    AmbiguousSubDelegate {
        class: EcoString,
        first: EcoString,
        second: EcoString,
    },

    /// The same pattern string is declared by two methods.
    #[error("pattern '{pattern}' on class '{class}' is declared by both '{first}' and '{second}'")]
    #[diagnostic(code(duckprxy::duplicate_pattern))]
    DuplicatePattern {
        class: EcoString,
        pattern: EcoString,
        first: EcoString,
        second: EcoString,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration '{path}'")]
    #[diagnostic(code(duckprxy::config_read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has unknown keys.
    #[error("failed to parse configuration")]
    #[diagnostic(code(duckprxy::config_parse))]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn delegate_errors_display_transparently() {
        let err = DispatchError::Delegate(Box::new(Boom));
        assert_eq!(err.to_string(), "boom");
        assert!(!err.is_resolution_failure());
        assert!(err.delegate_error().is_some_and(|e| e.is::<Boom>()));
    }

    #[test]
    fn no_matching_method_display() {
        let err = DispatchError::NoMatchingMethod {
            name: "bar".into(),
            param_types: "(int, int)".to_string(),
        };
        assert_eq!(err.to_string(), "no delegate method matches 'bar(int, int)'");
        assert!(err.is_resolution_failure());
        assert!(err.delegate_error().is_none());
    }

    #[test]
    fn subdelegate_access_keeps_source() {
        let err = DispatchError::SubDelegateAccess {
            class: "Outer".into(),
            accessor: "inner".into(),
            reason: "accessor raised an error".to_string(),
            source: Some(Box::new(Boom)),
        };
        assert_eq!(
            err.to_string(),
            "sub-delegate accessor 'Outer.inner' failed: accessor raised an error"
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_resolution_failure());
    }
}
