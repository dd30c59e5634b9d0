// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Duck-typed dynamic proxies.
//!
//! This crate lets an object implement an interface by delegating each call
//! to a delegate whose methods are matched by name and shape rather than by a
//! shared trait:
//! - Delegate classes (explicit method registration via [`ClassBuilder`])
//! - Introspection (patterns, fallback, sub-delegate accessor)
//! - Resolution (exact, name-only, pattern, fallback)
//! - Argument binding (directives reshape the call's arguments)
//! - Hosts (per-call and precompiled dispatch)

#![doc = include_str!("../../../README.md")]

pub mod binder;
pub mod class;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod handler;
pub mod host;
pub mod interface;
pub mod resolve;
pub mod value;

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod test_helpers;

pub use class::{
    ArgDirective, ClassBuilder, ClassId, Delegate, DelegateClass, DispatchMeta, MethodDecl,
    MethodRef, Param,
};
pub use config::{AmbiguityPolicy, HostKind, ProxyConfig};
pub use error::{ConfigError, DelegateError, DispatchError};
pub use handler::{DispatchContext, InvocationHandler, fetch_sub_delegate};
pub use host::{Dispatch, DynamicDispatch, PrecompiledDispatch, Proxy, ProxyFactory};
pub use interface::{Interface, MethodSig};
pub use resolve::{Resolution, StrategyKind};
pub use value::{Value, ValueType};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::class::{ArgDirective, ClassBuilder, Delegate, DelegateClass, MethodDecl};
    pub use crate::error::{DelegateError, DispatchError};
    pub use crate::host::{Proxy, ProxyFactory};
    pub use crate::interface::{Interface, MethodSig};
    pub use crate::value::{Value, ValueType};
}
