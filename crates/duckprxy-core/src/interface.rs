// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Target interfaces a proxy implements.
//!
//! **DDD Context:** Dispatch — Value Objects

use std::fmt;
use std::sync::Arc;

use ecow::EcoString;

use crate::value::{ValueType, format_param_types};

/// Signature of one interface method: the shape of a call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSig {
    pub name: EcoString,
    pub params: Vec<ValueType>,
    /// `None` for void methods.
    pub returns: Option<ValueType>,
}

impl MethodSig {
    /// A void method with no parameters.
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
        }
    }

    #[must_use]
    pub fn param(mut self, ty: ValueType) -> Self {
        self.params.push(ty);
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: ValueType) -> Self {
        self.returns = Some(ty);
        self
    }
}

impl fmt::Display for MethodSig {
    /// Renders as `name(int, string) -> int`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, format_param_types(&self.params))?;
        match self.returns {
            Some(ty) => write!(f, " -> {ty}"),
            None => f.write_str(" -> void"),
        }
    }
}

/// A named set of method signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    name: EcoString,
    methods: Vec<MethodSig>,
}

impl Interface {
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    #[must_use]
    pub fn method(mut self, sig: MethodSig) -> Self {
        self.methods.push(sig);
        self
    }

    /// Finish building; interfaces are shared between proxies.
    #[must_use]
    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.name
    }

    #[must_use]
    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }
}
