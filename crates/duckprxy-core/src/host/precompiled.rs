// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Host that resolves every interface method once, when the proxy is built.
//!
//! The resulting table maps each signature to its delegate method, or to
//! nothing when the delegate cannot answer it locally. Calls then skip the
//! strategy chain entirely: they bind and invoke the stored method, or fall
//! through to the handler's sub-delegate. Both paths share one
//! [`InvocationHandler`], so the sub-delegate is still fetched at most once.

use std::collections::HashMap;

use tracing::debug;

use crate::config::HostKind;
use crate::error::DispatchError;
use crate::handler::{InvocationHandler, conform_return};
use crate::interface::{Interface, MethodSig};
use crate::resolve::Resolution;
use crate::value::Value;

use super::Dispatch;

/// Dispatches through a table built from the proxy's interfaces.
#[derive(Debug)]
pub struct PrecompiledDispatch {
    handler: InvocationHandler,
    table: HashMap<MethodSig, Option<Resolution>>,
}

impl PrecompiledDispatch {
    /// Resolve every method of `interfaces` against the handler's delegate.
    #[must_use]
    pub fn new<'a>(
        handler: InvocationHandler,
        interfaces: impl IntoIterator<Item = &'a Interface>,
    ) -> Self {
        let mut table = HashMap::new();
        for sig in interfaces.into_iter().flat_map(Interface::methods) {
            table
                .entry(sig.clone())
                .or_insert_with(|| handler.plan().resolve(&sig.name, &sig.params));
        }
        debug!(
            class = %handler.plan().class().name(),
            signatures = table.len(),
            unresolved = table.values().filter(|r| r.is_none()).count(),
            "precompiled dispatch table"
        );
        Self { handler, table }
    }

    #[must_use]
    pub fn handler(&self) -> &InvocationHandler {
        &self.handler
    }

    /// The precompiled resolution for `sig`: `None` if `sig` is not in the
    /// table, `Some(None)` if it was left for the sub-delegate.
    #[must_use]
    pub fn resolution_for(&self, sig: &MethodSig) -> Option<Option<&Resolution>> {
        self.table.get(sig).map(Option::as_ref)
    }
}

impl Dispatch for PrecompiledDispatch {
    fn kind(&self) -> HostKind {
        HostKind::Precompiled
    }

    fn dispatch(&self, sig: &MethodSig, args: &[Value]) -> Result<Value, DispatchError> {
        let value = match self.table.get(sig) {
            Some(Some(resolution)) => self.handler.call(&sig.name, &resolution.method, args)?,
            Some(None) => self.handler.fall_through(&sig.name, &sig.params, args)?,
            // Signatures outside the interfaces are resolved on demand.
            None => return self.handler.invoke(sig, args),
        };
        Ok(conform_return(sig.returns, value))
    }
}
