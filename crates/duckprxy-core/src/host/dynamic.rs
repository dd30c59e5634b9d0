// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Host that resolves every call when it is made.

use crate::config::HostKind;
use crate::error::DispatchError;
use crate::handler::InvocationHandler;
use crate::interface::MethodSig;
use crate::value::Value;

use super::Dispatch;

/// Forwards each call straight to the [`InvocationHandler`].
#[derive(Debug)]
pub struct DynamicDispatch {
    handler: InvocationHandler,
}

impl DynamicDispatch {
    #[must_use]
    pub fn new(handler: InvocationHandler) -> Self {
        Self { handler }
    }

    #[must_use]
    pub fn handler(&self) -> &InvocationHandler {
        &self.handler
    }
}

impl Dispatch for DynamicDispatch {
    fn kind(&self) -> HostKind {
        HostKind::Dynamic
    }

    fn dispatch(&self, sig: &MethodSig, args: &[Value]) -> Result<Value, DispatchError> {
        self.handler.invoke(sig, args)
    }
}
