// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Proxy hosts: the mechanisms that turn a delegate into an object
//! implementing a set of interfaces.
//!
//! **DDD Context:** Dispatch
//!
//! Two hosts exist and must behave identically for every call:
//!
//! | Host | Resolution |
//! |------|------------|
//! | [`DynamicDispatch`] | per call, through the strategy chain |
//! | [`PrecompiledDispatch`] | once per interface method, at build time |
//!
//! [`ProxyFactory`] picks one according to [`ProxyConfig::host`].

mod dynamic;
mod precompiled;

pub use dynamic::DynamicDispatch;
pub use precompiled::PrecompiledDispatch;

use std::fmt;
use std::sync::Arc;

use ecow::EcoString;
use tracing::{debug, instrument};

use crate::class::Delegate;
use crate::config::{HostKind, ProxyConfig};
use crate::descriptor::DescriptorCache;
use crate::error::{ConfigError, DispatchError};
use crate::handler::{DispatchContext, InvocationHandler};
use crate::interface::{Interface, MethodSig};
use crate::value::Value;

/// A host's call path.
pub trait Dispatch: fmt::Debug + Send + Sync {
    fn kind(&self) -> HostKind;

    /// Handle a call made through interface method `sig`.
    ///
    /// # Errors
    ///
    /// Any [`DispatchError`] raised while resolving or invoking the call.
    fn dispatch(&self, sig: &MethodSig, args: &[Value]) -> Result<Value, DispatchError>;
}

/// An object implementing one main interface and any number of secondary
/// interfaces by dispatching to a delegate.
pub struct Proxy {
    interfaces: Vec<Arc<Interface>>,
    host: Box<dyn Dispatch>,
}

impl Proxy {
    /// All implemented interfaces, main interface first.
    #[must_use]
    pub fn interfaces(&self) -> &[Arc<Interface>] {
        &self.interfaces
    }

    #[must_use]
    pub fn host_kind(&self) -> HostKind {
        self.host.kind()
    }

    /// Whether this proxy implements the interface named `interface_name`.
    #[must_use]
    pub fn implements(&self, interface_name: &str) -> bool {
        self.interfaces.iter().any(|i| i.name() == interface_name)
    }

    /// Find the interface method a call to `name` with `arity` arguments
    /// targets. A signature with matching arity is preferred; otherwise the
    /// first one declared with that name.
    #[must_use]
    pub fn signature(&self, name: &str, arity: usize) -> Option<&MethodSig> {
        let mut named = self
            .interfaces
            .iter()
            .flat_map(|i| i.methods())
            .filter(|sig| sig.name == name)
            .peekable();
        let first = *named.peek()?;
        Some(named.find(|sig| sig.params.len() == arity).unwrap_or(first))
    }

    /// Call an interface method by name.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NotAnInterfaceMethod`] if no interface declares
    /// `name`; otherwise whatever the host raises.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, DispatchError> {
        let sig = self
            .signature(name, args.len())
            .ok_or_else(|| DispatchError::NotAnInterfaceMethod { name: name.into() })?;
        self.host.dispatch(sig, args)
    }

    /// Call an interface method by its full signature.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NotAnInterfaceMethod`] if no interface declares
    /// `sig`; otherwise whatever the host raises.
    pub fn call_sig(&self, sig: &MethodSig, args: &[Value]) -> Result<Value, DispatchError> {
        let declared = self
            .interfaces
            .iter()
            .any(|i| i.methods().contains(sig));
        if !declared {
            return Err(DispatchError::NotAnInterfaceMethod {
                name: sig.name.clone(),
            });
        }
        self.host.dispatch(sig, args)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&EcoString> = self.interfaces.iter().map(|i| i.name()).collect();
        f.debug_struct("Proxy")
            .field("interfaces", &names)
            .field("host", &self.host)
            .finish()
    }
}

/// Builds proxies. Proxies from one factory share its configuration and
/// descriptor cache.
#[derive(Debug, Clone, Default)]
pub struct ProxyFactory {
    context: Arc<DispatchContext>,
}

impl ProxyFactory {
    #[must_use]
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            context: Arc::new(DispatchContext::new(config)),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        self.context.config()
    }

    #[must_use]
    pub fn cache(&self) -> &DescriptorCache {
        self.context.cache()
    }

    /// Build a proxy using the configured host.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the delegate's class cannot be described.
    pub fn make_proxy(
        &self,
        main: Arc<Interface>,
        delegate: Arc<dyn Delegate>,
        secondary: &[Arc<Interface>],
    ) -> Result<Proxy, ConfigError> {
        self.make_proxy_with(self.config().host, main, delegate, secondary)
    }

    /// Build a proxy with an explicit host.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the delegate's class cannot be described.
    #[instrument(skip_all, fields(interface = %main.name(), host = ?host))]
    pub fn make_proxy_with(
        &self,
        host: HostKind,
        main: Arc<Interface>,
        delegate: Arc<dyn Delegate>,
        secondary: &[Arc<Interface>],
    ) -> Result<Proxy, ConfigError> {
        let handler = InvocationHandler::new(delegate, Arc::clone(&self.context))?;
        let mut interfaces = Vec::with_capacity(secondary.len() + 1);
        interfaces.push(main);
        interfaces.extend(secondary.iter().cloned());

        let host: Box<dyn Dispatch> = match host {
            HostKind::Dynamic => Box::new(DynamicDispatch::new(handler)),
            HostKind::Precompiled => Box::new(PrecompiledDispatch::new(
                handler,
                interfaces.iter().map(|i| &**i),
            )),
        };
        debug!(interfaces = interfaces.len(), "proxy built");
        Ok(Proxy { interfaces, host })
    }
}
