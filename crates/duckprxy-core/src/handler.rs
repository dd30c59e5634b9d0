// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The invocation handler: drives resolution, binding and invocation for one
//! delegate instance.
//!
//! **DDD Context:** Dispatch
//!
//! Per call:
//!
//! 1. resolve the call on the delegate's [`DispatchPlan`];
//! 2. if resolved, bind the arguments and invoke the method, returning its
//!    result verbatim;
//! 3. if unresolved and the class has a sub-delegate accessor, continue with
//!    the sub-delegate's own handler, passing the original call unchanged;
//! 4. otherwise fail with [`DispatchError::NoMatchingMethod`].
//!
//! The sub-delegate is fetched once, on the first call that needs it, and the
//! resulting handler is kept for the lifetime of this handler. A failed fetch
//! is not remembered; the next call tries again.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::binder::bind;
use crate::class::{Delegate, DelegateClass, MethodRef};
use crate::config::ProxyConfig;
use crate::descriptor::DescriptorCache;
use crate::error::{ConfigError, DelegateError, DispatchError};
use crate::interface::MethodSig;
use crate::resolve::{DispatchPlan, Resolution};
use crate::value::{Value, ValueType, format_param_types};

/// Configuration and plan cache shared by a factory and every handler it
/// creates, including nested sub-delegate handlers.
#[derive(Debug, Default)]
pub struct DispatchContext {
    config: ProxyConfig,
    cache: DescriptorCache,
}

impl DispatchContext {
    #[must_use]
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config,
            cache: DescriptorCache::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &DescriptorCache {
        &self.cache
    }

    /// The dispatch plan for `class`, from the cache when caching is enabled.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] raised while describing the class.
    pub fn plan_for(&self, class: &Arc<DelegateClass>) -> Result<Arc<DispatchPlan>, ConfigError> {
        if self.config.cache_descriptors {
            self.cache.plan_for(class, self.config.on_ambiguity)
        } else {
            DispatchPlan::build(Arc::clone(class), self.config.on_ambiguity).map(Arc::new)
        }
    }
}

/// Dispatches calls to one delegate instance.
pub struct InvocationHandler {
    delegate: Arc<dyn Delegate>,
    plan: Arc<DispatchPlan>,
    context: Arc<DispatchContext>,
    sub_handler: OnceCell<Arc<InvocationHandler>>,
    /// Number of sub-delegate hops from the proxy's own delegate.
    depth: usize,
}

impl InvocationHandler {
    /// Create the handler for a proxy's top-level delegate.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the delegate's class cannot be described.
    pub fn new(
        delegate: Arc<dyn Delegate>,
        context: Arc<DispatchContext>,
    ) -> Result<Self, ConfigError> {
        Self::at_depth(delegate, context, 0)
    }

    fn at_depth(
        delegate: Arc<dyn Delegate>,
        context: Arc<DispatchContext>,
        depth: usize,
    ) -> Result<Self, ConfigError> {
        let plan = context.plan_for(&delegate.class())?;
        Ok(Self {
            delegate,
            plan,
            context,
            sub_handler: OnceCell::new(),
            depth,
        })
    }

    #[must_use]
    pub fn delegate(&self) -> &Arc<dyn Delegate> {
        &self.delegate
    }

    #[must_use]
    pub fn plan(&self) -> &Arc<DispatchPlan> {
        &self.plan
    }

    /// The sub-delegate handler, if it has been fetched already.
    #[must_use]
    pub fn cached_sub_handler(&self) -> Option<&Arc<InvocationHandler>> {
        self.sub_handler.get()
    }

    /// Handle a call by name, declared parameter types and actual arguments.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::NoMatchingMethod`] when nothing in the sub-delegate
    ///   chain resolves the call.
    /// - [`DispatchError::SubDelegateAccess`] when an accessor fails.
    /// - [`DispatchError::Delegate`] with the delegate method's own error.
    pub fn on_invoke(
        &self,
        name: &str,
        param_types: &[ValueType],
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        match self.plan.resolve(name, param_types) {
            Some(Resolution { method, .. }) => self.call(name, &method, args),
            None => self.fall_through(name, param_types, args),
        }
    }

    /// Handle a call made through an interface method, conforming the result
    /// to the signature's return type.
    ///
    /// # Errors
    ///
    /// Same as [`InvocationHandler::on_invoke`].
    pub fn invoke(&self, sig: &MethodSig, args: &[Value]) -> Result<Value, DispatchError> {
        let value = self.on_invoke(&sig.name, &sig.params, args)?;
        Ok(conform_return(sig.returns, value))
    }

    /// Bind `args` for `method` and invoke it on this handler's delegate.
    ///
    /// # Errors
    ///
    /// Returns the method's own failure as [`DispatchError::Delegate`].
    pub fn call(
        &self,
        name: &str,
        method: &MethodRef,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        let bound = bind(name, method, args);
        method.invoke(self.delegate.as_ref(), &bound)
    }

    /// Continue an unresolved call on the sub-delegate, or fail.
    ///
    /// # Errors
    ///
    /// Same as [`InvocationHandler::on_invoke`].
    pub fn fall_through(
        &self,
        name: &str,
        param_types: &[ValueType],
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        let Some(accessor) = self.plan.descriptor().sub_delegate_accessor() else {
            return Err(DispatchError::NoMatchingMethod {
                name: name.into(),
                param_types: format_param_types(param_types),
            });
        };
        self.sub_handler(accessor, name)?
            .on_invoke(name, param_types, args)
    }

    fn sub_handler(
        &self,
        accessor: &MethodRef,
        name: &str,
    ) -> Result<&Arc<InvocationHandler>, DispatchError> {
        self.sub_handler.get_or_try_init(|| {
            let depth = self.depth + 1;
            let limit = self.context.config().max_subdelegate_depth;
            if depth > limit {
                return Err(DispatchError::SubDelegateDepthExceeded {
                    name: name.into(),
                    depth: limit,
                });
            }

            let class = self.plan.class().name();
            let sub_delegate = fetch_sub_delegate(self.plan.class(), accessor, self.delegate.as_ref())?;

            debug!(
                class = %class,
                accessor = %accessor.name(),
                sub_delegate = %sub_delegate.class().name(),
                depth,
                "fetched sub-delegate"
            );
            InvocationHandler::at_depth(sub_delegate, Arc::clone(&self.context), depth)
                .map(Arc::new)
                .map_err(|err| DispatchError::SubDelegateAccess {
                    class: class.clone(),
                    accessor: accessor.name().clone(),
                    reason: "sub-delegate class is invalid".to_string(),
                    source: Some(Box::new(err)),
                })
        })
    }
}

/// Invoke `accessor` on `delegate` and check that it produced a delegate.
///
/// `class` is the delegate's class, used to name the accessor in errors.
///
/// # Errors
///
/// Returns [`DispatchError::SubDelegateAccess`] when the accessor raises an
/// error or returns anything other than an object.
pub fn fetch_sub_delegate(
    class: &DelegateClass,
    accessor: &MethodRef,
    delegate: &dyn Delegate,
) -> Result<Arc<dyn Delegate>, DispatchError> {
    let access_error = |reason: String, source: Option<DelegateError>| DispatchError::SubDelegateAccess {
        class: class.name().clone(),
        accessor: accessor.name().clone(),
        reason,
        source,
    };

    let value = accessor.invoke(delegate, &[]).map_err(|err| match err {
        DispatchError::Delegate(source) => {
            access_error("accessor raised an error".to_string(), Some(source))
        }
        other => other,
    })?;
    match value {
        Value::Object(object) => Ok(object),
        Value::Null => Err(access_error("accessor returned null".to_string(), None)),
        other => {
            let ty = other.value_type().map_or("null", ValueType::name);
            Err(access_error(format!("accessor returned {ty}, not an object"), None))
        }
    }
}

impl std::fmt::Debug for InvocationHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationHandler")
            .field("class", self.plan.class().name())
            .field("depth", &self.depth)
            .field("sub_handler", &self.sub_handler.get())
            .finish_non_exhaustive()
    }
}

/// Map a delegate result onto the return type the call declared.
///
/// Void calls discard the result. A call expecting a value that receives
/// `Null` (for instance from a void delegate method) gets the zero value of
/// its return type.
pub(crate) fn conform_return(returns: Option<ValueType>, value: Value) -> Value {
    match returns {
        None => Value::Null,
        Some(ty) if value.is_null() => ty.zero_value(),
        Some(_) => value,
    }
}
