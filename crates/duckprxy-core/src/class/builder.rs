// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fluent registration of delegate classes.
//!
//! **DDD Context:** Dispatch
//!
//! ```
//! use std::sync::Arc;
//! use duckprxy_core::{ArgDirective, ClassBuilder, MethodDecl, Value, ValueType};
//!
//! struct Counter;
//!
//! let class = ClassBuilder::<Counter>::new("Counter")
//!     .method(MethodDecl::new("size").returns(ValueType::Int), |_, _| Ok(Value::Int(3)))
//!     .method(
//!         MethodDecl::new("describe")
//!             .param_with(ValueType::Str, ArgDirective::Name)
//!             .returns(ValueType::Str)
//!             .pattern("describe.*")
//!             .fallback(),
//!         |_, args| Ok(args[0].clone()),
//!     )
//!     .build();
//! assert_eq!(class.methods().len(), 2);
//! # impl duckprxy_core::Delegate for Counter {
//! #     fn class(&self) -> Arc<duckprxy_core::DelegateClass> { unreachable!() }
//! # }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use ecow::EcoString;

use super::{
    ArgDirective, ClassId, Delegate, DelegateClass, DispatchMeta, MethodBody, MethodRef, Param,
    downcast,
};
use crate::error::{DelegateError, DispatchError};
use crate::value::{Value, ValueType};

/// Declaration of a single delegate method: its shape and dispatch roles.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    name: EcoString,
    params: Vec<Param>,
    returns: Option<ValueType>,
    dispatch: DispatchMeta,
}

impl MethodDecl {
    /// A void method with no parameters.
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: None,
            dispatch: DispatchMeta::default(),
        }
    }

    /// Appends a positional parameter.
    #[must_use]
    pub fn param(mut self, ty: ValueType) -> Self {
        self.params.push(Param::positional(ty));
        self
    }

    /// Appends a parameter filled by `directive`.
    #[must_use]
    pub fn param_with(mut self, ty: ValueType, directive: ArgDirective) -> Self {
        self.params.push(Param::directed(ty, directive));
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: ValueType) -> Self {
        self.returns = Some(ty);
        self
    }

    /// Adds a call-name pattern this method answers to.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<EcoString>) -> Self {
        self.dispatch.patterns.push(pattern.into());
        self
    }

    /// Marks the method as the class's fallback.
    #[must_use]
    pub fn fallback(mut self) -> Self {
        self.dispatch.fallback = true;
        self
    }

    /// Marks the method as the class's sub-delegate accessor.
    #[must_use]
    pub fn subdelegate(mut self) -> Self {
        self.dispatch.subdelegate = true;
        self
    }
}

/// Converts a delegate's own receiver into the receiver its superclass methods expect.
type Upcast<T> = for<'a> fn(&'a T) -> &'a dyn Delegate;

/// Builder for a [`DelegateClass`] whose methods run against `T`.
pub struct ClassBuilder<T> {
    name: EcoString,
    superclass: Option<(Arc<DelegateClass>, Upcast<T>)>,
    methods: Vec<MethodRef>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Delegate> ClassBuilder<T> {
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            methods: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Inherit the methods of `parent`. Inherited methods are invoked on the
    /// receiver `upcast` returns.
    #[must_use]
    pub fn extends(mut self, parent: Arc<DelegateClass>, upcast: Upcast<T>) -> Self {
        self.superclass = Some((parent, upcast));
        self
    }

    /// Registers a method. `body` receives the delegate and the bound arguments.
    #[must_use]
    pub fn method<F>(mut self, decl: MethodDecl, body: F) -> Self
    where
        F: Fn(&T, &[Value]) -> Result<Value, DelegateError> + Send + Sync + 'static,
    {
        let class = self.name.clone();
        let method = decl.name.clone();
        let body: MethodBody = Arc::new(move |receiver, args| {
            let Some(this) = downcast::<T>(receiver) else {
                return Err(DispatchError::ReceiverMismatch {
                    class: class.clone(),
                    method: method.clone(),
                });
            };
            body(this, args).map_err(DispatchError::Delegate)
        });
        self.methods.push(MethodRef {
            name: decl.name,
            params: decl.params,
            returns: decl.returns,
            dispatch: decl.dispatch,
            defined_in: self.name.clone(),
            body,
        });
        self
    }

    /// Finishes the class, appending inherited methods after the own ones.
    #[must_use]
    pub fn build(self) -> Arc<DelegateClass> {
        let mut methods: Vec<Arc<MethodRef>> = self.methods.into_iter().map(Arc::new).collect();
        let own_count = methods.len();

        let superclass = self.superclass.map(|(parent, upcast)| {
            for inherited in parent.methods() {
                let hidden = methods[..own_count].iter().any(|own| {
                    own.name == inherited.name && own.has_param_types(&inherited.param_types())
                });
                if hidden {
                    continue;
                }
                let class = self.name.clone();
                let parent_method = Arc::clone(inherited);
                let body: MethodBody = Arc::new(move |receiver, args| {
                    let Some(this) = downcast::<T>(receiver) else {
                        return Err(DispatchError::ReceiverMismatch {
                            class: class.clone(),
                            method: parent_method.name.clone(),
                        });
                    };
                    parent_method.invoke(upcast(this), args)
                });
                methods.push(Arc::new(inherited.rebased(body)));
            }
            parent
        });

        Arc::new(DelegateClass {
            id: ClassId::allocate(),
            name: self.name,
            superclass,
            methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::Greeter;

    #[test]
    fn method_decl_collects_roles() {
        let decl = MethodDecl::new("m")
            .param(ValueType::Int)
            .param_with(ValueType::Str, ArgDirective::Name)
            .returns(ValueType::Int)
            .pattern("a.*")
            .pattern("b.*")
            .fallback()
            .subdelegate();
        assert_eq!(decl.params.len(), 2);
        assert_eq!(decl.params[1].directive, Some(ArgDirective::Name));
        assert_eq!(decl.dispatch.patterns, vec![EcoString::from("a.*"), EcoString::from("b.*")]);
        assert!(decl.dispatch.fallback);
        assert!(decl.dispatch.subdelegate);
    }

    #[test]
    fn plain_method_has_no_dispatch_roles() {
        let decl = MethodDecl::new("m");
        assert!(decl.dispatch.is_empty());
        assert_eq!(decl.returns, None);
    }

    #[test]
    fn body_errors_become_delegate_errors() {
        let class = ClassBuilder::<Greeter>::new("Failing")
            .method(MethodDecl::new("explode"), |_, _| Err("kaboom".into()))
            .build();
        let err = class.methods()[0]
            .invoke(&Greeter::new("x"), &[])
            .unwrap_err();
        assert!(matches!(err, DispatchError::Delegate(_)));
        assert_eq!(err.to_string(), "kaboom");
    }
}
