// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Delegate classes: registered method tables for delegate objects.
//!
//! **DDD Context:** Dispatch
//!
//! Rust has no runtime reflection, so every delegate type publishes a
//! [`DelegateClass`] describing the methods a proxy may call on it. Classes are
//! built once with [`ClassBuilder`] and shared through `Arc`.
//!
//! A class lists its own methods first, in declaration order, followed by the
//! methods it inherits from its superclass chain. An inherited method is
//! hidden when the class declares one with the same name and parameter types.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use ecow::EcoString;

use crate::error::DispatchError;
use crate::value::{Value, ValueType};

mod builder;

pub use builder::{ClassBuilder, MethodDecl};

/// Access to the concrete type behind a `dyn Delegate`.
///
/// Implemented for every `'static` type; delegate authors never implement it.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An object a proxy can forward calls to.
///
/// Implementors return the (usually lazily built, shared) class describing
/// their methods.
pub trait Delegate: AsAny + Send + Sync + 'static {
    /// The method table of this delegate's class.
    fn class(&self) -> Arc<DelegateClass>;
}

/// Downcast a delegate to its concrete type.
pub(crate) fn downcast<T: Delegate>(receiver: &dyn Delegate) -> Option<&T> {
    receiver.as_any().downcast_ref::<T>()
}

/// Global counter for allocating unique class identities.
static NEXT_CLASS_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a built [`DelegateClass`]. Two builds of the same Rust type
/// yield different ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    fn allocate() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// How a delegate parameter is filled from the call context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgDirective {
    /// The zero value of the parameter's type.
    Null,
    /// The invoked method's name, as a string.
    Name,
    /// The full original argument list, as a list.
    Args,
    /// The call's argument at this zero-based position. Out of range leaves
    /// the zero value.
    ArgN(usize),
}

impl fmt::Display for ArgDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgDirective::Null => f.write_str("@null"),
            ArgDirective::Name => f.write_str("@name"),
            ArgDirective::Args => f.write_str("@args"),
            ArgDirective::ArgN(pos) => write!(f, "@arg{pos}"),
        }
    }
}

/// A delegate method parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Param {
    pub ty: ValueType,
    /// `None` means "fill positionally from the call's arguments".
    pub directive: Option<ArgDirective>,
}

impl Param {
    /// A positional parameter.
    #[must_use]
    pub fn positional(ty: ValueType) -> Self {
        Self {
            ty,
            directive: None,
        }
    }

    /// A parameter filled by a directive.
    #[must_use]
    pub fn directed(ty: ValueType, directive: ArgDirective) -> Self {
        Self {
            ty,
            directive: Some(directive),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.directive {
            Some(directive) => write!(f, "{directive} {}", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// Dispatch roles a method declares beyond its own name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchMeta {
    /// Regular expressions matched (whole-string) against call names.
    pub patterns: Vec<EcoString>,
    /// Used when nothing else matches.
    pub fallback: bool,
    /// Returns a nested delegate to continue resolution on.
    pub subdelegate: bool,
}

impl DispatchMeta {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty() && !self.fallback && !self.subdelegate
    }
}

/// Type-erased method body. Receives the delegate and the bound arguments.
pub(crate) type MethodBody =
    Arc<dyn Fn(&dyn Delegate, &[Value]) -> Result<Value, DispatchError> + Send + Sync>;

/// An invokable method of a delegate class.
pub struct MethodRef {
    name: EcoString,
    params: Vec<Param>,
    returns: Option<ValueType>,
    dispatch: DispatchMeta,
    defined_in: EcoString,
    body: MethodBody,
}

impl MethodRef {
    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.name
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Declared parameter types, in order.
    #[must_use]
    pub fn param_types(&self) -> Vec<ValueType> {
        self.params.iter().map(|p| p.ty).collect()
    }

    /// Does this method's parameter type sequence equal `types`?
    #[must_use]
    pub fn has_param_types(&self, types: &[ValueType]) -> bool {
        self.params.len() == types.len() && self.params.iter().zip(types).all(|(p, t)| p.ty == *t)
    }

    /// Number of parameters filled positionally from call arguments.
    #[must_use]
    pub fn positional_count(&self) -> usize {
        self.params.iter().filter(|p| p.directive.is_none()).count()
    }

    /// Return type; `None` for void methods.
    #[must_use]
    pub fn returns(&self) -> Option<ValueType> {
        self.returns
    }

    #[must_use]
    pub fn dispatch(&self) -> &DispatchMeta {
        &self.dispatch
    }

    /// Name of the class that declared this method.
    #[must_use]
    pub fn defined_in(&self) -> &EcoString {
        &self.defined_in
    }

    /// Invoke the body on `receiver` with already-bound arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Delegate`] when the body fails and
    /// [`DispatchError::ReceiverMismatch`] when `receiver` is not an instance
    /// of the declaring Rust type.
    pub fn invoke(&self, receiver: &dyn Delegate, args: &[Value]) -> Result<Value, DispatchError> {
        (self.body)(receiver, args)
    }

    /// Copy of this method for a subclass, invoking through `body`.
    fn rebased(&self, body: MethodBody) -> Self {
        Self {
            name: self.name.clone(),
            params: self.params.clone(),
            returns: self.returns,
            dispatch: self.dispatch.clone(),
            defined_in: self.defined_in.clone(),
            body,
        }
    }
}

impl fmt::Debug for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("dispatch", &self.dispatch)
            .field("defined_in", &self.defined_in)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for MethodRef {
    /// Renders as `Class.name(@name string, int) -> int`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.defined_in, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")?;
        match self.returns {
            Some(ty) => write!(f, " -> {ty}"),
            None => f.write_str(" -> void"),
        }
    }
}

/// A delegate class: its name, superclass and enumerable methods.
pub struct DelegateClass {
    id: ClassId,
    name: EcoString,
    superclass: Option<Arc<DelegateClass>>,
    /// Own methods, then inherited ones not hidden by own methods.
    methods: Vec<Arc<MethodRef>>,
}

impl DelegateClass {
    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &EcoString {
        &self.name
    }

    #[must_use]
    pub fn superclass(&self) -> Option<&Arc<DelegateClass>> {
        self.superclass.as_ref()
    }

    /// Every invokable method, own methods first, then inherited ones.
    #[must_use]
    pub fn methods(&self) -> &[Arc<MethodRef>] {
        &self.methods
    }

    /// Methods declared directly on this class.
    pub fn declared_methods(&self) -> impl Iterator<Item = &Arc<MethodRef>> {
        self.methods.iter().filter(|m| m.defined_in == self.name)
    }

    /// All methods named `name`, in enumeration order.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<MethodRef>> {
        self.methods.iter().filter(move |m| m.name == name)
    }

    /// The method with this name and exact parameter type sequence.
    #[must_use]
    pub fn find_method(&self, name: &str, param_types: &[ValueType]) -> Option<&Arc<MethodRef>> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.has_param_types(param_types))
    }

    /// The ordered superclass chain, excluding this class.
    ///
    /// Example: `superclass_chain()` on `Child` → `["Parent", "Base"]`
    #[must_use]
    pub fn superclass_chain(&self) -> Vec<EcoString> {
        let mut chain = Vec::new();
        let mut current = self.superclass.as_ref();
        while let Some(class) = current {
            chain.push(class.name.clone());
            current = class.superclass.as_ref();
        }
        chain
    }
}

impl fmt::Debug for DelegateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("superclass", &self.superclass.as_ref().map(|s| &s.name))
            .field("methods", &self.methods)
            .finish()
    }
}
