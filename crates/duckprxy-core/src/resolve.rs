// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The resolution strategy chain.
//!
//! **DDD Context:** Dispatch
//!
//! A call (name + declared parameter types) is mapped to a delegate method by
//! trying a fixed, ordered list of strategies; the first one that yields a
//! method wins:
//!
//! 1. **Exact**: same name and identical parameter type sequence.
//! 2. **Name-only**: same name, any parameters. Over overloaded names the
//!    first method in enumeration order is picked; which overload that is, is
//!    unspecified.
//! 3. **Pattern**: the first name pattern (in table order) that matches the
//!    whole call name. When several patterns match, the winner is unspecified.
//! 4. **Fallback**: the class's fallback method, unless the class has a
//!    sub-delegate accessor, in which case the call is left unresolved so the
//!    handler can recurse into the sub-delegate.
//!
//! Strategies never fail: a miss is `None` and the chain moves on.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::class::{DelegateClass, MethodRef};
use crate::config::AmbiguityPolicy;
use crate::descriptor::{DelegateDescriptor, PatternTable, describe};
use crate::error::ConfigError;
use crate::value::ValueType;

/// Which strategy produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Exact,
    NameOnly,
    Pattern,
    Fallback,
}

impl StrategyKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Exact => "exact",
            StrategyKind::NameOnly => "name-only",
            StrategyKind::Pattern => "pattern",
            StrategyKind::Fallback => "fallback",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved call: the delegate method and the strategy that found it.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub method: Arc<MethodRef>,
    pub strategy: StrategyKind,
}

/// One independent resolution attempt.
pub trait ResolveStrategy: fmt::Debug + Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// The method this strategy maps the call to, if any.
    fn resolve(&self, name: &str, param_types: &[ValueType]) -> Option<Arc<MethodRef>>;
}

#[derive(Debug)]
struct ExactStrategy {
    class: Arc<DelegateClass>,
}

impl ResolveStrategy for ExactStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Exact
    }

    fn resolve(&self, name: &str, param_types: &[ValueType]) -> Option<Arc<MethodRef>> {
        self.class.find_method(name, param_types).cloned()
    }
}

#[derive(Debug)]
struct NameOnlyStrategy {
    class: Arc<DelegateClass>,
}

impl ResolveStrategy for NameOnlyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NameOnly
    }

    fn resolve(&self, name: &str, _param_types: &[ValueType]) -> Option<Arc<MethodRef>> {
        self.class.methods_named(name).next().cloned()
    }
}

#[derive(Debug)]
struct PatternStrategy {
    patterns: PatternTable,
}

impl ResolveStrategy for PatternStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Pattern
    }

    fn resolve(&self, name: &str, _param_types: &[ValueType]) -> Option<Arc<MethodRef>> {
        self.patterns.find(name).map(|entry| Arc::clone(entry.method()))
    }
}

/// Last link of the chain; which variant is fixed when the chain is built.
#[derive(Debug)]
enum TerminalStrategy {
    /// The class has a sub-delegate accessor: leave the call unresolved.
    DeferToSubDelegate,
    /// Every call reaching this point goes to the fallback.
    Fallback(Arc<MethodRef>),
    /// Nothing else can answer the call.
    Unresolvable,
}

impl ResolveStrategy for TerminalStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Fallback
    }

    fn resolve(&self, _name: &str, _param_types: &[ValueType]) -> Option<Arc<MethodRef>> {
        match self {
            TerminalStrategy::Fallback(method) => Some(Arc::clone(method)),
            TerminalStrategy::DeferToSubDelegate | TerminalStrategy::Unresolvable => None,
        }
    }
}

/// The fixed, ordered list of strategies for one delegate class.
#[derive(Debug)]
pub struct StrategyChain {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl StrategyChain {
    #[must_use]
    pub fn build(class: &Arc<DelegateClass>, descriptor: &DelegateDescriptor) -> Self {
        let terminal = if descriptor.sub_delegate_accessor().is_some() {
            TerminalStrategy::DeferToSubDelegate
        } else if let Some(fallback) = descriptor.fallback() {
            TerminalStrategy::Fallback(Arc::clone(fallback))
        } else {
            TerminalStrategy::Unresolvable
        };
        Self {
            strategies: vec![
                Box::new(ExactStrategy {
                    class: Arc::clone(class),
                }),
                Box::new(NameOnlyStrategy {
                    class: Arc::clone(class),
                }),
                Box::new(PatternStrategy {
                    patterns: descriptor.patterns().clone(),
                }),
                Box::new(terminal),
            ],
        }
    }

    /// Run the strategies in order; the first match wins.
    #[must_use]
    pub fn resolve(&self, name: &str, param_types: &[ValueType]) -> Option<Resolution> {
        self.strategies.iter().find_map(|strategy| {
            strategy.resolve(name, param_types).map(|method| Resolution {
                method,
                strategy: strategy.kind(),
            })
        })
    }

    /// The strategy kinds in evaluation order.
    #[must_use]
    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }
}

/// Everything needed to resolve calls against one delegate class.
#[derive(Debug)]
pub struct DispatchPlan {
    class: Arc<DelegateClass>,
    descriptor: DelegateDescriptor,
    chain: StrategyChain,
}

impl DispatchPlan {
    /// Describe `class` and build its strategy chain.
    ///
    /// # Errors
    ///
    /// Propagates [`describe`] errors.
    pub fn build(class: Arc<DelegateClass>, policy: AmbiguityPolicy) -> Result<Self, ConfigError> {
        let descriptor = describe(&class, policy)?;
        let chain = StrategyChain::build(&class, &descriptor);
        Ok(Self {
            class,
            descriptor,
            chain,
        })
    }

    #[must_use]
    pub fn class(&self) -> &Arc<DelegateClass> {
        &self.class
    }

    #[must_use]
    pub fn descriptor(&self) -> &DelegateDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }

    /// Resolve a call on this class.
    #[must_use]
    pub fn resolve(&self, name: &str, param_types: &[ValueType]) -> Option<Resolution> {
        let resolution = self.chain.resolve(name, param_types);
        match &resolution {
            Some(found) => trace!(
                class = %self.class.name(),
                call = name,
                strategy = %found.strategy,
                method = %found.method.name(),
                "resolved call"
            ),
            None => trace!(class = %self.class.name(), call = name, "call unresolved"),
        }
        resolution
    }
}
