// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Delegate introspection: extracting dispatch metadata from a class.
//!
//! **DDD Context:** Dispatch
//!
//! [`describe`] scans a [`DelegateClass`] once and produces an immutable
//! [`DelegateDescriptor`]: the name-pattern table, the fallback method and the
//! sub-delegate accessor. The result depends only on the class, so
//! [`DescriptorCache`] memoizes it (together with the strategy chain built
//! from it) per class identity.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use ecow::EcoString;
use regex::Regex;
use tracing::{debug, warn};

use crate::class::{ClassId, DelegateClass, MethodRef};
use crate::config::AmbiguityPolicy;
use crate::error::ConfigError;
use crate::resolve::DispatchPlan;
use crate::value::ValueType;

/// A compiled name pattern and the method it routes to.
#[derive(Debug, Clone)]
pub struct PatternEntry {
    pattern: EcoString,
    regex: Regex,
    method: Arc<MethodRef>,
}

impl PatternEntry {
    /// The pattern as declared.
    #[must_use]
    pub fn pattern(&self) -> &EcoString {
        &self.pattern
    }

    #[must_use]
    pub fn method(&self) -> &Arc<MethodRef> {
        &self.method
    }

    /// Does the pattern match the whole of `name`?
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Pattern → method table, iterated in insertion order.
///
/// Only "first match in iteration order" is guaranteed; when several patterns
/// match one call name, which one wins is unspecified.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    entries: Vec<PatternEntry>,
}

impl PatternTable {
    /// Inserts `pattern`, replacing an existing entry with the same pattern
    /// string in place. Returns the replaced method.
    fn insert(&mut self, entry: PatternEntry) -> Option<Arc<MethodRef>> {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.pattern == entry.pattern) {
            let replaced = std::mem::replace(existing, entry);
            return Some(replaced.method);
        }
        self.entries.push(entry);
        None
    }

    /// The first entry whose pattern matches `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&PatternEntry> {
        self.entries.iter().find(|e| e.matches(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Dispatch metadata of one delegate class.
#[derive(Debug, Clone)]
pub struct DelegateDescriptor {
    class_name: EcoString,
    patterns: PatternTable,
    fallback: Option<Arc<MethodRef>>,
    sub_delegate_accessor: Option<Arc<MethodRef>>,
}

impl DelegateDescriptor {
    #[must_use]
    pub fn class_name(&self) -> &EcoString {
        &self.class_name
    }

    #[must_use]
    pub fn patterns(&self) -> &PatternTable {
        &self.patterns
    }

    #[must_use]
    pub fn fallback(&self) -> Option<&Arc<MethodRef>> {
        self.fallback.as_ref()
    }

    #[must_use]
    pub fn sub_delegate_accessor(&self) -> Option<&Arc<MethodRef>> {
        self.sub_delegate_accessor.as_ref()
    }
}

/// Extract the dispatch metadata of `class`.
///
/// Methods are visited in the class's enumeration order (own methods, then
/// inherited). When a role is declared twice, `policy` decides between a
/// warning (the later declaration wins) and an error.
///
/// # Errors
///
/// - [`ConfigError::InvalidPattern`] for a pattern that is not a valid regex.
/// - [`ConfigError::InvalidSubDelegateAccessor`] for an accessor with
///   parameters or a non-object return type.
/// - [`ConfigError::AmbiguousFallback`], [`ConfigError::AmbiguousSubDelegate`]
///   and [`ConfigError::DuplicatePattern`] under [`AmbiguityPolicy::Reject`].
pub fn describe(
    class: &DelegateClass,
    policy: AmbiguityPolicy,
) -> Result<DelegateDescriptor, ConfigError> {
    let class_name = class.name().clone();
    let mut patterns = PatternTable::default();
    let mut fallback: Option<Arc<MethodRef>> = None;
    let mut accessor: Option<Arc<MethodRef>> = None;

    for method in class.methods() {
        let meta = method.dispatch();
        if meta.is_empty() {
            continue;
        }

        for pattern in &meta.patterns {
            let regex = compile_pattern(pattern).map_err(|source| ConfigError::InvalidPattern {
                class: class_name.clone(),
                method: method.name().clone(),
                pattern: pattern.clone(),
                source,
            })?;
            let replaced = patterns.insert(PatternEntry {
                pattern: pattern.clone(),
                regex,
                method: Arc::clone(method),
            });
            if let Some(previous) = replaced.filter(|prev| !Arc::ptr_eq(prev, method)) {
                match policy {
                    AmbiguityPolicy::Reject => {
                        return Err(ConfigError::DuplicatePattern {
                            class: class_name,
                            pattern: pattern.clone(),
                            first: previous.name().clone(),
                            second: method.name().clone(),
                        });
                    }
                    AmbiguityPolicy::Warn => warn!(
                        class = %class_name,
                        %pattern,
                        first = %previous.name(),
                        second = %method.name(),
                        "duplicate name pattern; later declaration wins"
                    ),
                }
            }
        }

        if meta.fallback {
            if let Some(previous) = &fallback {
                match policy {
                    AmbiguityPolicy::Reject => {
                        return Err(ConfigError::AmbiguousFallback {
                            class: class_name,
                            first: previous.name().clone(),
                            second: method.name().clone(),
                        });
                    }
                    AmbiguityPolicy::Warn => warn!(
                        class = %class_name,
                        first = %previous.name(),
                        second = %method.name(),
                        "multiple fallback methods; later declaration wins"
                    ),
                }
            }
            fallback = Some(Arc::clone(method));
        }

        if meta.subdelegate {
            validate_accessor(&class_name, method)?;
            if let Some(previous) = &accessor {
                match policy {
                    AmbiguityPolicy::Reject => {
                        return Err(ConfigError::AmbiguousSubDelegate {
                            class: class_name,
                            first: previous.name().clone(),
                            second: method.name().clone(),
                        });
                    }
                    AmbiguityPolicy::Warn => warn!(
                        class = %class_name,
                        first = %previous.name(),
                        second = %method.name(),
                        "multiple sub-delegate accessors; later declaration wins"
                    ),
                }
            }
            accessor = Some(Arc::clone(method));
        }
    }

    log_overloads(class);
    debug!(
        class = %class_name,
        patterns = patterns.len(),
        fallback = fallback.as_ref().map(|m| m.name().as_str()),
        subdelegate = accessor.as_ref().map(|m| m.name().as_str()),
        "described delegate class"
    );

    Ok(DelegateDescriptor {
        class_name,
        patterns,
        fallback,
        sub_delegate_accessor: accessor,
    })
}

/// Compile `pattern` so that it only matches whole names.
fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

fn validate_accessor(class: &EcoString, method: &MethodRef) -> Result<(), ConfigError> {
    let reason = if !method.params().is_empty() {
        "must not declare parameters"
    } else if method.returns() != Some(ValueType::Object) {
        "must return `object`"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidSubDelegateAccessor {
        class: class.clone(),
        method: method.name().clone(),
        reason,
    })
}

/// Name-only resolution over an overloaded name picks the first overload in
/// enumeration order; note such names once, when the class is described.
fn log_overloads(class: &DelegateClass) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for method in class.methods() {
        *counts.entry(method.name().as_str()).or_default() += 1;
    }
    let mut overloaded: Vec<&str> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name)
        .collect();
    if !overloaded.is_empty() {
        overloaded.sort_unstable();
        debug!(
            class = %class.name(),
            overloaded = ?overloaded,
            "overloaded methods; name-only resolution picks the first declared"
        );
    }
}

/// Memoized dispatch plans, keyed by class identity.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    plans: RwLock<HashMap<ClassId, Arc<DispatchPlan>>>,
}

impl DescriptorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached plan for `class`, describing it on first use.
    ///
    /// # Errors
    ///
    /// Propagates [`describe`] errors; failures are not cached.
    pub fn plan_for(
        &self,
        class: &Arc<DelegateClass>,
        policy: AmbiguityPolicy,
    ) -> Result<Arc<DispatchPlan>, ConfigError> {
        let id = class.id();
        if let Some(plan) = self
            .plans
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            debug!(class = %class.name(), "dispatch plan served from cache");
            return Ok(Arc::clone(plan));
        }

        let plan = Arc::new(DispatchPlan::build(Arc::clone(class), policy)?);
        let mut plans = self.plans.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have described the class meanwhile; keep the first.
        let cached = plans.entry(id).or_insert(plan);
        Ok(Arc::clone(cached))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.plans
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ArgDirective, ClassBuilder, Delegate, MethodDecl};
    use crate::test_helpers::{Greeter, Recorder};
    use crate::value::Value;

    fn object_accessor(name: &str) -> MethodDecl {
        MethodDecl::new(name).returns(ValueType::Object).subdelegate()
    }

    #[test]
    fn collects_patterns_fallback_and_accessor() {
        let class = ClassBuilder::<Greeter>::new("Full")
            .method(MethodDecl::new("a").pattern("foo.*").pattern("bar"), |_, _| {
                Ok(Value::Null)
            })
            .method(MethodDecl::new("b").fallback(), |_, _| Ok(Value::Null))
            .method(object_accessor("inner"), |_, _| Ok(Value::Null))
            .build();
        let descriptor = describe(&class, AmbiguityPolicy::Reject).unwrap();
        assert_eq!(descriptor.class_name(), "Full");
        assert_eq!(descriptor.patterns().len(), 2);
        assert_eq!(descriptor.fallback().map(|m| m.name().as_str()), Some("b"));
        assert_eq!(
            descriptor.sub_delegate_accessor().map(|m| m.name().as_str()),
            Some("inner")
        );
    }

    #[test]
    fn plain_class_has_empty_descriptor() {
        let class = Greeter::new("x").class();
        let descriptor = describe(&class, AmbiguityPolicy::Reject).unwrap();
        assert!(descriptor.patterns().is_empty());
        assert!(descriptor.fallback().is_none());
        assert!(descriptor.sub_delegate_accessor().is_none());
    }

    #[test]
    fn patterns_match_whole_call_name() {
        let class = Recorder::default().class();
        let descriptor = describe(&class, AmbiguityPolicy::Warn).unwrap();
        let table = descriptor.patterns();
        assert!(table.find("pingAll").is_some());
        assert!(table.find("ping").is_some());
        assert!(table.find("xping").is_none());
        // Matched against the call name, never the method's own name.
        assert!(table.find("catchPing").is_none());
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        let class = ClassBuilder::<Greeter>::new("Alt")
            .method(MethodDecl::new("m").pattern("get|set"), |_, _| Ok(Value::Null))
            .build();
        let descriptor = describe(&class, AmbiguityPolicy::Reject).unwrap();
        assert!(descriptor.patterns().find("get").is_some());
        assert!(descriptor.patterns().find("set").is_some());
        assert!(descriptor.patterns().find("getter").is_none());
        assert!(descriptor.patterns().find("reset").is_none());
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let class = ClassBuilder::<Greeter>::new("Bad")
            .method(MethodDecl::new("m").pattern("foo("), |_, _| Ok(Value::Null))
            .build();
        let err = describe(&class, AmbiguityPolicy::Warn).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
        assert_eq!(err.to_string(), "invalid name pattern 'foo(' on 'Bad.m'");
    }

    #[test]
    fn duplicate_pattern_later_wins_under_warn() {
        let class = ClassBuilder::<Greeter>::new("Dup")
            .method(MethodDecl::new("first").pattern("x.*"), |_, _| Ok(Value::Null))
            .method(MethodDecl::new("second").pattern("x.*"), |_, _| Ok(Value::Null))
            .build();
        let descriptor = describe(&class, AmbiguityPolicy::Warn).unwrap();
        assert_eq!(descriptor.patterns().len(), 1);
        let entry = descriptor.patterns().find("xyz").unwrap();
        assert_eq!(entry.method().name(), "second");
    }

    #[test]
    fn duplicate_pattern_rejected_under_reject() {
        let class = ClassBuilder::<Greeter>::new("Dup")
            .method(MethodDecl::new("first").pattern("x.*"), |_, _| Ok(Value::Null))
            .method(MethodDecl::new("second").pattern("x.*"), |_, _| Ok(Value::Null))
            .build();
        let err = describe(&class, AmbiguityPolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicatePattern { ref first, ref second, .. }
                if first == "first" && second == "second"
        ));
    }

    #[test]
    fn same_method_repeating_a_pattern_is_not_ambiguous() {
        let class = ClassBuilder::<Greeter>::new("Rep")
            .method(MethodDecl::new("m").pattern("a").pattern("a"), |_, _| {
                Ok(Value::Null)
            })
            .build();
        let descriptor = describe(&class, AmbiguityPolicy::Reject).unwrap();
        assert_eq!(descriptor.patterns().len(), 1);
    }

    #[test]
    fn overlapping_distinct_patterns_coexist() {
        let class = ClassBuilder::<Greeter>::new("Overlap")
            .method(MethodDecl::new("a").pattern("foo.*"), |_, _| Ok(Value::Null))
            .method(MethodDecl::new("b").pattern("fo+.*"), |_, _| Ok(Value::Null))
            .build();
        let descriptor = describe(&class, AmbiguityPolicy::Reject).unwrap();
        assert_eq!(descriptor.patterns().len(), 2);
        assert!(descriptor.patterns().iter().all(|e| e.matches("fooBar")));
    }

    #[test]
    fn multiple_fallbacks_warn_or_reject() {
        let class = ClassBuilder::<Greeter>::new("TwoFallbacks")
            .method(MethodDecl::new("one").fallback(), |_, _| Ok(Value::Null))
            .method(MethodDecl::new("two").fallback(), |_, _| Ok(Value::Null))
            .build();
        let descriptor = describe(&class, AmbiguityPolicy::Warn).unwrap();
        assert_eq!(descriptor.fallback().map(|m| m.name().as_str()), Some("two"));

        let err = describe(&class, AmbiguityPolicy::Reject).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousFallback { .. }));
    }

    #[test]
    fn multiple_accessors_warn_or_reject() {
        let class = ClassBuilder::<Greeter>::new("TwoAccessors")
            .method(object_accessor("left"), |_, _| Ok(Value::Null))
            .method(object_accessor("right"), |_, _| Ok(Value::Null))
            .build();
        let descriptor = describe(&class, AmbiguityPolicy::Warn).unwrap();
        assert_eq!(
            descriptor.sub_delegate_accessor().map(|m| m.name().as_str()),
            Some("right")
        );

        let err = describe(&class, AmbiguityPolicy::Reject).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousSubDelegate { .. }));
    }

    #[test]
    fn accessor_must_be_zero_argument() {
        let class = ClassBuilder::<Greeter>::new("Arg")
            .method(
                MethodDecl::new("inner")
                    .param_with(ValueType::Str, ArgDirective::Name)
                    .returns(ValueType::Object)
                    .subdelegate(),
                |_, _| Ok(Value::Null),
            )
            .build();
        let err = describe(&class, AmbiguityPolicy::Warn).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sub-delegate accessor 'Arg.inner' must not declare parameters"
        );
    }

    #[test]
    fn accessor_must_return_object() {
        let class = ClassBuilder::<Greeter>::new("Ret")
            .method(
                MethodDecl::new("inner").returns(ValueType::Int).subdelegate(),
                |_, _| Ok(Value::Null),
            )
            .build();
        let err = describe(&class, AmbiguityPolicy::Warn).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSubDelegateAccessor { reason, .. } if reason == "must return `object`"));
    }

    #[test]
    fn method_may_hold_several_roles() {
        let class = ClassBuilder::<Greeter>::new("Multi")
            .method(
                MethodDecl::new("everything")
                    .returns(ValueType::Object)
                    .pattern("any.*")
                    .fallback()
                    .subdelegate(),
                |_, _| Ok(Value::Null),
            )
            .build();
        let descriptor = describe(&class, AmbiguityPolicy::Reject).unwrap();
        let everything = &class.methods()[0];
        assert!(Arc::ptr_eq(descriptor.fallback().unwrap(), everything));
        assert!(Arc::ptr_eq(descriptor.sub_delegate_accessor().unwrap(), everything));
        assert!(Arc::ptr_eq(descriptor.patterns().find("anyX").unwrap().method(), everything));
    }

    #[test]
    fn cache_describes_each_class_once() {
        let cache = DescriptorCache::new();
        let class = Recorder::default().class();
        let first = cache.plan_for(&class, AmbiguityPolicy::Warn).unwrap();
        let second = cache.plan_for(&class, AmbiguityPolicy::Warn).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn cache_does_not_store_failures() {
        let cache = DescriptorCache::new();
        let class = ClassBuilder::<Greeter>::new("Bad")
            .method(MethodDecl::new("m").pattern("("), |_, _| Ok(Value::Null))
            .build();
        assert!(cache.plan_for(&class, AmbiguityPolicy::Warn).is_err());
        assert!(cache.is_empty());
    }
}
