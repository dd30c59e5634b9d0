// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for argument binding and call resolution.
//!
//! 1. **Binding shape**: the bound list always has one entry per parameter,
//!    and the call's arguments are left untouched
//! 2. **Binding is deterministic**: binding the same call twice agrees
//! 3. **`@argN` permutations**: a parameter list of `@argN` directives
//!    reorders the arguments exactly as the positions say
//! 4. **Positional fill**: undirected parameters take arguments in order,
//!    then zero values
//! 5. **Resolution is idempotent**: the same call resolves to the same
//!    method through the same strategy
//! 6. **Patterns match whole names**: `ping.*` catches every name that starts
//!    with `ping` and has no exact or name-only match
//!
//! **DDD Context:** Dispatch

use std::sync::Arc;

use proptest::prelude::*;

use crate::binder::bind_params;
use crate::class::{ArgDirective, Delegate, Param};
use crate::config::AmbiguityPolicy;
use crate::resolve::{DispatchPlan, StrategyKind};
use crate::test_helpers::Recorder;
use crate::value::{Value, ValueType};

// ============================================================================
// Generators
// ============================================================================

fn value_type() -> impl Strategy<Value = ValueType> {
    prop::sample::select(ValueType::ALL.to_vec())
}

/// Scalar values; floats stay finite so equality is meaningful.
fn value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9..1.0e9f64).prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,8}".prop_map(Value::from),
    ]
}

fn args() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(value(), 0..6)
}

fn directive() -> impl Strategy<Value = Option<ArgDirective>> {
    prop_oneof![
        3 => Just(None),
        1 => Just(Some(ArgDirective::Null)),
        1 => Just(Some(ArgDirective::Name)),
        1 => Just(Some(ArgDirective::Args)),
        2 => (0usize..8).prop_map(|pos| Some(ArgDirective::ArgN(pos))),
    ]
}

fn params() -> impl Strategy<Value = Vec<Param>> {
    prop::collection::vec(
        (value_type(), directive()).prop_map(|(ty, directive)| Param { ty, directive }),
        0..6,
    )
}

fn call_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,10}"
}

/// Non-empty argument list plus a permutation of its indices.
fn args_and_permutation() -> impl Strategy<Value = (Vec<Value>, Vec<usize>)> {
    prop::collection::vec(value(), 1..6).prop_flat_map(|args| {
        let indices: Vec<usize> = (0..args.len()).collect();
        (Just(args), Just(indices).prop_shuffle())
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn recorder_plan() -> DispatchPlan {
    DispatchPlan::build(Recorder::default().class(), AmbiguityPolicy::Warn)
        .expect("recorder class is valid")
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Property 1: one bound value per parameter; arguments unchanged.
    #[test]
    fn bound_length_matches_params(name in call_name(), params in params(), args in args()) {
        let before = args.clone();
        let bound = bind_params(&name, &params, &args);
        prop_assert_eq!(bound.len(), params.len());
        prop_assert_eq!(args, before);
    }

    /// Property 2: binding the same call twice gives the same result.
    #[test]
    fn binding_is_deterministic(name in call_name(), params in params(), args in args()) {
        prop_assert_eq!(
            bind_params(&name, &params, &args),
            bind_params(&name, &params, &args)
        );
    }

    /// Property 3: `@argN` directives apply the permutation they describe.
    #[test]
    fn argn_directives_permute_arguments((args, perm) in args_and_permutation()) {
        let params: Vec<Param> = perm
            .iter()
            .map(|&pos| Param::directed(ValueType::Object, ArgDirective::ArgN(pos)))
            .collect();
        let bound = bind_params("permute", &params, &args);
        for (slot, &pos) in perm.iter().enumerate() {
            prop_assert_eq!(&bound[slot], &args[pos]);
        }
    }

    /// Property 4: undirected parameters take arguments left to right.
    #[test]
    fn positional_fill_then_zero_values(
        types in prop::collection::vec(value_type(), 0..6),
        args in args(),
    ) {
        let params: Vec<Param> = types.iter().copied().map(Param::positional).collect();
        let bound = bind_params("fill", &params, &args);
        for (i, ty) in types.iter().enumerate() {
            let expected = args.get(i).cloned().unwrap_or_else(|| ty.zero_value());
            prop_assert_eq!(&bound[i], &expected);
        }
    }

    /// Property 4b: `@name` always binds the invoked name.
    #[test]
    fn name_directive_binds_call_name(name in call_name(), args in args()) {
        let params = [Param::directed(ValueType::Str, ArgDirective::Name)];
        let bound = bind_params(&name, &params, &args);
        prop_assert_eq!(&bound[0], &Value::from(name.as_str()));
    }

    /// Property 5: resolving the same call twice yields the same method.
    #[test]
    fn resolution_is_idempotent(
        name in call_name(),
        types in prop::collection::vec(value_type(), 0..4),
    ) {
        let plan = recorder_plan();
        let first = plan.resolve(&name, &types);
        let second = plan.resolve(&name, &types);
        match (first, second) {
            (Some(a), Some(b)) => {
                prop_assert!(Arc::ptr_eq(&a.method, &b.method));
                prop_assert_eq!(a.strategy, b.strategy);
            }
            (None, None) => {}
            _ => prop_assert!(false, "resolution of {} changed between calls", name),
        }
    }

    /// Property 6: names extending `ping` resolve through the pattern.
    #[test]
    fn ping_prefixed_names_hit_the_pattern(suffix in "[a-zA-Z0-9]{1,8}") {
        let plan = recorder_plan();
        let name = format!("ping{suffix}");
        let resolution = plan.resolve(&name, &[]).expect("pattern or fallback resolves");
        prop_assert_eq!(resolution.strategy, StrategyKind::Pattern);

        // A prefix alone is not a whole-name match.
        let other = format!("x{name}");
        let resolution = plan.resolve(&other, &[]).expect("fallback resolves");
        prop_assert_eq!(resolution.strategy, StrategyKind::Fallback);
    }
}
