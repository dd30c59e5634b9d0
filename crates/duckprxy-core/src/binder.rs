// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Argument binding: reshaping a call's arguments into a delegate method's
//! parameter list.
//!
//! **DDD Context:** Dispatch
//!
//! Each parameter is filled in order. A parameter carrying an
//! [`ArgDirective`] is filled from the call context (name, whole argument
//! list, a specific argument, or nothing). Every other parameter takes the
//! next unconsumed call argument, left to right; directive slots do not
//! advance that cursor.
//!
//! Binding is lenient: missing arguments and out-of-range positions leave the
//! parameter's zero value, extra arguments are ignored, and no type checking
//! happens. A mismatch surfaces, if at all, when the body runs.

use crate::class::{ArgDirective, MethodRef, Param};
use crate::value::Value;

/// Build the argument list for `method` from a call named `call_name`.
///
/// The result always has exactly `method.params().len()` entries. `args` is
/// never modified.
#[must_use]
pub fn bind(call_name: &str, method: &MethodRef, args: &[Value]) -> Vec<Value> {
    bind_params(call_name, method.params(), args)
}

/// [`bind`] over a bare parameter list.
#[must_use]
pub fn bind_params(call_name: &str, params: &[Param], args: &[Value]) -> Vec<Value> {
    let mut positional = args.iter();
    params
        .iter()
        .map(|param| match param.directive {
            None => positional
                .next()
                .cloned()
                .unwrap_or_else(|| param.ty.zero_value()),
            Some(ArgDirective::Null) => param.ty.zero_value(),
            Some(ArgDirective::Name) => Value::Str(call_name.into()),
            Some(ArgDirective::Args) => Value::list(args.iter().cloned()),
            Some(ArgDirective::ArgN(pos)) => args
                .get(pos)
                .cloned()
                .unwrap_or_else(|| param.ty.zero_value()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn p(ty: ValueType) -> Param {
        Param::positional(ty)
    }

    fn d(ty: ValueType, directive: ArgDirective) -> Param {
        Param::directed(ty, directive)
    }

    #[test]
    fn positional_params_take_arguments_in_order() {
        let params = [p(ValueType::Int), p(ValueType::Str)];
        let bound = bind_params("f", &params, &[Value::from(1), Value::from("a")]);
        assert_eq!(bound, vec![Value::from(1), Value::from("a")]);
    }

    #[test]
    fn argn_pair_reverses_arguments() {
        let params = [
            d(ValueType::Str, ArgDirective::ArgN(1)),
            d(ValueType::Str, ArgDirective::ArgN(0)),
        ];
        let bound = bind_params("bazTwo", &params, &[Value::from("DEF"), Value::from("ABC")]);
        assert_eq!(bound, vec![Value::from("ABC"), Value::from("DEF")]);
    }

    #[test]
    fn name_directive_binds_invoked_name() {
        let params = [d(ValueType::Str, ArgDirective::Name)];
        let bound = bind_params("mybar", &params, &[Value::from("abc")]);
        assert_eq!(bound, vec![Value::from("mybar")]);
    }

    #[test]
    fn args_directive_binds_full_argument_list() {
        let params = [
            d(ValueType::Str, ArgDirective::Name),
            d(ValueType::List, ArgDirective::Args),
        ];
        let bound = bind_params("bar", &params, &[Value::from(2), Value::from(3)]);
        assert_eq!(
            bound,
            vec![Value::from("bar"), Value::list([Value::from(2), Value::from(3)])]
        );
    }

    #[test]
    fn directive_slots_do_not_consume_positional_arguments() {
        // bar(@name string, string s, string t) called as foo("x", "y")
        let params = [
            d(ValueType::Str, ArgDirective::Name),
            p(ValueType::Str),
            p(ValueType::Str),
        ];
        let bound = bind_params("foo", &params, &[Value::from("x"), Value::from("y")]);
        assert_eq!(
            bound,
            vec![Value::from("foo"), Value::from("x"), Value::from("y")]
        );
    }

    #[test]
    fn argn_and_positional_may_reuse_the_same_argument() {
        let params = [d(ValueType::Int, ArgDirective::ArgN(0)), p(ValueType::Int)];
        let bound = bind_params("f", &params, &[Value::from(7)]);
        assert_eq!(bound, vec![Value::from(7), Value::from(7)]);
    }

    #[test]
    fn exhausted_arguments_leave_zero_values() {
        let params = [p(ValueType::Int), p(ValueType::Bool), p(ValueType::Str)];
        let bound = bind_params("f", &params, &[Value::from(5)]);
        assert_eq!(bound, vec![Value::from(5), Value::Bool(false), Value::Null]);
    }

    #[test]
    fn out_of_range_argn_leaves_zero_value() {
        let params = [d(ValueType::Float, ArgDirective::ArgN(3))];
        let bound = bind_params("f", &params, &[Value::from(1)]);
        assert_eq!(bound, vec![Value::Float(0.0)]);
    }

    #[test]
    fn null_directive_yields_zero_value() {
        let params = [
            d(ValueType::Object, ArgDirective::Null),
            d(ValueType::Int, ArgDirective::Null),
            p(ValueType::Int),
        ];
        let bound = bind_params("f", &params, &[Value::from(9)]);
        assert_eq!(bound, vec![Value::Null, Value::Int(0), Value::from(9)]);
    }

    #[test]
    fn extra_arguments_are_ignored() {
        let params = [p(ValueType::Int)];
        let bound = bind_params("f", &params, &[Value::from(1), Value::from(2)]);
        assert_eq!(bound, vec![Value::from(1)]);
    }

    #[test]
    fn zero_parameter_method_binds_nothing() {
        let bound = bind_params("barTwo", &[], &[Value::from(4), Value::from(5)]);
        assert!(bound.is_empty());
    }

    #[test]
    fn mismatched_types_are_passed_through() {
        let params = [d(ValueType::Int, ArgDirective::Name)];
        let bound = bind_params("f", &params, &[]);
        assert_eq!(bound, vec![Value::from("f")]);
    }
}
