// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Explain how a call resolves on a demo delegate.
//!
//! Walks the same path the invocation handler takes: resolve on the
//! delegate, and when that fails and the delegate has a sub-delegate
//! accessor, fetch the sub-delegate and repeat. Every level is printed,
//! followed by the argument list the resolved method would receive.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use std::sync::Arc;

use camino::Utf8Path;
use duckprxy_core::binder::bind;
use duckprxy_core::{Delegate, DispatchContext, DispatchError, Value, ValueType, fetch_sub_delegate};
use ecow::EcoString;
use miette::{Diagnostic, Result, SourceSpan};
use thiserror::Error;

use super::load_config;
use crate::demos::{DemoName, format_call};

/// A `CALL` argument that is not `name` or `name(arg, ...)`.
#[derive(Debug, Error, Diagnostic)]
#[error("invalid call '{src}'")]
#[diagnostic(
    code(duckprxy::cli::call_syntax),
    help("write calls as `name` or `name(arg, ...)`, e.g. `bar(2, 3)` or `mybar(\"abc\")`")
)]
pub struct CallSyntaxError {
    #[source_code]
    src: String,
    #[label("{reason}")]
    span: SourceSpan,
    reason: &'static str,
}

/// A parsed `CALL` argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: EcoString,
    pub args: Vec<Value>,
}

impl Call {
    /// Parameter types implied by the literal arguments. `null` counts as
    /// `object`.
    pub fn param_types(&self) -> Vec<ValueType> {
        self.args
            .iter()
            .map(|arg| arg.value_type().unwrap_or(ValueType::Object))
            .collect()
    }
}

/// Parse `name` or `name(arg, ...)`.
///
/// Arguments are literals: `null`, `true`, `false`, integers, floats,
/// double-quoted strings (which may contain commas), or bare words (taken
/// as strings).
pub fn parse_call(src: &str) -> Result<Call, CallSyntaxError> {
    let error = |start: usize, len: usize, reason| CallSyntaxError {
        src: src.to_string(),
        span: (start, len).into(),
        reason,
    };

    let (name, rest) = match src.find('(') {
        Some(open) => (&src[..open], Some(open)),
        None => (src, None),
    };
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(error(0, name.len().max(1), "missing method name"));
    }
    if let Some(bad) = trimmed.find(|c: char| !(c.is_alphanumeric() || c == '_')) {
        let offset = name.len() - name.trim_start().len() + bad;
        return Err(error(offset, 1, "not allowed in a method name"));
    }

    let Some(open) = rest else {
        return Ok(Call {
            name: trimmed.into(),
            args: Vec::new(),
        });
    };
    let Some(close) = src.rfind(')').filter(|&close| close > open) else {
        return Err(error(open, src.len() - open, "unclosed argument list"));
    };
    if !src[close + 1..].trim().is_empty() {
        return Err(error(close + 1, src.len() - close - 1, "unexpected text after `)`"));
    }

    let inner = &src[open + 1..close];
    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_args(inner).into_iter().map(|arg| parse_literal(arg.trim())).collect()
    };
    Ok(Call {
        name: trimmed.into(),
        args,
    })
}

/// Split on commas outside double quotes.
fn split_args(inner: &str) -> Vec<&str> {
    let mut args = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, c) in inner.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                args.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    args.push(&inner[start..]);
    args
}

fn parse_literal(text: &str) -> Value {
    match text {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(i) = text.parse::<i64>() {
                Value::Int(i)
            } else if let Ok(x) = text.parse::<f64>() {
                Value::Float(x)
            } else if let Some(s) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
                Value::from(s)
            } else {
                Value::from(text)
            }
        }
    }
}

/// Print how `call` resolves on `demo`.
pub fn run(demo: DemoName, call: &str, config: Option<&Utf8Path>) -> Result<()> {
    let call = parse_call(call)?;
    let context = DispatchContext::new(load_config(config)?);
    for line in explain(&context, demo, &call)? {
        println!("{line}");
    }
    Ok(())
}

/// The explanation of `call` on `demo`, one line per step.
pub fn explain(context: &DispatchContext, demo: DemoName, call: &Call) -> Result<Vec<String>> {
    let param_types = call.param_types();
    let types: Vec<&str> = param_types.iter().map(|ty| ty.name()).collect();
    let mut lines = vec![format!(
        "call: {} as {}({})",
        format_call(&call.name, &call.args),
        call.name,
        types.join(", ")
    )];

    let mut delegate: Arc<dyn Delegate> = demo.delegate();
    let limit = context.config().max_subdelegate_depth;
    for depth in 0..=limit {
        let plan = context.plan_for(&delegate.class())?;
        let class = plan.class().name();

        if let Some(resolution) = plan.resolve(&call.name, &param_types) {
            lines.push(format!(
                "{class}: resolved by {} to {}",
                resolution.strategy, resolution.method
            ));
            let bound = bind(&call.name, &resolution.method, &call.args);
            let bound: Vec<String> = bound.iter().map(ToString::to_string).collect();
            lines.push(format!("bound: [{}]", bound.join(", ")));
            return Ok(lines);
        }

        let Some(accessor) = plan.descriptor().sub_delegate_accessor() else {
            lines.push(format!("{class}: unresolved"));
            return Err(DispatchError::NoMatchingMethod {
                name: call.name.clone(),
                param_types: duckprxy_core::value::format_param_types(&param_types),
            }
            .into());
        };
        lines.push(format!(
            "{class}: unresolved, deferring to sub-delegate via {}",
            accessor.name()
        ));

        delegate = fetch_sub_delegate(plan.class(), accessor, delegate.as_ref())?;
        tracing::debug!(depth, sub_delegate = %delegate.class().name(), "explaining sub-delegate");
    }

    Err(DispatchError::SubDelegateDepthExceeded {
        name: call.name.clone(),
        depth: limit,
    }
    .into())
}
