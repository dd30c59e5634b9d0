// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Shared delegate fixtures for unit tests.

use std::sync::{Arc, LazyLock, Mutex};

use crate::class::{ArgDirective, ClassBuilder, Delegate, DelegateClass, MethodDecl};
use crate::value::{Value, ValueType};

/// A delegate with a name and two plain methods.
pub struct Greeter {
    pub name: String,
}

impl Greeter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

static GREETER: LazyLock<Arc<DelegateClass>> = LazyLock::new(|| {
    ClassBuilder::<Greeter>::new("Greeter")
        .method(MethodDecl::new("greet").returns(ValueType::Str), |g, _| {
            Ok(Value::from(format!("hello, {}", g.name)))
        })
        .method(MethodDecl::new("name").returns(ValueType::Str), |g, _| {
            Ok(Value::from(g.name.as_str()))
        })
        .build()
});

impl Delegate for Greeter {
    fn class(&self) -> Arc<DelegateClass> {
        Arc::clone(&GREETER)
    }
}

/// Extends [`Greeter`], overriding `greet` and adding `shout`.
pub struct LoudGreeter {
    pub inner: Greeter,
}

impl LoudGreeter {
    pub fn new(name: &str) -> Self {
        Self {
            inner: Greeter::new(name),
        }
    }

    fn as_greeter(&self) -> &dyn Delegate {
        &self.inner
    }
}

static LOUD_GREETER: LazyLock<Arc<DelegateClass>> = LazyLock::new(|| {
    ClassBuilder::<LoudGreeter>::new("LoudGreeter")
        .extends(Arc::clone(&GREETER), LoudGreeter::as_greeter)
        .method(MethodDecl::new("greet").returns(ValueType::Str), |l, _| {
            Ok(Value::from(format!("HELLO, {}", l.inner.name.to_uppercase())))
        })
        .method(
            MethodDecl::new("shout")
                .param_with(ValueType::Str, ArgDirective::Name)
                .param(ValueType::Int)
                .returns(ValueType::Str),
            |_, args| {
                let times = usize::try_from(args[1].as_int().unwrap_or(0)).unwrap_or(0);
                Ok(Value::from(args[0].to_string().repeat(times)))
            },
        )
        .build()
});

impl Delegate for LoudGreeter {
    fn class(&self) -> Arc<DelegateClass> {
        Arc::clone(&LOUD_GREETER)
    }
}

/// Records every call it receives; exposes all dispatch roles at once.
///
/// - `ping(int)` and `ping(string)`: overloads
/// - `pong()`: reachable by name only
/// - `catchPing`: pattern `ping.*`
/// - `anything`: fallback
#[derive(Default)]
pub struct Recorder {
    pub calls: Mutex<Vec<String>>,
}

impl Recorder {
    pub fn record(&self, entry: impl Into<String>) {
        self.calls.lock().expect("recorder lock").push(entry.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("recorder lock").clone()
    }
}

static RECORDER: LazyLock<Arc<DelegateClass>> = LazyLock::new(|| {
    ClassBuilder::<Recorder>::new("Recorder")
        .method(
            MethodDecl::new("ping").param(ValueType::Int).returns(ValueType::Str),
            |r, args| {
                r.record(format!("ping(int {})", args[0]));
                Ok(Value::from("exact-int"))
            },
        )
        .method(
            MethodDecl::new("ping").param(ValueType::Str).returns(ValueType::Str),
            |r, args| {
                r.record(format!("ping(string {})", args[0]));
                Ok(Value::from("exact-string"))
            },
        )
        .method(MethodDecl::new("pong").returns(ValueType::Str), |r, _| {
            r.record("pong()");
            Ok(Value::from("name-only"))
        })
        .method(
            MethodDecl::new("catchPing")
                .param_with(ValueType::Str, ArgDirective::Name)
                .returns(ValueType::Str)
                .pattern("ping.*"),
            |r, args| {
                r.record(format!("catchPing({})", args[0]));
                Ok(Value::from("pattern"))
            },
        )
        .method(
            MethodDecl::new("anything")
                .param_with(ValueType::Str, ArgDirective::Name)
                .returns(ValueType::Str)
                .fallback(),
            |r, args| {
                r.record(format!("anything({})", args[0]));
                Ok(Value::from("fallback"))
            },
        )
        .build()
});

impl Delegate for Recorder {
    fn class(&self) -> Arc<DelegateClass> {
        Arc::clone(&RECORDER)
    }
}
