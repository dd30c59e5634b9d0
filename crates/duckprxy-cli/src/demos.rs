// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Bundled demo delegates.
//!
//! Every demo is proxied through the same [`interface`], so one call script
//! shows how each dispatch role answers it.

use std::sync::{Arc, LazyLock};

use clap::ValueEnum;
use duckprxy_core::prelude::*;

/// Demo delegates selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoName {
    /// Plain methods, matched by exact signature or by name.
    Plain,
    /// Name patterns with `@name`, `@args` and `@argN` directives.
    Patterned,
    /// A fallback method catching unmatched calls.
    Fallback,
    /// A sub-delegate accessor forwarding to the fallback demo.
    Subdelegate,
}

impl DemoName {
    pub const ALL: [DemoName; 4] = [
        DemoName::Plain,
        DemoName::Patterned,
        DemoName::Fallback,
        DemoName::Subdelegate,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DemoName::Plain => "plain",
            DemoName::Patterned => "patterned",
            DemoName::Fallback => "fallback",
            DemoName::Subdelegate => "subdelegate",
        }
    }

    /// A fresh delegate instance for this demo.
    pub fn delegate(self) -> Arc<dyn Delegate> {
        match self {
            DemoName::Plain => Arc::new(PlainDemo),
            DemoName::Patterned => Arc::new(PatternedDemo),
            DemoName::Fallback => Arc::new(FallbackDemo),
            DemoName::Subdelegate => Arc::new(SubDelegateDemo {
                inner: Arc::new(FallbackDemo),
            }),
        }
    }
}

/// The interface every demo proxy implements.
pub fn interface() -> Arc<Interface> {
    Interface::new("Demo")
        .method(MethodSig::new("foo").returns(ValueType::Str))
        .method(MethodSig::new("baz").returns(ValueType::Int))
        .method(
            MethodSig::new("bar")
                .param(ValueType::Int)
                .param(ValueType::Int)
                .returns(ValueType::Str),
        )
        .method(MethodSig::new("myfoo").returns(ValueType::Str))
        .method(MethodSig::new("mybar").param(ValueType::Str))
        .method(
            MethodSig::new("bazTwo")
                .param(ValueType::Str)
                .param(ValueType::Str)
                .returns(ValueType::Str),
        )
        .build()
}

/// The calls `duckprxy demo` makes on every demo proxy.
pub fn script() -> Vec<(&'static str, Vec<Value>)> {
    vec![
        ("foo", vec![]),
        ("baz", vec![]),
        ("bar", vec![Value::from(2), Value::from(3)]),
        ("myfoo", vec![]),
        ("mybar", vec![Value::from("abc")]),
        ("bazTwo", vec![Value::from("DEF"), Value::from("ABC")]),
    ]
}

/// Render a call as `name(a, b)`.
pub fn format_call(name: &str, args: &[Value]) -> String {
    let args: Vec<String> = args.iter().map(ToString::to_string).collect();
    format!("{name}({})", args.join(", "))
}

struct PlainDemo;

static PLAIN: LazyLock<Arc<DelegateClass>> = LazyLock::new(|| {
    ClassBuilder::<PlainDemo>::new("PlainDemo")
        .method(MethodDecl::new("foo").returns(ValueType::Str), |_, _| {
            Ok(Value::from("foo"))
        })
        .method(MethodDecl::new("baz").returns(ValueType::Int), |_, _| {
            Ok(Value::Int(42))
        })
        .method(
            MethodDecl::new("bazTwo")
                .param(ValueType::Str)
                .param(ValueType::Str)
                .returns(ValueType::Str),
            |_, args| Ok(Value::from(format!("{}+{}", args[0], args[1]))),
        )
        .build()
});

impl Delegate for PlainDemo {
    fn class(&self) -> Arc<DelegateClass> {
        Arc::clone(&PLAIN)
    }
}

struct PatternedDemo;

static PATTERNED: LazyLock<Arc<DelegateClass>> = LazyLock::new(|| {
    ClassBuilder::<PatternedDemo>::new("PatternedDemo")
        .method(
            MethodDecl::new("fooMethod")
                .param_with(ValueType::Str, ArgDirective::Name)
                .returns(ValueType::Str)
                .pattern("foo.*"),
            |_, args| Ok(Value::from(format!("fooMethod({})", args[0]))),
        )
        .method(
            MethodDecl::new("barMethod")
                .param_with(ValueType::Str, ArgDirective::Name)
                .param_with(ValueType::List, ArgDirective::Args)
                .returns(ValueType::Str)
                .pattern(".*bar.*"),
            |_, args| {
                let mut out = format!("-{}/", args[0]);
                for arg in args[1].as_list().unwrap_or_default() {
                    out.push_str(&arg.to_string());
                    out.push('/');
                }
                Ok(Value::from(out))
            },
        )
        .method(
            MethodDecl::new("bazTwo")
                .param_with(ValueType::Str, ArgDirective::ArgN(1))
                .param_with(ValueType::Str, ArgDirective::ArgN(0))
                .returns(ValueType::Str),
            |_, args| Ok(Value::from(format!("baz({},{})", args[0], args[1]))),
        )
        .build()
});

impl Delegate for PatternedDemo {
    fn class(&self) -> Arc<DelegateClass> {
        Arc::clone(&PATTERNED)
    }
}

struct FallbackDemo;

static FALLBACK: LazyLock<Arc<DelegateClass>> = LazyLock::new(|| {
    ClassBuilder::<FallbackDemo>::new("FallbackDemo")
        .method(MethodDecl::new("bar").returns(ValueType::Str), |_, _| {
            Ok(Value::from("bar()"))
        })
        .method(
            MethodDecl::new("otherwise")
                .param_with(ValueType::Str, ArgDirective::Name)
                .param_with(ValueType::List, ArgDirective::Args)
                .returns(ValueType::Str)
                .fallback(),
            |_, args| Ok(Value::from(format!("otherwise({} {})", args[0], args[1]))),
        )
        .build()
});

impl Delegate for FallbackDemo {
    fn class(&self) -> Arc<DelegateClass> {
        Arc::clone(&FALLBACK)
    }
}

struct SubDelegateDemo {
    inner: Arc<FallbackDemo>,
}

static SUB_DELEGATE: LazyLock<Arc<DelegateClass>> = LazyLock::new(|| {
    ClassBuilder::<SubDelegateDemo>::new("SubDelegateDemo")
        .method(MethodDecl::new("baz").returns(ValueType::Int), |_, _| {
            Ok(Value::Int(2))
        })
        .method(
            MethodDecl::new("getInner")
                .returns(ValueType::Object)
                .subdelegate(),
            |d, _| {
                let inner: Arc<dyn Delegate> = d.inner.clone();
                Ok(Value::Object(inner))
            },
        )
        .build()
});

impl Delegate for SubDelegateDemo {
    fn class(&self) -> Arc<DelegateClass> {
        Arc::clone(&SUB_DELEGATE)
    }
}
