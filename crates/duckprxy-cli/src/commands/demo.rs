// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Run the bundled demo delegates through one or both proxy hosts.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use camino::Utf8Path;
use clap::ValueEnum;
use duckprxy_core::{HostKind, ProxyFactory};
use miette::{Diagnostic, Result};
use thiserror::Error;
use tracing::debug;

use super::load_config;
use crate::demos::{self, DemoName, format_call};

/// Host selection for `duckprxy demo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HostChoice {
    Dynamic,
    Precompiled,
    /// Run both hosts and compare their transcripts.
    Both,
}

/// The two hosts produced different results for the same calls.
#[derive(Debug, Error, Diagnostic)]
#[error("hosts disagree on demo '{demo}'")]
#[diagnostic(
    code(duckprxy::cli::hosts_disagree),
    help("dynamic:\n{dynamic}\nprecompiled:\n{precompiled}")
)]
pub struct HostsDisagree {
    demo: &'static str,
    dynamic: String,
    precompiled: String,
}

fn host_name(host: HostKind) -> &'static str {
    match host {
        HostKind::Dynamic => "dynamic",
        HostKind::Precompiled => "precompiled",
    }
}

/// Run every demo; `host` overrides the configured host.
pub fn run(host: Option<HostChoice>, config: Option<&Utf8Path>) -> Result<()> {
    let config = load_config(config)?;
    let hosts = match host {
        None => vec![config.host],
        Some(HostChoice::Dynamic) => vec![HostKind::Dynamic],
        Some(HostChoice::Precompiled) => vec![HostKind::Precompiled],
        Some(HostChoice::Both) => vec![HostKind::Dynamic, HostKind::Precompiled],
    };
    debug!(?config, ?hosts, "running demos");
    let factory = ProxyFactory::new(config);

    for demo in DemoName::ALL {
        let transcripts = hosts
            .iter()
            .map(|&host| transcript(&factory, demo, host))
            .collect::<Result<Vec<_>>>()?;

        let names: Vec<&str> = hosts.iter().map(|&h| host_name(h)).collect();
        println!("== {} [{}]", demo.as_str(), names.join(", "));
        for line in &transcripts[0] {
            println!("  {line}");
        }
        if let [dynamic, precompiled] = transcripts.as_slice() {
            if dynamic != precompiled {
                return Err(HostsDisagree {
                    demo: demo.as_str(),
                    dynamic: dynamic.join("\n"),
                    precompiled: precompiled.join("\n"),
                }
                .into());
            }
            println!("  hosts agree");
        }
    }
    Ok(())
}

/// Run the demo script on one host, one line per call.
///
/// Dispatch failures are part of the transcript; only proxy construction
/// errors abort.
pub fn transcript(factory: &ProxyFactory, demo: DemoName, host: HostKind) -> Result<Vec<String>> {
    let proxy = factory.make_proxy_with(host, demos::interface(), demo.delegate(), &[])?;
    Ok(demos::script()
        .into_iter()
        .map(|(name, args)| {
            let call = format_call(name, &args);
            match proxy.call(name, &args) {
                Ok(value) => format!("{call} -> {value}"),
                Err(err) => format!("{call} !! {err}"),
            }
        })
        .collect())
}
