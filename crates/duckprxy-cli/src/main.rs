// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! duckprxy command-line interface.
//!
//! This is the main entry point for the `duckprxy` command.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod demos;

use commands::demo::HostChoice;
use demos::DemoName;

/// duckprxy: duck-typed dynamic proxies
#[derive(Debug, Parser)]
#[command(name = "duckprxy")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (default: `duckprxy.toml` in the current directory)
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the bundled demo delegates and print each call's result
    Demo {
        /// Host to run (default: the configured host)
        #[arg(long, value_enum)]
        host: Option<HostChoice>,
    },

    /// Show which strategy resolves a call and how its arguments bind
    Explain {
        /// Demo delegate to resolve against
        #[arg(value_enum)]
        demo: DemoName,

        /// Call to explain, e.g. `foo` or `bar(2, 3)`
        call: String,
    },
}

fn main() -> Result<()> {
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Command::Demo { host } => commands::demo::run(host, config),
        Command::Explain { demo, call } => commands::explain::run(demo, &call, config),
    };

    // Exit with appropriate code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

fn directive_for_verbosity(v: u8) -> &'static str {
    // Library events are emitted under `duckprxy_core`, CLI events under
    // `duckprxy` (the binary's crate name).
    match v {
        0 => "duckprxy=warn,duckprxy_core=warn",
        1 => "duckprxy=debug,duckprxy_core=debug",
        _ => "duckprxy=trace,duckprxy_core=trace",
    }
}
