//! Minimal embedding-API demo driver for `screme-core`.
//!
//! Reads a file (or stdin) as a sequence of s-expressions with the
//! crate-local reader in `reader.rs`, installs the optional arithmetic/pair
//! prelude, and evaluates each top-level form in turn, printing the last
//! result. Not a REPL and not a conforming Scheme front end — just enough
//! to exercise `Interpreter::eval_top` end to end.

mod reader;

use std::path::PathBuf;

use clap::Parser;
use screme_core::{Interpreter, ResourceLimits, show};
use tracing::info;

#[derive(Parser)]
#[command(name = "screme")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Evaluate a Scheme-core source file", long_about = None)]
struct Args {
    /// Source file to evaluate; reads stdin if omitted.
    file: Option<PathBuf>,

    /// Maximum heap allocations before a resource error is raised.
    #[arg(long)]
    max_allocations: Option<usize>,

    /// Maximum environment-frame recursion depth.
    #[arg(long)]
    max_recursion_depth: Option<usize>,

    /// Increase log verbosity (pass multiple times, or set RUST_LOG).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(&args) {
        eprintln!("screme: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "screme=warn",
        1 => "screme=info",
        _ => "screme=debug,screme_core=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let source = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => std::io::read_to_string(std::io::stdin())?,
    };

    let mut limits = ResourceLimits::new();
    if let Some(max) = args.max_allocations {
        limits = limits.max_allocations(max);
    }
    limits = limits.max_recursion_depth(args.max_recursion_depth.or(Some(10_000)));

    let mut interp = Interpreter::new(limits);
    screme_core::install_prelude(&mut interp);

    let mut interner = screme_core::Interner::new();
    let forms = reader::read_all(&source, &mut interner)?;
    info!(form_count = forms.len(), "parsed top-level forms");

    // The reader's own interner and the interpreter's are separate tables
    // (`Interner`s aren't shared across crates by construction); re-intern
    // each symbol into the interpreter before evaluating so `Env::get`
    // resolves against the same handles `define_primitive` used.
    let mut last = None;
    for form in forms {
        let rehomed = rehome(&form, &interner, &mut interp);
        last = Some(interp.eval_top(rehomed)?);
    }

    if let Some(value) = last {
        println!("{}", show(&value, interp.interner()));
    }
    Ok(())
}

/// Walks a freshly-read `Value`, re-interning every `Symbol` against the
/// interpreter's own `Interner` instead of the reader's.
fn rehome(value: &screme_core::Value, from: &screme_core::Interner, interp: &mut Interpreter) -> screme_core::Value {
    match value {
        screme_core::Value::Symbol(sym) => screme_core::Value::Symbol(interp.intern(from.resolve(*sym))),
        screme_core::Value::List(items) => screme_core::Value::list(items.borrow().iter().map(|v| rehome(v, from, interp)).collect()),
        screme_core::Value::Vector(items) => screme_core::Value::vector(items.borrow().iter().map(|v| rehome(v, from, interp)).collect()),
        other => other.clone(),
    }
}
