//! Command line front end: resolves a dot path inside a JSON document.
//!
//! ```text
//! $ echo '{"a":[{"x":1},{"x":2}]}' | typed-optional 'a.*.x'
//! [
//!   1,
//!   2
//! ]
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use typed_optional::datatype::Value;
use typed_optional::path::{Fallback, PathSpec, resolve_or};
use typed_optional::settings::Settings;
use typed_optional::{OptionalArr, Result};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to resolve, `*` fans out over arrays
    path: String,

    /// JSON document, read from stdin when omitted
    input: Option<PathBuf>,

    /// Settings file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON value printed when the path does not resolve
    #[arg(short, long, value_name = "JSON")]
    default: Option<String>,

    /// Print present or absent instead of the resolved value
    #[arg(long)]
    presence: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log.filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&args, &settings) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, settings: &Settings) -> Result<String> {
    let source = match &args.input {
        Some(file) => fs::read_to_string(file)?,
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            source
        }
    };
    let document: Value = serde_json::from_str(&source)?;
    let path = PathSpec::parse_with(&args.path, &settings.path);
    debug!(
        path = %path.render_with(&settings.path),
        segments = path.segments().len(),
        presence = args.presence,
        "resolving"
    );

    if args.presence {
        let found = OptionalArr::array_key(document, path)?;
        let verdict = if found.is_present() { "present" } else { "absent" };
        return Ok(verdict.to_string());
    }

    let fallback = match &args.default {
        Some(json) => Fallback::Literal(serde_json::from_str(json)?),
        None => Fallback::default(),
    };
    let value = resolve_or(&document, &path, &fallback);
    Ok(serde_json::to_string_pretty(&value)?)
}
