#![forbid(unsafe_code)]

//! Scripted modalkit demo.
//!
//! Builds the demo page, opens each dialog from its trigger, closes it with
//! a different gesture, and prints a JSON report.
//!
//! Logs go to stderr and honour `RUST_LOG`.

mod page;
mod script;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Parser;
use modalkit::DialogPolicy;
use tracing_subscriber::EnvFilter;
use web_time::Instant;

use crate::page::DemoPage;
use crate::script::{Clock, Gesture};

#[derive(Debug, Parser)]
#[command(name = "modalkit-demo", version)]
#[command(about = "Open and close every demo dialog and print a JSON report")]
struct Args {
    /// Print each dialog's markup and the final page.
    #[arg(long)]
    markup: bool,
    /// Jump the virtual clock instead of waiting out exit transitions.
    #[arg(long)]
    fast: bool,
    /// Dialog policy file; `.json` is read as JSON, anything else as TOML.
    #[arg(long, value_name = "FILE")]
    policy: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    #[cfg(feature = "tracing-json")]
    builder.json().init();
    #[cfg(not(feature = "tracing-json"))]
    builder.init();
}

fn load_policy(path: &Path) -> Result<DialogPolicy, Box<dyn Error>> {
    let input = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let policy = if is_json {
        DialogPolicy::from_json_str(&input)?
    } else {
        DialogPolicy::from_toml_str(&input)?
    };
    Ok(policy)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();
    let policy = match &args.policy {
        Some(path) => load_policy(path)?,
        None => DialogPolicy::default(),
    };
    tracing::info!(?policy, "starting demo");

    let page = DemoPage::build(policy);
    let clock = if args.fast { Clock::Virtual } else { Clock::Wall };
    page.host.sync_clock(Instant::now());

    let reports: Vec<_> = page
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| script::run(&page, entry, Gesture::for_index(index), clock, args.markup))
        .collect();

    if args.markup {
        println!("{}", page.markup());
    }
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
