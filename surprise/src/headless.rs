//! Headless mode for the birthday surprise.
//!
//! Plays the whole flow from command-line choices without a TUI and prints
//! the story, or the full report as JSON.

use std::sync::Arc;

use anyhow::{bail, Context};
use surprise_core::{
    run_headless as run_surprise, Catalog, FsAssets, HeadlessChoices, HeadlessReport, Plan,
    SurpriseConfig, VideoOutcome,
};

/// Timer multiplier for `--fast`.
const FAST_TIME_SCALE: f64 = 0.01;

/// Options only used in headless mode
#[derive(Debug, Clone)]
pub struct HeadlessArgs {
    pub choices: HeadlessChoices,
    pub json: bool,
    pub fast: bool,
}

/// Value following `flag`, if present.
pub fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Accepts a plan label or its 1-based position among the buttons.
fn parse_plan(value: &str) -> anyhow::Result<Plan> {
    if let Ok(n) = value.parse::<usize>() {
        return n
            .checked_sub(1)
            .and_then(|i| Plan::all().get(i).copied())
            .with_context(|| format!("plan number must be 1-{}", Plan::all().len()));
    }
    Ok(value.parse::<Plan>()?)
}

/// Parse headless choices from command line arguments.
///
/// Missing choices fall back to the first entries of the catalog.
pub fn parse_args(args: &[String], catalog: &Catalog) -> anyhow::Result<HeadlessArgs> {
    let items = match arg_value(args, "--items") {
        Some(value) => split_list(value),
        None => catalog.items().take(3).map(|(_, name)| name.to_string()).collect(),
    };

    let person = match arg_value(args, "--person") {
        Some(value) => value.to_string(),
        None => catalog
            .people()
            .next()
            .map(|(_, name)| name.to_string())
            .context("catalog has no people")?,
    };

    let escapees = match arg_value(args, "--escape").map(split_list) {
        Some(names) => match <[String; 2]>::try_from(names) {
            Ok(pair) => Some(pair),
            Err(names) => bail!("--escape takes exactly 2 names, got {}", names.len()),
        },
        None => None,
    };

    let plan = match arg_value(args, "--plan") {
        Some(value) => parse_plan(value)?,
        None => Plan::HangOut,
    };

    Ok(HeadlessArgs {
        choices: HeadlessChoices {
            items,
            person,
            escapees,
            plan,
        },
        json: args.iter().any(|a| a == "--json"),
        fast: args.iter().any(|a| a == "--fast"),
    })
}

/// Run the surprise in headless mode and print the result.
pub async fn run_headless(config: SurpriseConfig, args: &[String]) -> anyhow::Result<()> {
    let options = parse_args(args, &config.catalog)?;
    let config = if options.fast {
        config.with_time_scale(FAST_TIME_SCALE)
    } else {
        config
    };

    let source = Arc::new(FsAssets::new(config.asset_dir.clone()));
    let report = run_surprise(config, source, &options.choices).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &HeadlessReport) {
    println!("=== Surprise Headless Mode ===");
    println!("Session: {}", report.session_id);
    let scenes: Vec<String> = report.scenes.iter().map(|s| s.to_string()).collect();
    println!("Scenes: {}", scenes.join(" -> "));
    println!("Photos dropped: {}", report.photos_dropped);
    if let Some(failure) = &report.preload_failure {
        println!("[WARN] Preload failed: {failure}");
    }
    println!();
    println!("{}", report.story);
    println!();
    match &report.video {
        VideoOutcome::Played { size } => println!("[VIDEO] ready ({size} bytes)"),
        VideoOutcome::Failed { note } => println!("[VIDEO] {note}"),
    }
}
