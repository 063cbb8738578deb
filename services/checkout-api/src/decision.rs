use crate::infra::{load_catalog, read_context};
use checkout_decision::checkout::{decide, explain, Attribution, CompositeResult, ScoreResult};
use checkout_decision::config::{load_weights, AppConfig};
use checkout_decision::error::AppError;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DecideArgs {
    /// Transaction context JSON file.
    #[arg(long)]
    pub(crate) context: PathBuf,
    /// Card catalog CSV. Defaults to CHECKOUT_CATALOG_PATH.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Weight configuration JSON. Defaults to CHECKOUT_WEIGHTS_PATH, then built-in weights.
    #[arg(long)]
    pub(crate) weights: Option<PathBuf>,
    /// Print the full ranking with audits as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExplainArgs {
    /// Transaction context JSON file.
    #[arg(long)]
    pub(crate) context: PathBuf,
    /// Weight configuration JSON. Defaults to CHECKOUT_WEIGHTS_PATH, then built-in weights.
    #[arg(long)]
    pub(crate) weights: Option<PathBuf>,
    /// Print the full explanation as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_decide(args: DecideArgs) -> Result<(), AppError> {
    let sources = AppConfig::load()?.sources;
    let weights = load_weights(args.weights.or(sources.weights_path).as_deref())?;
    let catalog = load_catalog(args.catalog.or(sources.catalog_path).as_deref())?;
    let context = read_context(&args.context)?;

    let ranked = decide(&context, catalog.cards(), &weights)?;

    if args.json {
        println!("{}", to_json(&ranked)?);
        return Ok(());
    }

    println!("Checkout decision (weights {})", weights.identity);
    if ranked.is_empty() {
        println!("  No candidate cards to rank.");
    }
    for (position, result) in ranked.iter().enumerate() {
        print_candidate(position + 1, result);
    }
    Ok(())
}

pub(crate) fn run_explain(args: ExplainArgs) -> Result<(), AppError> {
    let sources = AppConfig::load()?.sources;
    let weights = load_weights(args.weights.or(sources.weights_path).as_deref())?;
    let context = read_context(&args.context)?;

    let result = explain(&context, &weights)?;

    if args.json {
        println!("{}", to_json(&result)?);
        return Ok(());
    }

    print_explanation(&result, weights.explain.top_drivers);
    Ok(())
}

fn print_candidate(position: usize, result: &CompositeResult) {
    println!(
        "  {}. {} ({}) utility {:.5}",
        position, result.candidate_name, result.candidate_id, result.utility
    );
    println!(
        "     p_approval {:.3} | rewards {:.4} | preference {:.3} | penalty {:.3}",
        result.p_approval, result.expected_rewards, result.preference_weight, result.merchant_penalty
    );
    if let Some(rule) = &result.audit.penalty.rule {
        println!(
            "     merchant rule '{}' {}",
            rule.label,
            if rule.applied { "applied" } else { "not applicable" }
        );
    }
    if !result.top_drivers.is_empty() {
        println!("     drivers: {}", drivers_line(&result.top_drivers));
    }
}

fn print_explanation(result: &ScoreResult, limit: usize) {
    println!("Approval explanation (weights {})", result.config);
    println!(
        "  raw score {:.3} -> p_approval {:.3} ({})",
        result.raw_score,
        result.p_approval,
        result.calibration_method.label()
    );
    println!("  Attributions:");
    for attribution in &result.attributions {
        println!(
            "    - {:<20} {:+.3}  [{}]",
            attribution.feature.label(),
            attribution.contribution,
            attribution.source
        );
    }
    let drivers = result.top_drivers(limit);
    if !drivers.is_empty() {
        println!("  Top drivers: {}", drivers_line(&drivers));
    }
}

fn drivers_line(drivers: &[Attribution]) -> String {
    drivers
        .iter()
        .map(|driver| format!("{} {:+.2}", driver.feature.label(), driver.contribution))
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}
