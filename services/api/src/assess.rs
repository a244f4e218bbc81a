use crate::infra::{load_engine, parse_feature_assignment, parse_month};
use chrono::{Datelike, Local, Month};
use clap::Args;
use loan_risk::config::AppConfig;
use loan_risk::error::AppError;
use loan_risk::scoring::{
    read_applications_from_path, BatchOutcome, FeatureKind, RawInput, Recommendation, RiskEngine,
    ScoreResult, WeightReport,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

const TOP_FACTOR_COUNT: usize = 5;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Feature assignment NAME=VALUE (repeatable); VALUE is a number, true or false
    #[arg(long = "feature", value_parser = parse_feature_assignment)]
    pub(crate) features: Vec<(String, Value)>,
    /// Application month (e.g. mar, march); sets the matching month_* indicator
    #[arg(long, value_parser = parse_month, conflicts_with = "current_month")]
    pub(crate) month: Option<Month>,
    /// Use today's month as the application month
    #[arg(long)]
    pub(crate) current_month: bool,
    /// JSON model file (defaults to APP_MODEL_PATH, then the built-in table)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Print the result as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file whose header names features; an optional application_id column labels rows
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// JSON model file (defaults to APP_MODEL_PATH, then the built-in table)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Print results as JSON lines instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct WeightsArgs {
    /// JSON model file (defaults to APP_MODEL_PATH, then the built-in table)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// List every feature instead of the top risk factors only
    #[arg(long)]
    pub(crate) all: bool,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        features,
        month,
        current_month,
        model,
        json,
    } = args;

    let engine = engine_for(model)?;
    let month = month.or_else(|| current_month.then(today_month).flatten());
    let input = build_input(features, month);
    let result = engine.assess(&input)?;

    if json {
        println!("{}", to_json(&result)?);
        return Ok(());
    }

    render_assessment(&engine, &result, month);
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs { csv, model, json } = args;

    let engine = engine_for(model)?;
    let applications = read_applications_from_path(&csv)?;
    let outcomes = engine.assess_batch(&applications);

    if json {
        for outcome in &outcomes {
            println!("{}", to_json(&outcome.view())?);
        }
        return Ok(());
    }

    render_batch(&csv, &outcomes);
    Ok(())
}

pub(crate) fn run_weights(args: WeightsArgs) -> Result<(), AppError> {
    let engine = engine_for(args.model)?;
    render_weights(&engine.weight_report(), args.all);
    Ok(())
}

fn engine_for(model: Option<PathBuf>) -> Result<Arc<RiskEngine>, AppError> {
    let path = match model {
        Some(path) => Some(path),
        None => AppConfig::load()?.model.path,
    };
    load_engine(path.as_deref())
}

fn today_month() -> Option<Month> {
    u8::try_from(Local::now().month())
        .ok()
        .and_then(|number| Month::try_from(number).ok())
}

fn build_input(features: Vec<(String, Value)>, month: Option<Month>) -> RawInput {
    let input: RawInput = features.into_iter().collect();
    match month {
        Some(month) => input.with_application_month(month),
        None => input,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|err| AppError::Io(err.into()))
}

fn percent(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

fn render_assessment(engine: &RiskEngine, result: &ScoreResult, month: Option<Month>) {
    let metadata = engine.metadata();
    println!("Loan default risk assessment");
    println!("  Model: {}", metadata.name);
    if let Some(month) = month {
        println!("  Application month: {}", month.name());
    }
    println!("  Default probability: {}", percent(result.probability));
    println!("  Risk level: {}", result.risk_level.label());
    println!(
        "  Recommendation: {} (reject at {} or above)",
        result.recommendation.label(),
        percent(engine.classifier().decision_threshold())
    );

    let report = engine.weight_report();
    println!("  Top risk factors in this model:");
    for factor in report.top_factors(TOP_FACTOR_COUNT) {
        println!("    - {}: {:+.3}", factor.feature, factor.weight);
    }
}

fn render_batch(csv: &std::path::Path, outcomes: &[BatchOutcome]) {
    println!("Batch assessment for {}", csv.display());

    let mut approved = 0;
    let mut rejected = 0;
    let mut failed = 0;
    for outcome in outcomes {
        match &outcome.outcome {
            Ok(result) => {
                match result.recommendation {
                    Recommendation::Approve => approved += 1,
                    Recommendation::Reject => rejected += 1,
                }
                println!(
                    "- {}: {} {} -> {}",
                    outcome.application_id,
                    percent(result.probability),
                    result.risk_level.label(),
                    result.recommendation.label()
                );
            }
            Err(err) => {
                failed += 1;
                println!("- {}: not scored ({})", outcome.application_id, err);
            }
        }
    }

    println!(
        "\n{} applications: {} approved, {} rejected, {} failed",
        outcomes.len(),
        approved,
        rejected,
        failed
    );
}

fn render_weights(report: &WeightReport, all: bool) {
    let metadata = &report.metadata;
    println!("Model: {}", metadata.name);
    if let Some(accuracy) = metadata.accuracy {
        println!("  Reported accuracy: {}", percent(accuracy));
    }
    if let Some(records) = metadata.training_records {
        println!("  Training records: {}", records);
    }
    if let Some(rate) = metadata.base_default_rate {
        println!("  Base default rate: {}", percent(rate));
    }
    println!("  Intercept: {:+.4}", report.intercept);
    println!(
        "  Tiers: medium >= {}, high >= {}, very high >= {}",
        percent(report.tiers.medium),
        percent(report.tiers.high),
        percent(report.tiers.very_high)
    );
    println!(
        "  Decision: reject at {} or above",
        percent(report.decision_threshold)
    );

    if all {
        println!("\nWeights ({} features):", report.weights.len());
        for weight in &report.weights {
            let kind = match weight.kind {
                FeatureKind::Numeric => format!("numeric, default {}", weight.default),
                FeatureKind::Indicator => weight.kind.label().to_string(),
            };
            println!("- {}: {:+.3} ({})", weight.feature, weight.weight, kind);
        }
    } else {
        println!("\nTop {} risk factors:", TOP_FACTOR_COUNT);
        for factor in report.top_factors(TOP_FACTOR_COUNT) {
            let direction = if factor.weight > 0.0 {
                "raises risk"
            } else {
                "lowers risk"
            };
            println!("- {}: {:+.3} ({})", factor.feature, factor.weight, direction);
        }
    }
}
