use chrono::Month;
use loan_risk::error::AppError;
use loan_risk::scoring::{ModelConfig, RiskEngine};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the engine from a JSON model file, or from the built-in table when no path is given.
pub(crate) fn load_engine(path: Option<&Path>) -> Result<Arc<RiskEngine>, AppError> {
    let config = match path {
        Some(path) => {
            info!(path = %path.display(), "loading model configuration");
            ModelConfig::from_path(path)?
        }
        None => ModelConfig::standard(),
    };

    Ok(Arc::new(RiskEngine::from_config(config)?))
}

/// Parses `name=value` where value is `true`, `false` or a number.
pub(crate) fn parse_feature_assignment(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing feature name in '{raw}'"));
    }

    let value = value.trim();
    let parsed = match value.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("'{value}' is not a number or boolean"))?,
    };

    Ok((name.to_string(), parsed))
}

pub(crate) fn parse_month(raw: &str) -> Result<Month, String> {
    raw.trim()
        .parse::<Month>()
        .map_err(|_| format!("failed to parse '{raw}' as a month name"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_numbers_and_flags() {
        assert_eq!(
            parse_feature_assignment("age=35").expect("parses"),
            ("age".to_string(), json!(35.0))
        );
        assert_eq!(
            parse_feature_assignment(" loan_no = TRUE ").expect("parses"),
            ("loan_no".to_string(), json!(true))
        );
    }

    #[test]
    fn rejects_malformed_assignments() {
        assert!(parse_feature_assignment("age").is_err());
        assert!(parse_feature_assignment("=3").is_err());
        assert!(parse_feature_assignment("age=thirty").is_err());
    }

    #[test]
    fn parses_month_names() {
        assert_eq!(parse_month("Mar").expect("parses"), Month::March);
        assert_eq!(parse_month("december").expect("parses"), Month::December);
        assert!(parse_month("smarch").is_err());
    }

    #[test]
    fn missing_model_file_is_an_error() {
        let path = std::env::temp_dir().join("loan-risk-api-missing-model.json");
        assert!(load_engine(Some(&path)).is_err());
        assert!(load_engine(None).is_ok());
    }
}
