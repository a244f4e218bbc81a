use std::collections::BTreeMap;

use chrono::Month;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{month_feature, FeatureKind, FeatureSchema, MONTH_FEATURES};

/// Human-entered attributes keyed by feature name. Need not be complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput(BTreeMap<String, Value>);

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_number(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, Value::from(value));
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.insert(name, Value::Bool(value));
        self
    }

    /// Sets the one-hot flag for `month` and clears the other eleven.
    pub fn with_application_month(mut self, month: Month) -> Self {
        let selected = month_feature(month);
        for name in MONTH_FEATURES {
            self.insert(name, Value::Bool(name == selected));
        }
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for RawInput {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

/// Fully populated numeric inputs, paired with weights by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.0.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

/// Raw input rejected before it reaches the model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidFeatureError {
    #[error("unknown feature '{name}'")]
    UnknownFeature { name: String },
    #[error("feature '{name}' expects a {expected} value, got {value}")]
    UnsupportedValue {
        name: String,
        expected: &'static str,
        value: String,
    },
    #[error("feature '{name}' must be a finite number")]
    NonFinite { name: String },
}

/// Normalizes `raw` into a vector covering exactly the schema.
pub fn encode(
    schema: &FeatureSchema,
    raw: &RawInput,
) -> Result<FeatureVector, InvalidFeatureError> {
    if let Some((name, _)) = raw.iter().find(|(name, _)| !schema.contains(name)) {
        return Err(InvalidFeatureError::UnknownFeature {
            name: name.to_string(),
        });
    }

    let mut vector = FeatureVector::default();
    for spec in schema.iter() {
        let value = match raw.get(&spec.name) {
            Some(value) => coerce(&spec.name, spec.kind, value)?,
            None => spec.default,
        };
        vector.set(spec.name.clone(), value);
    }

    Ok(vector)
}

fn coerce(name: &str, kind: FeatureKind, value: &Value) -> Result<f64, InvalidFeatureError> {
    match value {
        Value::Bool(flag) if kind == FeatureKind::Indicator => Ok(if *flag { 1.0 } else { 0.0 }),
        Value::Number(number) => match number.as_f64() {
            Some(value) if value.is_finite() => Ok(value),
            _ => Err(InvalidFeatureError::NonFinite {
                name: name.to_string(),
            }),
        },
        other => Err(InvalidFeatureError::UnsupportedValue {
            name: name.to_string(),
            expected: match kind {
                FeatureKind::Numeric => "numeric",
                FeatureKind::Indicator => "numeric or boolean",
            },
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::schema::NEVER_CONTACTED_PDAYS;
    use serde_json::json;

    #[test]
    fn encode_fills_defaults_for_missing_features() {
        let schema = FeatureSchema::standard();
        let vector = encode(&schema, &RawInput::new()).expect("empty input encodes");

        assert_eq!(vector.len(), schema.len());
        assert_eq!(vector.get("pdays"), Some(NEVER_CONTACTED_PDAYS));
        assert_eq!(vector.get("age"), Some(0.0));
    }

    #[test]
    fn encode_coerces_flags_and_passes_numbers() {
        let schema = FeatureSchema::standard();
        let raw = RawInput::new()
            .with_number("age", 41.0)
            .with_flag("contact_cellular", true)
            .with_flag("loan_no", false)
            .with_number("housing_no", 1.0);

        let vector = encode(&schema, &raw).expect("valid input encodes");

        assert_eq!(vector.get("age"), Some(41.0));
        assert_eq!(vector.get("contact_cellular"), Some(1.0));
        assert_eq!(vector.get("loan_no"), Some(0.0));
        assert_eq!(vector.get("housing_no"), Some(1.0));
    }

    #[test]
    fn encode_rejects_unknown_feature() {
        let schema = FeatureSchema::standard();
        let raw = RawInput::new()
            .with_number("age", 30.0)
            .with_number("not_a_real_feature", 1.0);

        let err = encode(&schema, &raw).expect_err("unknown key rejected");
        assert_eq!(
            err,
            InvalidFeatureError::UnknownFeature {
                name: "not_a_real_feature".to_string()
            }
        );
    }

    #[test]
    fn encode_rejects_non_numeric_values() {
        let schema = FeatureSchema::standard();

        for value in [json!("35"), json!(null), json!([1]), json!({"v": 1})] {
            let raw: RawInput = [("age", value)].into_iter().collect();
            match encode(&schema, &raw) {
                Err(InvalidFeatureError::UnsupportedValue { name, .. }) => assert_eq!(name, "age"),
                other => panic!("expected unsupported value, got {other:?}"),
            }
        }
    }

    #[test]
    fn encode_rejects_boolean_for_numeric_feature() {
        let schema = FeatureSchema::standard();
        let raw = RawInput::new().with_flag("campaign", true);

        assert!(matches!(
            encode(&schema, &raw),
            Err(InvalidFeatureError::UnsupportedValue { expected: "numeric", .. })
        ));
    }

    #[test]
    fn encode_rejects_non_finite_numbers() {
        let schema = FeatureSchema::standard();
        let raw = RawInput::new().with_number("age", f64::NAN);

        // serde_json has no NaN; the builder stores it as null.
        assert!(matches!(
            encode(&schema, &raw),
            Err(InvalidFeatureError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn application_month_sets_exactly_one_flag() {
        let schema = FeatureSchema::standard();
        let raw = RawInput::new()
            .with_flag("month_jan", true)
            .with_application_month(Month::October);

        let vector = encode(&schema, &raw).expect("months encode");
        let active: Vec<&str> = MONTH_FEATURES
            .iter()
            .copied()
            .filter(|name| vector.get(name) == Some(1.0))
            .collect();
        assert_eq!(active, vec!["month_oct"]);
    }
}
