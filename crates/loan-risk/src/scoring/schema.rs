use std::collections::BTreeMap;

use chrono::Month;
use serde::{Deserialize, Serialize};

use super::config::ConfigurationError;

/// Days-since-last-contact value meaning the applicant was never contacted.
pub const NEVER_CONTACTED_PDAYS: f64 = 999.0;

/// One-hot application month features, January first.
pub const MONTH_FEATURES: [&str; 12] = [
    "month_jan",
    "month_feb",
    "month_mar",
    "month_apr",
    "month_may",
    "month_jun",
    "month_jul",
    "month_aug",
    "month_sep",
    "month_oct",
    "month_nov",
    "month_dec",
];

/// How raw values for a feature are interpreted by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    Numeric,
    Indicator,
}

impl FeatureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FeatureKind::Numeric => "numeric",
            FeatureKind::Indicator => "indicator",
        }
    }
}

/// A single named model input and the value substituted when it is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
    pub default: f64,
}

impl FeatureSpec {
    pub fn numeric(name: impl Into<String>, default: f64) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Numeric,
            default,
        }
    }

    pub fn indicator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Indicator,
            default: 0.0,
        }
    }
}

/// Closed, ordered set of features the model understands.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    features: Vec<FeatureSpec>,
    index: BTreeMap<String, usize>,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureSpec>) -> Result<Self, ConfigurationError> {
        let mut index = BTreeMap::new();
        for (position, spec) in features.iter().enumerate() {
            if index.insert(spec.name.clone(), position).is_some() {
                return Err(ConfigurationError::DuplicateFeature {
                    name: spec.name.clone(),
                });
            }
        }

        Ok(Self { features, index })
    }

    /// Bank-marketing applicant schema consumed by the built-in weight table.
    pub fn standard() -> Self {
        let mut features = vec![
            FeatureSpec::numeric("age", 0.0),
            FeatureSpec::numeric("campaign", 0.0),
            FeatureSpec::numeric("pdays", NEVER_CONTACTED_PDAYS),
            FeatureSpec::numeric("previous", 0.0),
            FeatureSpec::indicator("contact_cellular"),
        ];
        features.extend(MONTH_FEATURES.iter().map(|name| FeatureSpec::indicator(*name)));
        features.extend(
            [
                "job_admin.",
                "job_blue-collar",
                "job_management",
                "job_retired",
                "job_services",
                "job_student",
                "job_technician",
                "job_unemployed",
                "marital_married",
                "marital_single",
                "marital_divorced",
                "education_basic.9y",
                "education_high.school",
                "education_professional.course",
                "education_university.degree",
                "default_no",
                "housing_no",
                "loan_no",
            ]
            .iter()
            .map(|name| FeatureSpec::indicator(*name)),
        );

        let index = features
            .iter()
            .enumerate()
            .map(|(position, spec)| (spec.name.clone(), position))
            .collect();

        Self { features, index }
    }

    pub fn get(&self, name: &str) -> Option<&FeatureSpec> {
        self.index.get(name).map(|position| &self.features[*position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.features.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|spec| spec.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// One-hot feature carrying the given application month.
pub fn month_feature(month: Month) -> &'static str {
    MONTH_FEATURES[month.number_from_month() as usize - 1]
}
