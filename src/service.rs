use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::PredictorError;
use crate::grades::LetterGrade;
use crate::sgpa::SemesterResult;

/// Per-course marks for one semester, keyed `"<code> <title>"`.
#[derive(Debug, Clone, Serialize)]
pub struct MarksGroup {
    pub semester: u8,
    pub marks: BTreeMap<String, f64>,
}

/// Payload submitted to the remote prediction service. Constructed once per
/// submission by the validator and immutable afterwards. Optional groups are
/// present only when their validator produced a non-empty, valid set;
/// `semesters` holds only available results and is never empty for a
/// non-first-term submission.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    pub semesters: Vec<SemesterResult>,
    pub student_name: String,
    pub department: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_grades: Option<BTreeMap<u8, BTreeMap<String, LetterGrade>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<MarksGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midterm: Option<MarksGroup>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SemesterForecast {
    pub semester: u8,
    pub predicted_sgpa: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub name: String,
    pub coef: String,
}

/// A successful forecast from the prediction service. An empty
/// `predictions` list is a valid "no predictions" state, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelForecast {
    pub current_average: f64,
    pub trend: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_counts: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub predictions: Vec<SemesterForecast>,
    pub risk: String,
    pub insight: String,
    #[serde(default)]
    pub features: Vec<FeatureWeight>,
}

/// What the service actually answered. The wire shape is a record with an
/// optional `error` key; it is decoded into this tagged outcome at the
/// boundary so nothing downstream ever inspects optional keys ad hoc.
#[derive(Debug, Clone)]
pub enum ModelOutcome {
    Forecast(ModelForecast),
    Failure(String),
}

#[derive(Deserialize)]
struct WireResponse {
    error: Option<String>,
    current_average: Option<f64>,
    trend: Option<String>,
    grade_counts: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    predictions: Vec<SemesterForecast>,
    risk: Option<String>,
    insight: Option<String>,
    #[serde(default)]
    features: Vec<FeatureWeight>,
}

impl<'de> Deserialize<'de> for ModelOutcome {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = WireResponse::deserialize(deserializer)?;
        if let Some(message) = wire.error {
            return Ok(ModelOutcome::Failure(message));
        }
        // Without an error key the core fields are mandatory; only the
        // collections may legitimately be absent.
        let missing = <D::Error as de::Error>::missing_field;
        Ok(ModelOutcome::Forecast(ModelForecast {
            current_average: wire.current_average.ok_or_else(|| missing("current_average"))?,
            trend: wire.trend.ok_or_else(|| missing("trend"))?,
            grade_counts: wire.grade_counts,
            predictions: wire.predictions,
            risk: wire.risk.ok_or_else(|| missing("risk"))?,
            insight: wire.insight.ok_or_else(|| missing("insight"))?,
            features: wire.features,
        }))
    }
}

/// Offline quality of the remote model; informational only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
    pub test_samples: u32,
}

/// Rendered results shipped to the report service for document generation.
#[derive(Debug, Clone, Serialize)]
pub struct ReportPayload {
    pub student_name: String,
    pub department: String,
    pub current_average: f64,
    pub trend: String,
    pub semesters: Vec<SemesterResult>,
    pub predictions: Vec<SemesterForecast>,
    pub risk: String,
    pub insight: String,
    pub features: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// The remote prediction/report backend. Trait seam so tests can substitute
/// a canned service.
#[async_trait]
pub trait ModelService: Send + Sync {
    async fn predict(&self, request: &PredictionRequest) -> Result<ModelOutcome, PredictorError>;
    async fn metrics(&self) -> Result<ModelMetrics, PredictorError>;
    async fn report(&self, payload: &ReportPayload) -> Result<Vec<u8>, PredictorError>;
}

pub struct HttpModelService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpModelService {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpModelService {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ModelService for HttpModelService {
    async fn predict(&self, request: &PredictionRequest) -> Result<ModelOutcome, PredictorError> {
        let outcome = self
            .client
            .post(format!("{}/api/predict", self.base_url))
            .json(request)
            .send()
            .await?
            .json::<ModelOutcome>()
            .await?;
        Ok(outcome)
    }

    async fn metrics(&self) -> Result<ModelMetrics, PredictorError> {
        let metrics = self
            .client
            .get(format!("{}/api/metrics", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<ModelMetrics>()
            .await?;
        Ok(metrics)
    }

    async fn report(&self, payload: &ReportPayload) -> Result<Vec<u8>, PredictorError> {
        let bytes = self
            .client
            .post(format!("{}/api/download-report", self.base_url))
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
