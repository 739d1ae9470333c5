//! The request/response boundary of the engine.
//!
//! [`RiskService`] owns the injected [`ModelHandle`] and exposes one method
//! per operation; transports (CLI, HTTP, ...) only translate in and out.

pub mod advisory;
pub mod assessment;
pub mod ids;
pub mod portfolio;

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use serde::Serialize;

use crate::error::RiskError;
use crate::features::{validate_features, FeatureRecord};
use crate::model::{ModelHandle, ModelMetadata, ModelPaths, ModelSource};
use crate::scoring::{self, Prediction};

pub use advisory::AdvisoryPlan;
pub use assessment::ComprehensiveAssessment;
pub use ids::{customer_id, AssessmentSequence};
pub use portfolio::{summarize, PortfolioSummary, RiskDistribution};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    pub prediction: Prediction,
    pub probability: f64,
    /// Probability expressed on a 0-100 scale
    pub risk_score: f64,
    pub model_version: String,
    pub model_name: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: ServiceStatus,
    pub model_ready: bool,
    pub degraded: bool,
    pub model_source: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoefficientSummary {
    pub count: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub metadata: ModelMetadata,
    pub coefficients: CoefficientSummary,
    pub source: ModelSource,
}

/// Scoring operations over a single, read-only model.
#[derive(Debug, Default)]
pub struct RiskService {
    model: ModelHandle,
    assessments: AssessmentSequence,
}

impl RiskService {
    /// Wrap a handle that may or may not be initialized yet.
    pub fn new(model: ModelHandle) -> Self {
        Self {
            model,
            assessments: AssessmentSequence::new(),
        }
    }

    /// Load the model from `paths` (falling back if needed) and serve it.
    pub fn start(paths: &ModelPaths) -> Self {
        let model = ModelHandle::new();
        model.initialize(paths);
        Self::new(model)
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// Coefficient-model prediction.
    pub fn predict(&self, features: &FeatureRecord) -> Result<PredictionResponse, RiskError> {
        validate_features(features).map_err(RiskError::Validation)?;
        let model = self.model.get()?;

        let probability = scoring::score(features, &model.table)?;
        let prediction = scoring::classify(probability);
        debug!("Linear prediction {} (p = {:.4})", prediction, probability);

        Ok(PredictionResponse {
            prediction,
            probability,
            risk_score: probability * 100.0,
            model_version: model.metadata.model_version.clone(),
            model_name: model.metadata.model_name.clone(),
            timestamp: Utc::now(),
        })
    }

    /// Predict every record, failing on the first invalid one.
    pub fn predict_batch(
        &self,
        records: &[FeatureRecord],
    ) -> Result<Vec<PredictionResponse>, RiskError> {
        records.iter().map(|record| self.predict(record)).collect()
    }

    /// Heuristic assessment with IDs, regulatory flags and a confidence band.
    /// Needs no loaded model.
    pub fn assess_comprehensive(
        &self,
        features: &FeatureRecord,
    ) -> Result<ComprehensiveAssessment, RiskError> {
        validate_features(features).map_err(RiskError::Validation)?;

        let result = scoring::assess(features);
        let assessment_id = self.assessments.next_id();
        debug!(
            "Assessment {}: {} risk (p = {:.4}), segment {}",
            assessment_id, result.risk_level, result.risk_probability, result.customer_segment
        );

        Ok(ComprehensiveAssessment {
            assessment_id,
            customer_id: customer_id(features),
            regulatory_flags: assessment::regulatory_flags(features),
            confidence_interval: assessment::confidence_interval(result.risk_probability),
            result,
        })
    }

    /// Remediation advisory, dated relative to `as_of`.
    pub fn advise(&self, features: &FeatureRecord, as_of: NaiveDate) -> Result<AdvisoryPlan, RiskError> {
        validate_features(features).map_err(RiskError::Validation)?;
        let result = scoring::assess(features);
        Ok(advisory::build_advisory(customer_id(features), &result, as_of))
    }

    /// Heuristic assessments of every record, summarized.
    pub fn portfolio(&self, records: &[FeatureRecord]) -> Result<PortfolioSummary, RiskError> {
        let results = records
            .iter()
            .map(|record| {
                validate_features(record).map_err(RiskError::Validation)?;
                Ok(scoring::assess(record))
            })
            .collect::<Result<Vec<_>, RiskError>>()?;
        Ok(summarize(&results))
    }

    pub fn health(&self) -> HealthReport {
        let (status, model_ready, degraded, model_source) = match self.model.get() {
            Ok(model) => {
                let degraded = model.is_degraded();
                let status = if degraded {
                    ServiceStatus::Degraded
                } else {
                    ServiceStatus::Healthy
                };
                (status, true, degraded, model.metadata.model_name.clone())
            }
            Err(_) => (ServiceStatus::Unavailable, false, false, "Unknown".to_string()),
        };

        HealthReport {
            status,
            model_ready,
            degraded,
            model_source,
            timestamp: Utc::now(),
        }
    }

    pub fn model_info(&self) -> Result<ModelInfo, RiskError> {
        let model = self.model.get()?;
        Ok(ModelInfo {
            metadata: model.metadata.clone(),
            coefficients: CoefficientSummary {
                count: model.table.len(),
                names: model.table.names().map(String::from).collect(),
            },
            source: model.source.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CoefficientTable, LoadedModel};
    use approx::assert_relative_eq;

    fn standard() -> FeatureRecord {
        FeatureRecord::new(75000.0, 35.0, 200000.0, 750.0, 0.25, 8.0, 30.0)
    }

    fn demo_service() -> RiskService {
        let table: CoefficientTable = [
            ("Intercept", -1.2),
            ("Income", -0.00001),
            ("Age", -0.01),
            ("LoanAmount", 0.000002),
            ("CreditScore", -0.003),
            ("DebtToIncome", 4.5),
            ("EmploymentYears", -0.05),
            ("LoanTerm", 0.01),
        ]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();

        RiskService::new(ModelHandle::with_model(LoadedModel {
            table,
            metadata: ModelMetadata::new("credit_risk_lr", "1.0.0"),
            source: ModelSource::Artifact {
                coefficients: "model_coefficients.txt".into(),
            },
        }))
    }

    #[test]
    fn test_predict_standard_applicant() {
        let response = demo_service().predict(&standard()).unwrap();
        assert_eq!(response.prediction, Prediction::LowRisk);
        assert!(response.probability < 0.3);
        assert_relative_eq!(response.risk_score, response.probability * 100.0);
        assert_eq!(response.model_version, "1.0.0");
        assert_eq!(response.model_name, "credit_risk_lr");
    }

    #[test]
    fn test_predict_with_fallback_model() {
        let service = RiskService::new(ModelHandle::with_model(LoadedModel::fallback("missing")));
        let response = service.predict(&standard()).unwrap();
        assert_eq!(response.probability, 0.5);
        assert_eq!(response.prediction, Prediction::LowRisk);
        assert_eq!(response.model_version, "N/A");
    }

    #[test]
    fn test_predict_before_initialization_is_not_ready() {
        let service = RiskService::new(ModelHandle::new());
        assert!(matches!(service.predict(&standard()), Err(RiskError::NotReady)));
        assert!(matches!(service.model_info(), Err(RiskError::NotReady)));
    }

    #[test]
    fn test_predict_rejects_non_finite_input() {
        let mut applicant = standard();
        applicant.loan_amount = f64::INFINITY;
        assert!(matches!(
            demo_service().predict(&applicant),
            Err(RiskError::Validation(_))
        ));
    }

    #[test]
    fn test_predict_batch() {
        let weak = FeatureRecord::new(25000.0, 22.0, 300000.0, 500.0, 0.8, 1.0, 15.0);
        let responses = demo_service().predict_batch(&[standard(), weak]).unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].prediction, Prediction::LowRisk);
        assert_eq!(responses[1].prediction, Prediction::HighRisk);
    }

    #[test]
    fn test_assess_comprehensive_works_without_model() {
        let service = RiskService::new(ModelHandle::new());
        let mut applicant = FeatureRecord::new(35000.0, 20.0, 250000.0, 580.0, 0.65, 2.0, 30.0);
        applicant.late_payments = Some(4.0);

        let first = service.assess_comprehensive(&applicant).unwrap();
        assert_eq!(first.assessment_id, "ASM_00001");
        assert!(first.customer_id.starts_with("CUST_"));
        assert_eq!(first.result.risk_level, scoring::RiskLevel::High);
        assert_eq!(first.regulatory_flags.len(), 2);
        assert_relative_eq!(first.confidence_interval[0], 0.75, epsilon = 1e-12);
        assert_relative_eq!(first.confidence_interval[1], 0.95, epsilon = 1e-12);

        let second = service.assess_comprehensive(&applicant).unwrap();
        assert_eq!(second.assessment_id, "ASM_00002");
        assert_eq!(second.customer_id, first.customer_id);
    }

    #[test]
    fn test_assessment_json_is_flat() {
        let service = demo_service();
        let json = serde_json::to_value(service.assess_comprehensive(&standard()).unwrap()).unwrap();
        assert!(json.get("risk_probability").is_some());
        assert!(json.get("result").is_none());
        assert_eq!(json["confidence_interval"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_advise() {
        let applicant = FeatureRecord::new(35000.0, 35.0, 250000.0, 600.0, 0.65, 2.0, 30.0);
        let as_of = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let plan = demo_service().advise(&applicant, as_of).unwrap();
        assert_eq!(plan.target_timeline, "9 months");
        assert_eq!(plan.reapplication_date, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
    }

    #[test]
    fn test_portfolio_validates_every_record() {
        let mut bad = standard();
        bad.age = f64::NAN;
        let service = demo_service();
        assert!(service.portfolio(&[standard(), bad]).is_err());
        assert_eq!(service.portfolio(&[standard()]).unwrap().total_customers, 1);
    }

    #[test]
    fn test_health_states() {
        let health = demo_service().health();
        assert_eq!(health.status, ServiceStatus::Healthy);
        assert!(health.model_ready);
        assert!(!health.degraded);
        assert_eq!(health.model_source, "credit_risk_lr");

        let fallback = RiskService::new(ModelHandle::with_model(LoadedModel::fallback("missing")));
        let health = fallback.health();
        assert_eq!(health.status, ServiceStatus::Degraded);
        assert!(health.model_ready);
        assert!(health.degraded);
        assert_eq!(health.model_source, "Fallback Model");

        let health = RiskService::new(ModelHandle::new()).health();
        assert_eq!(health.status, ServiceStatus::Unavailable);
        assert!(!health.model_ready);
    }

    #[test]
    fn test_start_with_missing_artifacts_is_degraded() {
        let dir = tempfile::tempdir().unwrap();
        let service = RiskService::start(&ModelPaths::in_dir(dir.path()));
        assert!(service.health().degraded);
    }

    #[test]
    fn test_model_info() {
        let info = demo_service().model_info().unwrap();
        assert_eq!(info.coefficients.count, 8);
        assert_eq!(info.coefficients.names[0], "Intercept");
        assert_eq!(info.metadata.model_name, "credit_risk_lr");
    }
}
