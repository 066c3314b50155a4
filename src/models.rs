use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One customer's profile as the churn service expects it on the wire.
/// Field order matches the service's training columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub gender: String,
    #[serde(rename = "SeniorCitizen")]
    pub senior_citizen: String,
    #[serde(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    pub tenure: u32,
    #[serde(rename = "PhoneService")]
    pub phone_service: String,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: String,
    #[serde(rename = "InternetService")]
    pub internet_service: String,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: String,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: String,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: String,
    #[serde(rename = "TechSupport")]
    pub tech_support: String,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: String,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
}

impl CustomerRecord {
    /// The fixed record every smoke run posts.
    pub fn example() -> Self {
        Self {
            gender: "Female".into(),
            senior_citizen: "No".into(),
            partner: "Yes".into(),
            dependents: "No".into(),
            tenure: 12,
            phone_service: "Yes".into(),
            multiple_lines: "No".into(),
            internet_service: "DSL".into(),
            online_security: "Yes".into(),
            online_backup: "No".into(),
            device_protection: "Yes".into(),
            tech_support: "No".into(),
            streaming_tv: "No".into(),
            streaming_movies: "No".into(),
            contract: "Two year".into(),
            paperless_billing: "No".into(),
            payment_method: "Bank transfer (automatic)".into(),
            monthly_charges: 45.20,
            total_charges: 542.4,
        }
    }

    /// Copy of this record moved onto a short month-to-month contract.
    pub fn month_to_month_variant(&self) -> Self {
        Self { contract: "Month-to-month".into(), tenure: 2, ..self.clone() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub customers: Vec<CustomerRecord>,
}

impl BatchRequest {
    /// The two-record batch: the base record and its month-to-month variant.
    pub fn smoke_batch(base: &CustomerRecord) -> Self {
        Self { customers: vec![base.clone(), base.month_to_month_variant()] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub customer_id: Value,
    pub churn_probability: f64,
    pub churn_prediction: Value,
    pub risk_level: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureImportanceResponse {
    pub model_name: Value,
    // Keeps the ranking the service sent; a non-numeric score fails decoding
    pub feature_importance: IndexMap<String, f64>,
}

impl FeatureImportanceResponse {
    /// First `n` entries in service order.
    pub fn top(&self, n: usize) -> Vec<(&str, f64)> {
        self.feature_importance.iter().take(n).map(|(name, score)| (name.as_str(), *score)).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_customers: Value,
    pub predicted_churn_count: Value,
    pub predicted_churn_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub summary: BatchSummary,
    #[serde(default)]
    pub predictions: Vec<Value>,
}
