use axum::http::StatusCode;
use axum::{routing::{get, post}, Json, Router};
use serde_json::json;

use churn_smoke::{ChurnApiClient, Check, MockService, Reporter, RunEnd, RunSummary, SmokeRunner};

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{}", addr)
}

async fn run_against(base: &str) -> (RunSummary, String) {
    let client = ChurnApiClient::new(base).unwrap();
    let runner = SmokeRunner::new(client, "python api/main.py");
    let mut reporter = Reporter::new(Vec::new());
    let summary = runner.run(&mut reporter).await.unwrap();
    (summary, String::from_utf8(reporter.into_inner()).unwrap())
}

#[tokio::test]
async fn all_checks_pass_against_fixture() {
    let mock = MockService::new();
    let base = spawn(mock.router()).await;
    let (summary, out) = run_against(&base).await;

    assert_eq!(summary.end, RunEnd::Completed);
    assert!(summary.all_passed());
    for marker in [
        "✅ Health check passed",
        "✅ Single prediction successful",
        "✅ Feature importance retrieved",
        "✅ Batch prediction successful",
        "🎉 All tests completed!",
    ] {
        assert!(out.contains(marker), "missing {:?} in:\n{}", marker, out);
    }
    assert!(out.contains("   Response: {\"status\":\"ok\"}"));
    assert!(out.contains("   Customer ID: C1\n   Churn Probability: 0.1234\n   Churn Prediction: No\n   Risk Level: Low"));
    assert!(out.contains("   Model: rf\n   Top 5 features:\n     1. tenure: 0.3000\n     2. Contract: 0.2500\n     3. MonthlyCharges: 0.2000\n     4. TotalCharges: 0.1500\n     5. gender: 0.1000"));
    assert!(out.contains("   Total customers: 2\n   Predicted churn count: 1\n   Predicted churn rate: 0.5000"));
    assert!(!out.contains('❌'));
    assert_eq!(mock.hits(), vec!["/health", "/predict", "/feature-importance", "/batch-predict"]);
}

#[tokio::test]
async fn full_report_layout() {
    let base = spawn(MockService::new().router()).await;
    let (_, out) = run_against(&base).await;
    let expected = format!(
        "Testing Customer Churn Prediction API...\n{}\n\
1. Testing health endpoint...\n\
✅ Health check passed\n   Response: {{\"status\":\"ok\"}}\n\
\n2. Testing single prediction...\n\
✅ Single prediction successful\n   Customer ID: C1\n   Churn Probability: 0.1234\n   Churn Prediction: No\n   Risk Level: Low\n\
\n3. Testing feature importance...\n\
✅ Feature importance retrieved\n   Model: rf\n   Top 5 features:\n     1. tenure: 0.3000\n     2. Contract: 0.2500\n     3. MonthlyCharges: 0.2000\n     4. TotalCharges: 0.1500\n     5. gender: 0.1000\n\
\n4. Testing batch prediction...\n\
✅ Batch prediction successful\n   Total customers: 2\n   Predicted churn count: 1\n   Predicted churn rate: 0.5000\n\
\n🎉 All tests completed!\n",
        "=".repeat(50)
    );
    assert_eq!(out, expected);
}

#[tokio::test]
async fn unreachable_service_prints_remediation() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (summary, out) = run_against(&format!("http://{}", addr)).await;
    assert!(matches!(summary.end, RunEnd::ConnectionError(_)));
    assert_eq!(summary.attempted(), vec![Check::Health]);
    assert!(out.contains("❌ Connection error: Make sure the API server is running\n   Start the server with: python api/main.py\n"));
    assert!(!out.contains("2. Testing single prediction"));
    assert!(!out.contains("All tests completed"));
    assert_eq!(summary.exit_code(false), 0);
    assert_eq!(summary.exit_code(true), 1);
}

#[tokio::test]
async fn failed_health_stops_the_run() {
    let mock = MockService::new().fail("/health", StatusCode::SERVICE_UNAVAILABLE, r#"{"detail":"model not loaded"}"#);
    let base = spawn(mock.router()).await;
    let (summary, out) = run_against(&base).await;

    assert_eq!(summary.end, RunEnd::HealthFailed);
    assert!(out.ends_with("1. Testing health endpoint...\n❌ Health check failed\n"), "got:\n{}", out);
    assert_eq!(mock.hits(), vec!["/health"]);
}

#[tokio::test]
async fn failed_prediction_is_not_fatal() {
    let mock = MockService::new().fail("/predict", StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    let base = spawn(mock.router()).await;
    let (summary, out) = run_against(&base).await;

    assert_eq!(summary.end, RunEnd::Completed);
    assert!(!summary.all_passed());
    assert!(out.contains("❌ Single prediction failed\n   Error: Internal Server Error\n"));
    assert!(out.contains("✅ Feature importance retrieved"));
    assert!(out.contains("✅ Batch prediction successful"));
    assert!(out.contains("🎉 All tests completed!"));
    assert_eq!(mock.hits(), vec!["/health", "/predict", "/feature-importance", "/batch-predict"]);
}

#[tokio::test]
async fn failed_feature_importance_and_batch_are_reported() {
    let mock = MockService::new()
        .fail("/feature-importance", StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#)
        .fail("/batch-predict", StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":[{"msg":"field required"}]}"#);
    let base = spawn(mock.router()).await;
    let (summary, out) = run_against(&base).await;

    assert_eq!(summary.end, RunEnd::Completed);
    assert!(out.contains("❌ Feature importance failed\n   Error: {\"detail\":\"Not Found\"}\n"));
    assert!(out.contains("❌ Batch prediction failed\n   Error: {\"detail\":[{\"msg\":\"field required\"}]}\n"));
    let passed: Vec<bool> = summary.checks.iter().map(|c| c.passed).collect();
    assert_eq!(passed, vec![true, true, false, false]);
}

#[tokio::test]
async fn batch_payload_carries_both_records() {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/predict", post(|| async { Json(json!({"customer_id": 7, "churn_probability": 0.9, "churn_prediction": true, "risk_level": "High"})) }))
        .route("/feature-importance", get(|| async { Json(json!({"model_name": "xgb", "feature_importance": {"tenure": 0.61, "Contract": 0.39}})) }))
        .route("/batch-predict", post(|Json(body): Json<serde_json::Value>| async move {
            let customers = body["customers"].as_array().cloned().unwrap_or_default();
            let first_ok = customers.first().map(|c| c["Contract"] == "Two year" && c["tenure"] == 12).unwrap_or(false);
            let second_ok = customers.get(1).map(|c| c["Contract"] == "Month-to-month" && c["tenure"] == 2 && c["MonthlyCharges"] == 45.2).unwrap_or(false);
            if !(first_ok && second_ok) {
                return (StatusCode::BAD_REQUEST, Json(json!({"detail": "unexpected batch"})));
            }
            (StatusCode::OK, Json(json!({"summary": {"total_customers": customers.len(), "predicted_churn_count": 0, "predicted_churn_rate": 0.0}})))
        }));
    let base = spawn(app).await;
    let (summary, out) = run_against(&base).await;

    assert!(summary.all_passed(), "report:\n{}", out);
    assert!(out.contains("   Customer ID: 7\n   Churn Probability: 0.9000\n   Churn Prediction: true\n"));
    // fewer than five features are listed as-is
    assert!(out.contains("   Top 5 features:\n     1. tenure: 0.6100\n     2. Contract: 0.3900\n\n4. Testing"));
    assert!(out.contains("   Total customers: 2\n"));
    assert!(out.contains("   Predicted churn rate: 0.0000\n"));
}

#[tokio::test]
async fn undecodable_success_body_aborts_run() {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/predict", post(|| async { Json(json!({"customer_id": "C1"})) }))
        .route("/feature-importance", get(|| async { Json(json!({})) }))
        .route("/batch-predict", post(|| async { Json(json!({})) }));
    let base = spawn(app).await;
    let (summary, out) = run_against(&base).await;

    assert!(matches!(summary.end, RunEnd::Aborted(_)));
    assert_eq!(summary.attempted(), vec![Check::Health, Check::Prediction]);
    assert!(out.contains("❌ Test failed with error: invalid response from /predict"), "got:\n{}", out);
    assert!(!out.contains("3. Testing feature importance"));
    assert!(!out.contains("All tests completed"));
}

#[tokio::test]
async fn non_numeric_importance_aborts_run() {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .route("/predict", post(|| async { Json(json!({"customer_id": "C1", "churn_probability": 0.1, "churn_prediction": "No", "risk_level": "Low"})) }))
        .route("/feature-importance", get(|| async {
            Json(json!({"model_name": "rf", "feature_importance": {"tenure": "high", "Contract": null, "a": 0.3, "b": 0.2, "c": 0.1}}))
        }))
        .route("/batch-predict", post(|| async { Json(json!({"summary": {"total_customers": 2, "predicted_churn_count": 0, "predicted_churn_rate": 0.0}})) }));
    let base = spawn(app).await;
    let (summary, out) = run_against(&base).await;

    assert!(matches!(summary.end, RunEnd::Aborted(_)));
    assert_eq!(summary.attempted(), vec![Check::Health, Check::Prediction, Check::FeatureImportance]);
    assert!(!out.contains("✅ Feature importance retrieved"));
    assert!(out.contains("❌ Test failed with error: invalid response from /feature-importance"), "got:\n{}", out);
    assert!(!out.contains("4. Testing batch prediction"));
}

#[tokio::test]
async fn service_hanging_up_prints_remediation() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await { drop(socket); }
    });

    let (summary, out) = run_against(&format!("http://{}", addr)).await;
    assert!(matches!(summary.end, RunEnd::ConnectionError(_)), "end: {:?}", summary.end);
    assert_eq!(summary.attempted(), vec![Check::Health]);
    assert!(out.contains("❌ Connection error: Make sure the API server is running\n"));
    assert!(!out.contains("Test failed with error"));
}
