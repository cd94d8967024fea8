//! Router tests against the in-memory ledger source.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Days, NaiveDate};
use consolidator_api::{AppState, create_router};
use consolidator_core::entity::EntityRegistry;
use consolidator_core::ledger::{
    BankAccount, InMemoryLedgerSource, LedgerRecord, RecordStatus, RecordType, SourceError,
};
use consolidator_shared::config::{AnalyticsConfig, EntityConfig, EntityRole, RelationshipConfig};
use consolidator_shared::types::{Currency, EntityId, Money, RecordId};
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn registry() -> EntityRegistry {
    let entity = |id: u32, name: &str, vat: &str, role| EntityConfig {
        id,
        legal_name: format!("{name} B.V."),
        short_name: name.to_string(),
        vat_number: vat.to_string(),
        role,
    };
    EntityRegistry::from_config(
        &[
            entity(1, "P&O BV", "NL820994297B01", EntityRole::Parent),
            entity(3, "P&O Int", "NL862809095B01", EntityRole::Subsidiary),
        ],
        &[RelationshipConfig { a: 1, b: 3 }],
    )
    .unwrap()
}

fn journal(id: u64, owner: u32, counterparty: u32, amount: rust_decimal::Decimal) -> LedgerRecord {
    LedgerRecord::new(
        RecordId(id),
        EntityId(owner),
        RecordType::Journal,
        amount,
        Currency::Eur,
        as_of() - Days::new(30),
    )
    .with_counterparty(EntityId(counterparty))
}

fn revenue(id: u64, owner: u32, amount: rust_decimal::Decimal) -> LedgerRecord {
    LedgerRecord::new(
        RecordId(id),
        EntityId(owner),
        RecordType::Revenue,
        amount,
        Currency::Eur,
        as_of() - Days::new(45),
    )
    .with_residual(dec!(0))
    .with_status(RecordStatus::Paid)
}

fn app(source: InMemoryLedgerSource) -> Router {
    create_router(AppState {
        source: Arc::new(source),
        registry: Arc::new(registry()),
        analytics: Arc::new(AnalyticsConfig {
            as_of_date: Some(as_of()),
            ..AnalyticsConfig::default()
        }),
    })
}

fn source() -> InMemoryLedgerSource {
    InMemoryLedgerSource::new()
        .with_records([
            journal(1, 1, 3, dec!(10000.00)),
            journal(2, 3, 1, dec!(-9998.50)),
            revenue(3, 1, dec!(8000)),
        ])
        .with_bank_account(
            EntityId(1),
            BankAccount::new("ING Zakelijk", Money::new(dec!(1000), Currency::Eur)),
        )
        .with_bank_account(
            EntityId(3),
            BankAccount::new("Rabobank", Money::new(dec!(500), Currency::Eur)),
        )
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(source()), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_entities_lists_registry() {
    let (status, body) = get(app(source()), "/api/v1/entities").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entities"].as_array().unwrap().len(), 2);
    assert_eq!(body["entities"][1]["short_name"], "P&O Int");
    assert_eq!(body["entities"][0]["jurisdiction"], "NL");
    assert_eq!(body["relationships"][0]["a"], 1);
}

#[tokio::test]
async fn test_consolidated_report_for_explicit_date() {
    let (status, body) = get(app(source()), "/api/v1/reports/consolidated?as_of=2025-06-02").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["as_of"], "2025-06-02");
    assert_eq!(body["intercompany"]["status"], "ok");
    assert_eq!(body["intercompany"]["data"]["positions"][0]["difference"], "1.50");
    assert_eq!(body["intercompany"]["data"]["breaks"], 1);
}

#[tokio::test]
async fn test_consolidated_report_carries_overview_and_bank_accounts() {
    let (status, body) = get(app(source()), "/api/v1/reports/consolidated?as_of=2025-06-02").await;

    assert_eq!(status, StatusCode::OK);
    let overview = &body["overview"];
    assert_eq!(overview["status"], "ok");
    assert_eq!(overview["data"]["year"], 2025);
    assert_eq!(overview["data"]["consolidated"]["profit_and_loss"]["revenue"], "8000");
    assert_eq!(overview["data"]["consolidated"]["months"].as_array().unwrap().len(), 6);
    assert_eq!(overview["data"]["entities"][0]["entity_id"], 1);
    assert_eq!(body["entities"][0]["bank_accounts"][0]["name"], "ING Zakelijk");
    assert_eq!(body["entities"][0]["bank_accounts"][0]["balance"]["amount"], "1000");
    assert_eq!(body["entities"][1]["bank_balance"], "500");
}

#[tokio::test]
async fn test_consolidated_report_defaults_to_configured_date() {
    let (status, body) = get(app(source()), "/api/v1/reports/consolidated").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["as_of"], "2025-06-02");
}

#[tokio::test]
async fn test_invalid_date_is_validation_error() {
    let (status, body) = get(app(source()), "/api/v1/reports/consolidated?as_of=2025-13-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_upstream_outage_still_returns_report() {
    let failing = source().with_failure(EntityId(3), SourceError::Unavailable("timeout".into()));

    let (status, body) = get(app(failing), "/api/v1/reports/consolidated").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["intercompany"]["status"], "partial");
    assert_eq!(body["intercompany"]["data"]["positions"][0]["is_break"], false);
}
