//! Upsert semantics against a live Postgres instance.
//!
//! These tests need a database; set AFLOW_TEST_DATABASE_URL to run them.
//! Without it each test returns early, mirroring how the repo's other
//! integration tests skip missing resources.

use aflow_data::{
    DatabaseClient, IndustryScoreRecord, MoneyflowRecord, MoneyflowRepository,
    NotificationRepository, ScoreRepository,
};
use chrono::NaiveDate;

async fn test_client() -> Option<DatabaseClient> {
    let url = std::env::var("AFLOW_TEST_DATABASE_URL").ok()?;
    let client = DatabaseClient::new(&url, 2).await.ok()?;
    client.init_schema().await.expect("schema init failed");
    Some(client)
}

fn flow_row(code: &str, date: &str, net: f64) -> MoneyflowRecord {
    MoneyflowRecord {
        ts_code: code.to_string(),
        trade_date: date.to_string(),
        buy_sm_amount: Some(1.0),
        sell_sm_amount: Some(1.0),
        buy_md_amount: Some(1.0),
        sell_md_amount: Some(1.0),
        buy_lg_amount: Some(1.0),
        sell_lg_amount: Some(1.0),
        buy_elg_amount: Some(net),
        sell_elg_amount: Some(0.0),
        net_mf_amount: Some(net),
    }
}

fn industry_score_row(code: &str, date: &str, percentile: f64) -> IndustryScoreRecord {
    IndustryScoreRecord {
        trade_date: date.to_string(),
        industry_code: code.to_string(),
        industry: "test industry".to_string(),
        rank: 1,
        net_amount: 1.0,
        net_amount_percentile: percentile,
        d1_percentile: 50.0,
        d2_percentile: 50.0,
        d3_percentile: 50.0,
        d4_percentile: 50.0,
        d5_percentile: 50.0,
    }
}

#[tokio::test]
async fn do_nothing_upsert_is_idempotent() {
    let Some(client) = test_client().await else {
        return;
    };
    let repo = MoneyflowRepository::new(client.pool());

    let rows = vec![
        flow_row("IT0001.SZ", "20990101", 100.0),
        flow_row("IT0002.SZ", "20990101", 200.0),
    ];
    repo.upsert_batch(&rows).await.expect("first upsert failed");

    // Second run with the same keys inserts nothing and changes nothing.
    let inserted = repo
        .upsert_batch(&rows)
        .await
        .expect("second upsert failed");
    assert_eq!(inserted, 0);

    let history = repo
        .net_flow_history(
            &["IT0001.SZ".to_string(), "IT0002.SZ".to_string()],
            "20981231",
            "20990101",
        )
        .await
        .expect("history query failed");
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn do_update_upsert_reflects_the_second_run() {
    let Some(client) = test_client().await else {
        return;
    };
    let repo = ScoreRepository::new(client.pool());

    repo.upsert_industry_scores(&[industry_score_row("IT8801", "20990102", 40.0)])
        .await
        .expect("first upsert failed");
    repo.upsert_industry_scores(&[industry_score_row("IT8801", "20990102", 90.0)])
        .await
        .expect("second upsert failed");

    let stored: (f64,) = sqlx::query_as(
        "SELECT net_amount_percentile FROM a_stock_moneyflow_industry_score
         WHERE industry_code = $1 AND trade_date = $2",
    )
    .bind("IT8801")
    .bind("20990102")
    .fetch_one(&client.pool())
    .await
    .expect("readback failed");
    assert!((stored.0 - 90.0).abs() < 1e-9);
}

#[tokio::test]
async fn notification_ledger_claims_at_most_once() {
    let Some(client) = test_client().await else {
        return;
    };
    let ledger = NotificationRepository::new(client.pool());

    let signal_time = NaiveDate::from_ymd_opt(2099, 1, 3)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap();

    let first = ledger
        .record_if_new(signal_time, "IT0001.SZ")
        .await
        .expect("first claim failed");
    let second = ledger
        .record_if_new(signal_time, "IT0001.SZ")
        .await
        .expect("second claim failed");

    assert!(first);
    assert!(!second);
}
