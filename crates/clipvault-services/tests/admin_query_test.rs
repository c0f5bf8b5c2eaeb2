//! Admin read-side tests: filter composition over the live set, statistics,
//! and export projections through the query service.

use std::sync::Arc;

use chrono::{Duration, Utc};
use clipvault_core::models::{
    NewSubmission, SubmissionFilter, SubmissionRecord, SubmissionStatus,
};
use clipvault_services::test_helpers::InMemoryRecordStore;
use clipvault_services::{AdminQueryService, ExportFormat};
use uuid::Uuid;

fn record(first: &str, email: &str, days_ago: i64, status: SubmissionStatus) -> SubmissionRecord {
    let form = NewSubmission {
        first_name: first.to_string(),
        last_name: "Doe".to_string(),
        email: email.to_string(),
        location: Some("Porto".to_string()),
        description: None,
        own_recording: true,
        recorder_name: None,
        want_credit: false,
        credit_platform: None,
        credit_username: None,
        payout_email: None,
        agreed_terms: true,
        agreed_distribution: true,
    };
    let mut record = form.into_record(Uuid::new_v4(), Utc::now() - Duration::days(days_ago));
    record.status = status;
    record
}

fn seeded_store() -> Arc<InMemoryRecordStore> {
    let store = Arc::new(InMemoryRecordStore::new());
    store.add_record(record("Jane", "j@x.com", 0, SubmissionStatus::Pending));
    store.add_record(record("Ana", "a@y.com", 3, SubmissionStatus::Approved));
    store.add_record(record("Maria", "m@z.com", 10, SubmissionStatus::Rejected));
    store
}

#[tokio::test]
async fn list_applies_the_filter_over_the_snapshot() {
    let service = AdminQueryService::new(seeded_store());

    let all = service.list(&SubmissionFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let pending_only = SubmissionFilter {
        statuses: Some(vec![SubmissionStatus::Pending]),
        ..Default::default()
    };
    let hits = service.list(&pending_only).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].first_name, "Jane");

    let recent = SubmissionFilter {
        date_from: Some(Utc::now() - Duration::days(5)),
        ..Default::default()
    };
    assert_eq!(service.list(&recent).await.unwrap().len(), 2);
}

#[tokio::test]
async fn stats_count_by_status() {
    let service = AdminQueryService::new(seeded_store());
    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.approved, 1);
    assert_eq!(stats.rejected, 1);
}

#[tokio::test]
async fn export_contains_exactly_the_filtered_subset() {
    let store = seeded_store();
    let service = AdminQueryService::new(store.clone());

    let filter = SubmissionFilter {
        statuses: Some(vec![SubmissionStatus::Pending, SubmissionStatus::Approved]),
        ..Default::default()
    };
    let subset = service.list(&filter).await.unwrap();
    assert_eq!(subset.len(), 2);

    let csv = service.export(&filter, ExportFormat::Csv).await.unwrap();
    for record in &subset {
        assert_eq!(csv.body.matches(&record.id.to_string()).count(), 1);
    }

    let json = service.export(&filter, ExportFormat::Json).await.unwrap();
    let parsed: Vec<SubmissionRecord> = serde_json::from_str(&json.body).unwrap();
    assert_eq!(parsed, subset);
}

#[tokio::test]
async fn get_missing_record_is_not_found() {
    let service = AdminQueryService::new(Arc::new(InMemoryRecordStore::new()));
    let err = service.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, clipvault_core::AppError::NotFound(_)));
}
