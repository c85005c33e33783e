// tests/integration/sync.rs

use crate::common::{MemoryDirectory, sample_store};
use async_trait::async_trait;
use posix_ldap_sync::config::{AppConfig, MappingConfig};
use posix_ldap_sync::directory_service::{DirectoryClient, DirectoryError, build_entries};
use posix_ldap_sync::models::{DirectoryEntry, EntryOutcome};
use posix_ldap_sync::{AccountFilter, DirectorySync, run_once};
use tokio::sync::watch;

fn sample_entries() -> Vec<DirectoryEntry> {
    let (entries, _) = build_entries(&sample_store(), &AccountFilter::default(), &MappingConfig::default());
    entries
}

#[tokio::test]
async fn test_first_run_creates_all_entries() {
    let entries = sample_entries();
    let mut dir = MemoryDirectory::default();

    let report = DirectorySync::new(&mut dir).upsert(&entries).await;

    assert_eq!(report.created, 4);
    assert_eq!(report.already_present, 0);
    assert_eq!(report.failed(), 0);
    assert!(report.is_success());
    assert!(report.finished_at.is_some());
    assert_eq!(dir.entries.len(), 4);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let entries = sample_entries();
    let mut dir = MemoryDirectory::default();

    DirectorySync::new(&mut dir).upsert(&entries).await;
    let report = DirectorySync::new(&mut dir).upsert(&entries).await;

    assert_eq!(report.created, 0);
    assert_eq!(report.already_present, entries.len());
    assert_eq!(report.failed(), 0);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_rejection_does_not_stop_batch() {
    let entries = sample_entries();
    let mut dir = MemoryDirectory::rejecting("jdoe");

    let report = DirectorySync::new(&mut dir).upsert(&entries).await;

    assert_eq!(dir.calls, entries.len());
    assert_eq!(report.created, 3);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].login_name, "jdoe");
    assert_eq!(report.failures[0].dn, "uid=jdoe,ou=usuarios,dc=aso,dc=local");
    assert!(report.failures[0].message.contains("code 21"));
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_rerun_after_partial_failure_retries_only_missing() {
    let entries = sample_entries();
    let mut dir = MemoryDirectory::rejecting("solo");
    DirectorySync::new(&mut dir).upsert(&entries).await;

    dir.reject.clear();
    let report = DirectorySync::new(&mut dir).upsert(&entries).await;

    assert_eq!(report.created, 1);
    assert_eq!(report.already_present, 3);
    assert_eq!(report.failed(), 0);
}

#[tokio::test]
async fn test_apply_reports_outcome() {
    let entries = sample_entries();
    let mut dir = MemoryDirectory::default();
    let mut sync = DirectorySync::new(&mut dir);

    assert_eq!(sync.apply(&entries[0]).await, EntryOutcome::Created);
    assert_eq!(sync.apply(&entries[0]).await, EntryOutcome::AlreadyPresent);
}

/// Каталог, который просит остановиться после первой записи
struct StoppingDirectory {
    inner: MemoryDirectory,
    stop: watch::Sender<bool>,
}

#[async_trait]
impl DirectoryClient for StoppingDirectory {
    async fn add(&mut self, entry: &DirectoryEntry) -> Result<(), DirectoryError> {
        let result = self.inner.add(entry).await;
        let _ = self.stop.send(true);
        result
    }
}

#[tokio::test]
async fn test_stop_between_entries() {
    let entries = sample_entries();
    let (tx, rx) = watch::channel(false);
    let mut dir = StoppingDirectory {
        inner: MemoryDirectory::default(),
        stop: tx,
    };

    let report = DirectorySync::new(&mut dir).with_stop(rx).upsert(&entries).await;

    assert_eq!(report.created, 1);
    assert_eq!(report.not_attempted, entries.len() - 1);
    assert_eq!(dir.inner.entries.len(), 1);
}

/// Каталог, до которого нельзя достучаться
struct UnreachableDirectory {
    calls: usize,
}

#[async_trait]
impl DirectoryClient for UnreachableDirectory {
    async fn add(&mut self, _entry: &DirectoryEntry) -> Result<(), DirectoryError> {
        self.calls += 1;
        Err(DirectoryError::Connection("connection reset by peer".to_string()))
    }
}

#[tokio::test]
async fn test_lost_connection_keeps_processing_remaining_entries() {
    let entries = sample_entries();
    let mut dir = UnreachableDirectory { calls: 0 };

    let mut sync = DirectorySync::new(&mut dir);
    assert!(!sync.connection_lost());
    let report = sync.upsert(&entries).await;
    assert!(sync.connection_lost());

    assert_eq!(dir.calls, entries.len());
    assert_eq!(report.failed(), entries.len());
    assert_eq!(report.created, 0);
    assert!(report.failures.iter().all(|f| f.message.contains("connection reset by peer")));
}

#[tokio::test]
async fn test_rejection_is_not_a_lost_connection() {
    let entries = sample_entries();
    let mut dir = MemoryDirectory::rejecting("jdoe");

    let mut sync = DirectorySync::new(&mut dir);
    sync.upsert(&entries).await;
    assert!(!sync.connection_lost());
}

#[tokio::test]
async fn test_run_once_counts_skipped_accounts() {
    let config = AppConfig::default();
    let store = sample_store();
    let mut dir = MemoryDirectory::default();

    let report = run_once(&config, &store, &mut dir, None).await;

    assert_eq!(report.created, 4);
    assert_eq!(report.skipped, 4);
    assert!(dir.entries.contains_key("uid=ana,ou=usuarios,dc=aso,dc=local"));
    assert!(!dir.entries.contains_key("uid=root,ou=usuarios,dc=aso,dc=local"));
}

#[test]
fn test_report_summary_lists_failures() {
    let entries = sample_entries();
    let mut dir = MemoryDirectory::rejecting("ana");
    let report = tokio_test::block_on(DirectorySync::new(&mut dir).upsert(&entries));

    let text = report.to_string();
    assert!(text.contains("created: 3, already present: 0, failed: 1"));
    assert!(text.contains("ana: Rejected (code 21): invalid attribute syntax"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["created"], 3);
    assert_eq!(json["failures"][0]["login_name"], "ana");
}
