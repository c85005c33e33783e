// src/directory_service.rs

use crate::account_filter::AccountFilter;
use crate::account_store::{AccountStore, StoreReadError};
use crate::config::{AppConfig, ConfigError, MappingConfig};
use crate::models::*;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// LDAP result code entryAlreadyExists
pub const RC_ALREADY_EXISTS: u32 = 68;

/// Ошибки каталога по одной записи
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    /// Запись уже есть — для синхронизации это успех
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    /// Каталог отклонил запись (нарушение схемы, нет прав и т.п.)
    #[error("Rejected (code {code}): {message}")]
    Rejected { code: u32, message: String },
    /// Соединение оборвалось или не установилось
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Ошибки, которые прерывают весь прогон
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreReadError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Клиент каталога: единственная операция, которая нужна синхронизации
#[async_trait]
pub trait DirectoryClient: Send {
    async fn add(&mut self, entry: &DirectoryEntry) -> Result<(), DirectoryError>;
}

/// Построить записи для управляемых аккаунтов в порядке файла.
/// Возвращает записи и число пропущенных (системных) аккаунтов.
pub fn build_entries(
    store: &AccountStore,
    filter: &AccountFilter,
    mapping: &MappingConfig,
) -> (Vec<DirectoryEntry>, usize) {
    let accounts = store.read_accounts();
    let managed = filter.managed(accounts);
    let skipped = accounts.len() - managed.len();

    let entries = managed
        .into_iter()
        .map(|account| {
            let derived = DerivedName::derive(&account.gecos, &account.login_name);
            debug!(login = %account.login_name, uid = account.numeric_id, "Mapping account");
            map_entry(account, account.credential_hash.as_ref(), &derived, mapping)
        })
        .collect();

    (entries, skipped)
}

/// Идемпотентная заливка записей в каталог
///
/// Каждая запись добавляется отдельно. «Уже существует» считается
/// успехом, остальные ошибки копятся в отчёте, обработка продолжается.
/// Транзакций нет: прерванный прогон можно просто повторить.
pub struct DirectorySync<'a, C: DirectoryClient + ?Sized> {
    client: &'a mut C,
    stop: Option<watch::Receiver<bool>>,
    connection_lost: bool,
}

impl<'a, C: DirectoryClient + ?Sized> DirectorySync<'a, C> {
    pub fn new(client: &'a mut C) -> Self {
        Self {
            client,
            stop: None,
            connection_lost: false,
        }
    }

    /// Остановиться перед следующей записью, когда в канал придёт `true`
    pub fn with_stop(mut self, stop: watch::Receiver<bool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Хотя бы одна запись упала из-за обрыва соединения
    pub fn connection_lost(&self) -> bool {
        self.connection_lost
    }

    fn stop_requested(&self) -> bool {
        self.stop.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Добавить одну запись и вернуть её итог
    pub async fn apply(&mut self, entry: &DirectoryEntry) -> EntryOutcome {
        match self.client.add(entry).await {
            Ok(()) => {
                info!(dn = %entry.dn, "Entry created");
                EntryOutcome::Created
            }
            Err(DirectoryError::AlreadyExists(_)) => {
                debug!(dn = %entry.dn, "Entry already present");
                EntryOutcome::AlreadyPresent
            }
            Err(e) => {
                if matches!(e, DirectoryError::Connection(_)) && !self.connection_lost {
                    self.connection_lost = true;
                    warn!(error = %e, "Directory connection lost, remaining entries will likely fail");
                }
                warn!(dn = %entry.dn, error = %e, "Entry failed");
                EntryOutcome::Failed { message: e.to_string() }
            }
        }
    }

    /// Залить все записи, дописывая итоги в `report`
    pub async fn upsert_into(&mut self, entries: &[DirectoryEntry], report: &mut SyncReport) {
        for (i, entry) in entries.iter().enumerate() {
            if self.stop_requested() {
                report.not_attempted += entries.len() - i;
                warn!(remaining = entries.len() - i, "Stop requested, remaining entries not submitted");
                break;
            }
            let outcome = self.apply(entry).await;
            report.record(entry.uid(), &entry.dn, outcome);
        }
    }

    pub async fn upsert(&mut self, entries: &[DirectoryEntry]) -> SyncReport {
        let mut report = SyncReport::new();
        self.upsert_into(entries, &mut report).await;
        report.finish();
        report
    }
}

/// Один полный прогон: отбор, построение записей, заливка.
/// Локальные базы уже прочитаны в `store`, так что сюда доходят
/// только ошибки отдельных записей — они в отчёте.
pub async fn run_once<C: DirectoryClient + ?Sized>(
    config: &AppConfig,
    store: &AccountStore,
    client: &mut C,
    stop: Option<watch::Receiver<bool>>,
) -> SyncReport {
    let filter = AccountFilter::from(&config.filter);
    let (entries, skipped) = build_entries(store, &filter, &config.mapping);
    info!(managed = entries.len(), skipped, "Submitting entries to directory");

    let mut sync = DirectorySync::new(client);
    if let Some(stop) = stop {
        sync = sync.with_stop(stop);
    }

    let mut report = SyncReport::new();
    report.skipped = skipped;
    sync.upsert_into(&entries, &mut report).await;
    report.finish();

    info!(
        created = report.created,
        already_present = report.already_present,
        failed = report.failed(),
        "Sync finished"
    );
    report
}
