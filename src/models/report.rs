// src/models/report.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::Utc;
use std::fmt;

/// Итог обработки одной записи
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntryOutcome {
    Created,
    AlreadyPresent,
    Failed { message: String },
}

/// Запись, которую каталог отклонил
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub login_name: String,
    pub dn: String,
    pub message: String,
}

/// Отчёт одного прогона синхронизации
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: chrono::DateTime<Utc>,
    pub finished_at: Option<chrono::DateTime<Utc>>,
    pub created: usize,
    pub already_present: usize,
    pub failures: Vec<SyncFailure>,

    /// Аккаунты вне диапазона uid (системные)
    #[serde(default)]
    pub skipped: usize,

    /// Записи, до которых не дошли из-за остановки
    #[serde(default)]
    pub not_attempted: usize,
}

impl SyncReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            created: 0,
            already_present: 0,
            failures: vec![],
            skipped: 0,
            not_attempted: 0,
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Учесть результат записи
    pub fn record(&mut self, login_name: &str, dn: &str, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Created => self.created += 1,
            EntryOutcome::AlreadyPresent => self.already_present += 1,
            EntryOutcome::Failed { message } => self.failures.push(SyncFailure {
                login_name: login_name.to_string(),
                dn: dn.to_string(),
                message,
            }),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Все записи созданы или уже были в каталоге
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Default for SyncReport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "created: {}, already present: {}, failed: {}, skipped: {}",
            self.created,
            self.already_present,
            self.failed(),
            self.skipped
        )?;
        if self.not_attempted > 0 {
            writeln!(f, "not attempted (stopped): {}", self.not_attempted)?;
        }
        for failure in &self.failures {
            writeln!(f, "  {}: {}", failure.login_name, failure.message)?;
        }
        Ok(())
    }
}
