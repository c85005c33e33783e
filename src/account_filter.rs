// src/account_filter.rs

use crate::config::{FilterConfig, MIN_MANAGED_UID};
use crate::models::AccountRecord;

/// Какие аккаунты синхронизируются: uid в диапазоне [min, max]
///
/// По умолчанию 1000..=9999 — ровно четырёхзначные uid, как в исходном
/// отборе «человеческих» аккаунтов. Без верхней границы — любой uid >= min.
/// Нижняя граница никогда не опускается ниже [`MIN_MANAGED_UID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountFilter {
    pub min_uid: u32,
    pub max_uid: Option<u32>,
}

impl Default for AccountFilter {
    fn default() -> Self {
        Self::from(&FilterConfig::default())
    }
}

impl From<&FilterConfig> for AccountFilter {
    fn from(config: &FilterConfig) -> Self {
        Self {
            min_uid: config.min_uid.max(MIN_MANAGED_UID),
            max_uid: config.max_uid,
        }
    }
}

impl AccountFilter {
    pub fn is_managed(&self, record: &AccountRecord) -> bool {
        self.contains(record.numeric_id)
    }

    pub fn contains(&self, uid: u32) -> bool {
        uid >= self.min_uid && self.max_uid.map_or(true, |max| uid <= max)
    }

    /// Оставить только управляемые аккаунты, сохранив порядок
    pub fn managed<'a>(&self, records: &'a [AccountRecord]) -> Vec<&'a AccountRecord> {
        records.iter().filter(|r| self.is_managed(r)).collect()
    }
}
