// src/models/account.rs

use serde::{Deserialize, Serialize};
use crate::models::password::PasswordHash;

/// Системный аккаунт из файла passwd
///
/// Формат строки: `login:placeholder:uid:gid:gecos:home:shell`.
/// Запись неизменяема после чтения; хеш пароля подставляется из shadow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub login_name: String,
    pub numeric_id: u32,
    pub group_id: u32,
    pub gecos: String,
    pub credential_hash: Option<PasswordHash>,
    pub login_shell: String,
    pub home_directory: String,
}

/// Запись из файла shadow (только то, что нужно для синхронизации)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub login_name: String,
    /// `None`, если второе поле пустое
    pub hash: Option<String>,
}
