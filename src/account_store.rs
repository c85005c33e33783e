// src/account_store.rs

use crate::models::{AccountRecord, CredentialRecord, PasswordHash};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Локальная база аккаунтов недоступна. Прогон прерывается до любых
/// обращений к каталогу.
#[derive(Debug, thiserror::Error)]
#[error("cannot read account store {}: {source}", .path.display())]
pub struct StoreReadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Аккаунты из passwd с уже подставленными хешами из shadow
///
/// Оба файла читаются целиком при открытии, дальше работа идёт в памяти.
#[derive(Debug, Clone, Default)]
pub struct AccountStore {
    accounts: Vec<AccountRecord>,
    credentials: Vec<CredentialRecord>,
}

impl AccountStore {
    /// Прочитать passwd и shadow с диска
    pub fn open<P: AsRef<Path>, S: AsRef<Path>>(passwd: P, shadow: S) -> Result<Self, StoreReadError> {
        let passwd = read_file(passwd.as_ref())?;
        let shadow = read_file(shadow.as_ref())?;
        Ok(Self::parse(&passwd, &shadow))
    }

    /// Разобрать содержимое файлов, уже прочитанных в память
    pub fn parse(passwd: &str, shadow: &str) -> Self {
        let mut store = Self {
            accounts: parse_passwd(passwd),
            credentials: parse_shadow(shadow),
        };
        let hashes: Vec<Option<PasswordHash>> = store
            .accounts
            .iter()
            .map(|account| store.read_credential(&account.login_name))
            .collect();
        for (account, hash) in store.accounts.iter_mut().zip(hashes) {
            account.credential_hash = hash;
        }
        debug!(
            accounts = store.accounts.len(),
            credentials = store.credentials.len(),
            "Account store loaded"
        );
        store
    }

    /// Все аккаунты в порядке файла
    pub fn read_accounts(&self) -> &[AccountRecord] {
        &self.accounts
    }

    /// Хеш пароля по точному совпадению логина.
    /// Нет строки или пустое второе поле — `None`, это не ошибка.
    pub fn read_credential(&self, login_name: &str) -> Option<PasswordHash> {
        self.credentials
            .iter()
            .find(|c| c.login_name == login_name)
            .and_then(|c| c.hash.clone())
            .and_then(PasswordHash::crypt)
    }
}

fn read_file(path: &Path) -> Result<String, StoreReadError> {
    fs::read_to_string(path).map_err(|source| StoreReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn is_ignored(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

/// Разобрать passwd. Битые строки пропускаются с предупреждением.
pub fn parse_passwd(content: &str) -> Vec<AccountRecord> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !is_ignored(line))
        .filter_map(|(i, line)| match parse_passwd_line(line) {
            Some(record) => Some(record),
            None => {
                warn!(line = i + 1, "Skipping malformed passwd line");
                None
            }
        })
        .collect()
}

/// `login:placeholder:uid:gid:gecos:home:shell`
pub fn parse_passwd_line(line: &str) -> Option<AccountRecord> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() < 7 || fields[0].is_empty() {
        return None;
    }
    Some(AccountRecord {
        login_name: fields[0].to_string(),
        numeric_id: fields[2].trim().parse().ok()?,
        group_id: fields[3].trim().parse().ok()?,
        gecos: fields[4].to_string(),
        credential_hash: None,
        home_directory: fields[5].to_string(),
        login_shell: fields[6].to_string(),
    })
}

/// Разобрать shadow: логин и второе поле
pub fn parse_shadow(content: &str) -> Vec<CredentialRecord> {
    content
        .lines()
        .filter(|line| !is_ignored(line))
        .filter_map(parse_shadow_line)
        .collect()
}

pub fn parse_shadow_line(line: &str) -> Option<CredentialRecord> {
    let mut fields = line.split(':');
    let login_name = fields.next().filter(|l| !l.is_empty())?;
    let hash = fields.next().filter(|h| !h.is_empty()).map(str::to_string);
    Some(CredentialRecord {
        login_name: login_name.to_string(),
        hash,
    })
}
