// src/ldap/mod.rs

pub mod ldif;

use crate::config::DirectoryConfig;
use crate::directory_service::{DirectoryClient, DirectoryError, RC_ALREADY_EXISTS};
use crate::models::DirectoryEntry;
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// LDAP result code invalidCredentials
pub const RC_INVALID_CREDENTIALS: u32 = 49;

/// Клиент LDAP поверх ldap3
pub struct LdapDirectory {
    ldap: Ldap,
    url: String,
}

impl LdapDirectory {
    /// Подключиться и выполнить simple bind
    pub async fn connect(config: &DirectoryConfig, bind_password: &str) -> Result<Self, DirectoryError> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(Duration::from_secs(config.timeout_secs))
            .set_starttls(config.starttls);

        debug!(url = %config.url, "Connecting to LDAP server");
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &config.url)
            .await
            .map_err(|e| DirectoryError::Connection(format!("{}: {}", config.url, e)))?;

        // Драйвер соединения живёт в фоне, пока жив `ldap`
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                warn!(error = %e, "LDAP connection driver error");
            }
        });

        let result = ldap
            .simple_bind(&config.bind_dn, bind_password)
            .await
            .map_err(|e| DirectoryError::Connection(format!("bind as {}: {}", config.bind_dn, e)))?;

        bind_outcome(result.rc, &result.text, &config.bind_dn)?;

        info!(url = %config.url, bind_dn = %config.bind_dn, "LDAP bind successful");
        Ok(Self {
            ldap,
            url: config.url.clone(),
        })
    }

    /// Закрыть соединение
    pub async fn unbind(mut self) -> Result<(), DirectoryError> {
        self.ldap
            .unbind()
            .await
            .map_err(|e| DirectoryError::Connection(format!("{}: {}", self.url, e)))
    }
}

/// Итог simple bind по коду результата LDAP
pub fn bind_outcome(rc: u32, text: &str, bind_dn: &str) -> Result<(), DirectoryError> {
    match rc {
        0 => Ok(()),
        RC_INVALID_CREDENTIALS => Err(DirectoryError::Rejected {
            code: rc,
            message: format!("invalid credentials for {}", bind_dn),
        }),
        code => Err(DirectoryError::Rejected {
            code,
            message: format!("bind as {} failed: {}", bind_dn, text),
        }),
    }
}

/// Итог add по коду результата LDAP: 68 — запись уже есть
pub fn add_outcome(rc: u32, text: String, dn: &str) -> Result<(), DirectoryError> {
    match rc {
        0 => Ok(()),
        RC_ALREADY_EXISTS => Err(DirectoryError::AlreadyExists(dn.to_string())),
        code => Err(DirectoryError::Rejected { code, message: text }),
    }
}

/// Атрибуты записи в виде, который принимает `Ldap::add`
fn to_add_attrs(entry: &DirectoryEntry) -> Vec<(&str, HashSet<&str>)> {
    entry
        .attributes
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(name, values)| (name.as_str(), values.iter().map(String::as_str).collect()))
        .collect()
}

#[async_trait]
impl DirectoryClient for LdapDirectory {
    async fn add(&mut self, entry: &DirectoryEntry) -> Result<(), DirectoryError> {
        let result = self
            .ldap
            .add(&entry.dn, to_add_attrs(entry))
            .await
            .map_err(|e| DirectoryError::Connection(e.to_string()))?;

        add_outcome(result.rc, result.text, &entry.dn)
    }
}
