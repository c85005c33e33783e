// src/config.rs

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Переменная окружения с паролем привязки (перекрывает файл)
pub const BIND_PASSWORD_ENV: &str = "LDAP_BIND_PASSWORD";

/// Нижняя граница uid, ниже которой аккаунты считаются системными
pub const MIN_MANAGED_UID: u32 = 1000;

const CONFIG_FILE_NAME: &str = "config.yaml";
const APP_DIR_NAME: &str = "posix-ldap-sync";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write config {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("no bind password: set directory.bind_password or LDAP_BIND_PASSWORD")]
    MissingBindPassword,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub mapping: MappingConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Пути к локальным базам аккаунтов
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourcesConfig {
    #[serde(default = "default_passwd_path")]
    pub passwd_path: PathBuf,
    #[serde(default = "default_shadow_path")]
    pub shadow_path: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            passwd_path: default_passwd_path(),
            shadow_path: default_shadow_path(),
        }
    }
}

fn default_passwd_path() -> PathBuf {
    PathBuf::from("/etc/passwd")
}

fn default_shadow_path() -> PathBuf {
    PathBuf::from("/etc/shadow")
}

/// Диапазон uid «человеческих» аккаунтов
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    #[serde(default = "default_min_uid")]
    pub min_uid: u32,
    /// `None` — без верхней границы
    #[serde(default = "default_max_uid")]
    pub max_uid: Option<u32>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_uid: default_min_uid(),
            max_uid: default_max_uid(),
        }
    }
}

fn default_min_uid() -> u32 { MIN_MANAGED_UID }
fn default_max_uid() -> Option<u32> { Some(9999) }

/// Значения, которые подставляются в каждую запись каталога
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingConfig {
    #[serde(default = "default_base_dn")]
    pub base_dn: String,
    #[serde(default = "default_mail_domain")]
    pub mail_domain: String,
    #[serde(default = "default_gid_number")]
    pub gid_number: u32,
    #[serde(default = "default_organization")]
    pub organization: String,
    #[serde(default = "default_postal_code")]
    pub postal_code: String,
    #[serde(default)]
    pub shadow: ShadowPolicy,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            base_dn: default_base_dn(),
            mail_domain: default_mail_domain(),
            gid_number: default_gid_number(),
            organization: default_organization(),
            postal_code: default_postal_code(),
            shadow: ShadowPolicy::default(),
        }
    }
}

fn default_base_dn() -> String {
    "ou=usuarios,dc=aso,dc=local".to_string()
}

fn default_mail_domain() -> String {
    "aso.local".to_string()
}

fn default_gid_number() -> u32 { 10000 }

fn default_organization() -> String {
    "aso".to_string()
}

fn default_postal_code() -> String {
    "29000".to_string()
}

/// Атрибуты shadow* — политика, а не данные аккаунта
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ShadowPolicy {
    /// -1 = аккаунт не истекает
    #[serde(default = "default_shadow_expire")]
    pub expire: i64,
    #[serde(default)]
    pub flag: i64,
    #[serde(default = "default_shadow_warning")]
    pub warning: i64,
    #[serde(default = "default_shadow_min")]
    pub min: i64,
    #[serde(default = "default_shadow_max")]
    pub max: i64,
    /// Дней с 1970-01-01
    #[serde(default = "default_shadow_last_change")]
    pub last_change: i64,
}

impl Default for ShadowPolicy {
    fn default() -> Self {
        Self {
            expire: default_shadow_expire(),
            flag: 0,
            warning: default_shadow_warning(),
            min: default_shadow_min(),
            max: default_shadow_max(),
            last_change: default_shadow_last_change(),
        }
    }
}

fn default_shadow_expire() -> i64 { -1 }
fn default_shadow_warning() -> i64 { 7 }
fn default_shadow_min() -> i64 { 8 }
fn default_shadow_max() -> i64 { 999999 }
fn default_shadow_last_change() -> i64 { 10877 }

/// Подключение к каталогу
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_bind_dn")]
    pub bind_dn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,
    #[serde(default)]
    pub starttls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            bind_dn: default_bind_dn(),
            bind_password: None,
            starttls: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_url() -> String {
    "ldap://localhost:389".to_string()
}

fn default_bind_dn() -> String {
    "cn=admin,dc=aso,dc=local".to_string()
}

fn default_timeout_secs() -> u64 { 10 }

impl DirectoryConfig {
    /// Пароль привязки: переменная окружения важнее файла
    pub fn resolve_bind_password(&self) -> Result<String, ConfigError> {
        if let Ok(password) = std::env::var(BIND_PASSWORD_ENV) {
            if !password.is_empty() {
                return Ok(password);
            }
        }
        self.bind_password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingBindPassword)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub enable_json_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_json_output: false,
        }
    }
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Явный путь, затем ./config.yaml, затем каталог конфигурации
    /// пользователя; если ничего нет — значения по умолчанию.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_locations().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
        }
        paths
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mapping.base_dn.trim().is_empty() {
            return Err(ConfigError::Invalid("mapping.base_dn is empty".to_string()));
        }
        if self.mapping.mail_domain.trim().is_empty() {
            return Err(ConfigError::Invalid("mapping.mail_domain is empty".to_string()));
        }
        if self.filter.min_uid < MIN_MANAGED_UID {
            return Err(ConfigError::Invalid(format!(
                "filter.min_uid ({}) is below {}: system accounts must not be synced",
                self.filter.min_uid, MIN_MANAGED_UID
            )));
        }
        if let Some(max) = self.filter.max_uid {
            if self.filter.min_uid > max {
                return Err(ConfigError::Invalid(format!(
                    "filter.min_uid ({}) is greater than filter.max_uid ({})",
                    self.filter.min_uid, max
                )));
            }
        }
        let url = self.directory.url.as_str();
        if !["ldap://", "ldaps://", "ldapi://"].iter().any(|s| url.starts_with(s)) {
            return Err(ConfigError::Invalid(format!("directory.url is not an LDAP URL: {}", url)));
        }
        Ok(())
    }
}
