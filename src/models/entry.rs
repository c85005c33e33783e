// src/models/entry.rs

use serde::{Deserialize, Serialize};
use crate::config::MappingConfig;
use crate::models::account::AccountRecord;
use crate::models::name::DerivedName;
use crate::models::password::PasswordHash;

/// Классы объекта для каждого синхронизируемого аккаунта
pub const OBJECT_CLASSES: [&str; 3] = ["inetOrgPerson", "posixAccount", "shadowAccount"];

/// Запись каталога, готовая к отправке
///
/// Атрибуты хранятся в порядке добавления: так LDIF совпадает с тем,
/// что ожидает администратор, и тесты могут сравнивать порядок.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attributes: Vec<(String, Vec<String>)>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: vec![],
        }
    }

    /// Добавить атрибут с одним значением
    pub fn push(&mut self, name: &str, value: impl ToString) {
        self.push_all(name, vec![value.to_string()]);
    }

    /// Добавить атрибут с несколькими значениями
    pub fn push_all(&mut self, name: &str, values: Vec<String>) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => existing.extend(values),
            None => self.attributes.push((name.to_string(), values)),
        }
    }

    /// Все значения атрибута (пустой срез, если атрибута нет)
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// Первое значение атрибута
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }

    /// Логин (значение uid)
    pub fn uid(&self) -> &str {
        self.first("uid").unwrap_or_default()
    }
}

/// DN аккаунта: `uid=<login>,<base_dn>`
pub fn account_dn(login_name: &str, base_dn: &str) -> String {
    format!("uid={},{}", escape_dn_value(login_name), base_dn)
}

/// Экранирование значения RDN (RFC 4514)
fn escape_dn_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, ch) in value.chars().enumerate() {
        let special = matches!(ch, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=')
            || (i == 0 && (ch == ' ' || ch == '#'))
            || (i == last && ch == ' ');
        if ch == '\0' {
            out.push_str("\\00");
            continue;
        }
        if special {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Построить запись каталога из аккаунта.
///
/// userPassword добавляется только при наличии хеша.
pub fn map_entry(
    account: &AccountRecord,
    credential: Option<&PasswordHash>,
    derived: &DerivedName,
    mapping: &MappingConfig,
) -> DirectoryEntry {
    let login = account.login_name.as_str();
    let mut entry = DirectoryEntry::new(account_dn(login, &mapping.base_dn));

    entry.push_all(
        "objectClass",
        OBJECT_CLASSES.iter().map(|c| c.to_string()).collect(),
    );
    entry.push("uid", login);
    entry.push("sn", &derived.last_name);
    entry.push("givenName", &derived.first_name);
    entry.push("cn", &derived.full_name);
    entry.push("displayName", &derived.full_name);
    entry.push("uidNumber", account.numeric_id);
    entry.push("gidNumber", mapping.gid_number);

    if let Some(hash) = credential {
        entry.push("userPassword", hash);
    }

    entry.push("gecos", &derived.full_name);
    entry.push("loginShell", &account.login_shell);
    entry.push("homeDirectory", &account.home_directory);

    let shadow = &mapping.shadow;
    entry.push("shadowExpire", shadow.expire);
    entry.push("shadowFlag", shadow.flag);
    entry.push("shadowWarning", shadow.warning);
    entry.push("shadowMin", shadow.min);
    entry.push("shadowMax", shadow.max);
    entry.push("shadowLastChange", shadow.last_change);

    entry.push("mail", format!("{}@{}", login, mapping.mail_domain));
    entry.push("postalCode", &mapping.postal_code);
    entry.push("o", &mapping.organization);
    entry.push("initials", &derived.initials);

    entry
}
