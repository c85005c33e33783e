// src/models/password.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Схема хеша, которую понимает каталог (префикс `{...}` в userPassword)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    /// Хеш crypt(3) прямо из shadow: `$6$...`, `$y$...`, а также `!` / `*`
    Crypt,
}

impl PasswordScheme {
    pub fn tag(&self) -> &'static str {
        match self {
            PasswordScheme::Crypt => "{crypt}",
        }
    }
}

/// Хеш пароля со схемой
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String, // строка вроде "$6$salt$..."
    pub scheme: PasswordScheme,
}

impl PasswordHash {
    /// Хеш из shadow. Пустая строка хешем не считается.
    pub fn crypt(hash: impl Into<String>) -> Option<Self> {
        let hash = hash.into();
        if hash.is_empty() {
            return None;
        }
        Some(Self {
            hash,
            scheme: PasswordScheme::Crypt,
        })
    }

    /// Значение атрибута userPassword, например `{crypt}$6$...`
    pub fn tagged(&self) -> String {
        format!("{}{}", self.scheme.tag(), self.hash)
    }

    /// Аккаунт заблокирован на хосте (`!`, `*`, `!!`, `!$6$...`)
    pub fn is_locked(&self) -> bool {
        self.hash.starts_with('!') || self.hash == "*"
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tagged())
    }
}
