// src/models/name.rs

use serde::{Deserialize, Serialize};

/// Имя, выведенное из поля GECOS
///
/// Живёт только между разбором аккаунта и построением записи каталога.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DerivedName {
    /// Полное имя (cn, displayName, gecos)
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    /// Два символа: первый символ имени + первый символ фамилии
    pub initials: String,
}

impl DerivedName {
    /// Разобрать GECOS.
    ///
    /// 1. Берётся всё до первой запятой (дальше идут кабинет, телефоны).
    /// 2. Пробелы по краям срезаются; пустое имя заменяется логином.
    /// 3. Первое слово — имя, второе — фамилия; недостающее заменяется логином.
    ///    Слова разделяются любой последовательностью пробельных символов.
    /// 4. Инициалы — первые символы имени и фамилии, регистр не меняется.
    ///
    /// Функция тотальна: имя и фамилия никогда не пустые, если логин не пуст.
    pub fn derive(gecos: &str, login_name: &str) -> Self {
        let head = gecos.split(',').next().unwrap_or_default().trim();
        let full_name = if head.is_empty() { login_name } else { head };

        let mut words = full_name.split_whitespace();
        let first_name = words.next().unwrap_or(login_name).to_string();
        let last_name = words.next().unwrap_or(login_name).to_string();

        let initials = first_name
            .chars()
            .take(1)
            .chain(last_name.chars().take(1))
            .collect();

        Self {
            full_name: full_name.to_string(),
            first_name,
            last_name,
            initials,
        }
    }
}

/// Синоним для [`DerivedName::derive`]
pub fn derive_name(gecos: &str, login_name: &str) -> DerivedName {
    DerivedName::derive(gecos, login_name)
}
