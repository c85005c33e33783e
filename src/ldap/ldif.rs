// src/ldap/ldif.rs

use crate::models::DirectoryEntry;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// SAFE-STRING по RFC 2849: ASCII без NUL/CR/LF, не начинается с
/// пробела, `:` или `<`, не заканчивается пробелом
fn is_safe_string(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if value.starts_with([' ', ':', '<']) || value.ends_with(' ') {
        return false;
    }
    value.bytes().all(|b| b.is_ascii() && b != 0 && b != b'\n' && b != b'\r')
}

/// Одна строка `attr: value` (или `attr:: base64`)
fn render_line(out: &mut String, name: &str, value: &str) {
    if is_safe_string(value) {
        out.push_str(&format!("{}: {}\n", name, value));
    } else {
        out.push_str(&format!("{}:: {}\n", name, STANDARD.encode(value.as_bytes())));
    }
}

/// Запись в LDIF, атрибуты в порядке построения
pub fn render_entry(entry: &DirectoryEntry) -> String {
    let mut out = String::new();
    render_line(&mut out, "dn", &entry.dn);
    for (name, values) in &entry.attributes {
        for value in values {
            render_line(&mut out, name, value);
        }
    }
    out
}

/// Несколько записей через пустую строку
pub fn render_entries(entries: &[DirectoryEntry]) -> String {
    entries
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n")
}
