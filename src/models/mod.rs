// src/models/mod.rs

pub mod account;
pub mod name;
pub mod entry;
pub mod password;
pub mod report;

// Re-exports

pub use account::{AccountRecord, CredentialRecord};
pub use name::{DerivedName, derive_name};
pub use entry::{DirectoryEntry, account_dn, map_entry, OBJECT_CLASSES};
pub use password::{PasswordHash, PasswordScheme};
pub use report::{EntryOutcome, SyncFailure, SyncReport};
