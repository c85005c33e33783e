// src/lib.rs

//! Синхронизация локальных POSIX-аккаунтов в каталог LDAP.
//!
//! Цепочка: [`account_store`] читает passwd/shadow, [`account_filter`]
//! отбирает «человеческие» аккаунты, [`models`] выводит имена и строит
//! записи, [`directory_service`] заливает их в каталог через
//! [`directory_service::DirectoryClient`] (боевой клиент — [`ldap::LdapDirectory`]).

pub mod account_filter;
pub mod account_store;
pub mod cli;
pub mod config;
pub mod directory_service;
pub mod ldap;
pub mod logging;
pub mod models;

pub use account_filter::AccountFilter;
pub use account_store::{AccountStore, StoreReadError};
pub use config::AppConfig;
pub use directory_service::{DirectoryClient, DirectoryError, DirectorySync, SyncError, run_once};
pub use models::SyncReport;
