// src/cli.rs

use crate::account_filter::AccountFilter;
use crate::account_store::AccountStore;
use crate::config::AppConfig;
use crate::directory_service::{SyncError, build_entries, run_once};
use crate::ldap::{LdapDirectory, ldif};
use crate::logging;
use crate::models::{DerivedName, SyncReport};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::sync::watch;
use tracing::warn;

/// Код выхода: есть записи, которые каталог отклонил
pub const EXIT_ENTRIES_FAILED: u8 = 1;
/// Код выхода: прогон не состоялся (конфиг, локальные базы, соединение)
pub const EXIT_FATAL: u8 = 2;

/// Точка входа CLI
pub async fn run_cli() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // .env может содержать LDAP_BIND_PASSWORD
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Command::InitConfig { path, force } = &cli.command {
        return handle_init_config(path, *force);
    }

    let mut config = AppConfig::discover(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    logging::init(&config.logging);

    match cli.command {
        Command::Sync { json } => handle_sync(&config, json).await,
        Command::Preview { output } => handle_preview(&config, output.as_deref()),
        Command::List { json } => handle_list(&config, json),
        Command::InitConfig { .. } => Ok(ExitCode::SUCCESS),
    }
}

// === CLI ===

#[derive(Parser)]
#[command(name = "posix-ldap-sync")]
#[command(author, version, about = "Синхронизация локальных аккаунтов в LDAP", long_about = None)]
struct Cli {
    /// Путь к config.yaml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Уровень логирования (перекрывает logging.level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Залить управляемые аккаунты в каталог (один прогон)
    Sync {
        /// Вывести отчёт в JSON
        #[arg(long)]
        json: bool,
    },
    /// Показать LDIF без обращения к каталогу
    Preview {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Список управляемых аккаунтов
    List {
        #[arg(long)]
        json: bool,
    },
    /// Записать конфиг по умолчанию
    InitConfig {
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

// === Программный запуск ===

/// Прочитать локальные базы, подключиться к каталогу и выполнить
/// один прогон. Ошибки баз и соединения фатальны; ошибки отдельных
/// записей — в отчёте.
pub async fn sync_once(
    config: &AppConfig,
    stop: Option<watch::Receiver<bool>>,
) -> Result<SyncReport, SyncError> {
    let store = AccountStore::open(&config.sources.passwd_path, &config.sources.shadow_path)?;
    let password = config.directory.resolve_bind_password()?;
    let mut client = LdapDirectory::connect(&config.directory, &password).await?;

    let report = run_once(config, &store, &mut client, stop).await;

    if let Err(e) = client.unbind().await {
        warn!(error = %e, "LDAP unbind failed");
    }
    Ok(report)
}

/// Код выхода по отчёту
pub fn exit_code(report: &SyncReport) -> ExitCode {
    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_ENTRIES_FAILED)
    }
}

// === Обработчики ===

async fn handle_sync(config: &AppConfig, json: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing current entry");
            let _ = tx.send(true);
        }
    });

    let report = sync_once(config, Some(rx)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_success() {
        println!("✅ Синхронизация завершена");
        print!("{}", report);
    } else {
        println!("⚠️ Синхронизация завершена с ошибками");
        print!("{}", report);
    }

    Ok(exit_code(&report))
}

fn handle_preview(config: &AppConfig, output: Option<&Path>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = AccountStore::open(&config.sources.passwd_path, &config.sources.shadow_path)?;
    let filter = AccountFilter::from(&config.filter);
    let (entries, skipped) = build_entries(&store, &filter, &config.mapping);
    let text = ldif::render_entries(&entries);

    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            eprintln!(
                "✅ LDIF записан: {} ({} записей, пропущено {})",
                path.display(),
                entries.len(),
                skipped
            );
        }
        None => print!("{}", text),
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
struct ListedAccount<'a> {
    login_name: &'a str,
    uid_number: u32,
    name: DerivedName,
    has_password: bool,
    locked: bool,
}

fn handle_list(config: &AppConfig, json: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let store = AccountStore::open(&config.sources.passwd_path, &config.sources.shadow_path)?;
    let filter = AccountFilter::from(&config.filter);

    let listed: Vec<ListedAccount> = filter
        .managed(store.read_accounts())
        .into_iter()
        .map(|account| ListedAccount {
            login_name: &account.login_name,
            uid_number: account.numeric_id,
            name: DerivedName::derive(&account.gecos, &account.login_name),
            has_password: account.credential_hash.is_some(),
            locked: account.credential_hash.as_ref().is_some_and(|h| h.is_locked()),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listed)?);
    } else {
        for a in &listed {
            let password = match (a.has_password, a.locked) {
                (false, _) => "нет пароля",
                (true, true) => "заблокирован",
                (true, false) => "пароль",
            };
            println!(
                "{} | {} | {} {} | {} | {}",
                a.login_name, a.uid_number, a.name.first_name, a.name.last_name, a.name.initials, password
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_init_config(path: &Path, force: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if path.exists() && !force {
        eprintln!("❌ Файл уже существует: {} (используйте --force)", path.display());
        return Ok(ExitCode::from(EXIT_FATAL));
    }
    AppConfig::default().save(path)?;
    println!("✅ Конфиг записан: {}", path.display());
    Ok(ExitCode::SUCCESS)
}
