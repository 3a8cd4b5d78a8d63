//! Daybook vault engine entry point.
//!
//! Minimal binary wiring for the library: opens the vault, makes sure
//! today's note exists, and reports what the vault holds. The
//! presentation layer (menus, tabs) lives elsewhere and only consumes
//! the store's operations.

use daybook::vault::oplog::{parse_log_config, LogConfig, LogLevel, OpEvent, OpKind, OpLogger};
use daybook::vault::VaultStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let vault_root = std::env::var("DAYBOOK_VAULT").unwrap_or_else(|_| ".".to_string());

    eprintln!("[daybook] Starting with vault: {vault_root}");

    let log_config = load_log_config(&vault_root);
    let logger = OpLogger::new(log_config);

    // Best-effort cleanup of old log files (non-blocking)
    {
        let cleanup_logger = logger.clone();
        std::thread::spawn(move || cleanup_logger.cleanup_old_logs());
    }

    // Identify this run in the operation log
    let run_id = format!(
        "{}-{}",
        chrono::Local::now().format("%Y%m%d-%H%M%S"),
        &uuid::Uuid::new_v4().to_string()[..8]
    );

    let store = VaultStore::open(&vault_root)?.with_logger(logger.clone(), &run_id);

    let today = chrono::Local::now().date_naive();
    match store.create(today).await {
        Ok(doc) => {
            logger.log_and_stderr(
                &OpEvent::new(&run_id, OpKind::NoteCreate, LogLevel::Info)
                    .with_date(today)
                    .with_detail(&format!("{} body bytes", doc.body.len())),
                &format!("[daybook] Today's note ready: {}", doc.path.display()),
            );
        }
        Err(e) => {
            logger.log_and_stderr(
                &OpEvent::new(&run_id, OpKind::Error, LogLevel::Error)
                    .with_date(today)
                    .with_detail(&e.to_string()),
                &format!("[daybook] Could not prepare today's note: {e}"),
            );
            logger.flush();
            return Err(e.into());
        }
    }

    let dates = store.list().await?;
    eprintln!(
        "[daybook] Vault holds {} daily note(s), earliest {:?}",
        dates.len(),
        dates.first().map(|d| d.to_string())
    );

    // Flush any buffered log events before exiting
    logger.flush();

    Ok(())
}

/// Load the logging configuration from config.toml.
///
/// Checks the vault root first, then ~/.daybook/config.toml.
/// Returns defaults if no config file is found.
fn load_log_config(vault_root: &str) -> LogConfig {
    let vault_config = std::path::Path::new(vault_root).join("config.toml");
    if let Ok(content) = std::fs::read_to_string(&vault_config) {
        if let Ok(config) = parse_log_config(&content) {
            return config;
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let global_config = std::path::Path::new(&home)
            .join(".daybook")
            .join("config.toml");
        if let Ok(content) = std::fs::read_to_string(&global_config) {
            if let Ok(config) = parse_log_config(&content) {
                return config;
            }
        }
    }

    LogConfig::default()
}
