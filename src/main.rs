use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use uuid::Uuid;

mod command;
mod view;

use ventboard::application::Board;
use ventboard::config::AppConfig;
use ventboard::runtime::Runtime;
use ventboard::sync::{
    self, HttpDocumentStore, HttpIdentityProvider, HttpIntelligence, PersistenceBridge,
    SessionCache,
};

use command::Command;

struct Flags {
    debug: bool,
    offline: bool,
    login: bool,
}

fn parse_flags() -> Flags {
    let args: Vec<String> = std::env::args().collect();
    Flags {
        debug: args.iter().any(|a| a == "--debug"),
        offline: args.iter().any(|a| a == "--offline"),
        login: args.iter().any(|a| a == "--login"),
    }
}

fn init_logging(config: &AppConfig) {
    // Wrapper filters: ventboard targets at info/debug (per config), everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("ventboard") {
                let max = if ventboard::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    ventboard::set_debug_logging(config.debug_logging);

    // Logs go to the systemd user journal (`journalctl --user -t ventboard -f`).
    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(j) => j.with_syslog_identifier("ventboard".to_string()),
        Err(e) => {
            eprintln!("journal unavailable, logging disabled: {}", e);
            return;
        }
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

async fn build_bridge(config: &AppConfig) -> Option<Arc<PersistenceBridge>> {
    if !config.persistence_enabled() {
        return None;
    }
    let p = &config.persistence;
    let provider = match HttpIdentityProvider::new(&p.auth_url) {
        Ok(provider) => provider,
        Err(e) => {
            log::error!("Identity provider unavailable: {}", e);
            return None;
        }
    };
    let api_key = match sync::keyring::load_api_key(&p.store_url).await {
        Ok(key) => key,
        Err(e) => {
            log::warn!("No store API key: {}", e);
            None
        }
    };
    let store = match HttpDocumentStore::new(&p.store_url, &p.collection) {
        Ok(store) => store.with_api_key(api_key),
        Err(e) => {
            log::error!("Document store unavailable: {}", e);
            return None;
        }
    };
    Some(Arc::new(PersistenceBridge::new(
        Arc::new(provider),
        Arc::new(store),
        SessionCache::new(config.session_path()),
    )))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let flags = parse_flags();
    let mut config = AppConfig::load();
    if flags.debug {
        config.debug_logging = true;
    }
    if flags.offline {
        config.persistence.enabled = false;
    }
    init_logging(&config);
    log::info!("Starting with API at {}", config.api_base_url);

    let intelligence = HttpIntelligence::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let bridge = build_bridge(&config).await;
    let mut runtime = Runtime::new(
        Board::new(bridge.is_some()),
        Arc::new(intelligence),
        bridge,
        Duration::from_millis(config.persistence.sync_debounce_ms),
    );
    runtime.restore_session();

    let (tx, rx) = mpsc::unbounded_channel();
    if flags.login {
        let _ = tx.send(ventboard::message::Message::SignIn);
    }

    // Ids of the to-dos as last rendered, so `/done n` hits what the user saw.
    let visible: Arc<Mutex<Vec<Uuid>>> = Arc::default();

    let reader_visible = visible.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let Some(cmd) = command::parse(&line) else {
                continue;
            };
            match cmd {
                Command::Quit => break,
                Command::Help => println!("{}", command::HELP),
                Command::Unknown(ref raw) => println!("unknown command: {} (try /help)", raw),
                cmd => {
                    let ids = reader_visible.lock().map(|v| v.clone()).unwrap_or_default();
                    for message in command::to_messages(cmd, &ids) {
                        if tx.send(message).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    });

    println!("{}", command::HELP);
    let mut last_frame = String::new();
    runtime
        .run(rx, |board| {
            if let Ok(mut ids) = visible.lock() {
                *ids = board.todos().items().iter().map(|t| t.id).collect();
            }
            let frame = view::render(board);
            if frame != last_frame {
                println!("\n{}", frame);
                last_frame = frame;
            }
        })
        .await;

    Ok(())
}
