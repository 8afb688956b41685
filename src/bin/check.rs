use std::time::Duration;

use ventboard::config::AppConfig;
use ventboard::sync::{HttpDocumentStore, HttpIntelligence, SessionCache, keyring};

const SAMPLE_TODO: &str = "call mom";
const SAMPLE_CHAT: &str = "remind me to water the plants";

fn prompt(label: &str) -> String {
    use std::io::Write;
    print!("{}: ", label);
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
    line.trim().to_string()
}

/// Handle the secret-management flags. Returns true if one was given.
async fn manage_secrets(config: &AppConfig) -> bool {
    let args: Vec<String> = std::env::args().collect();
    let p = &config.persistence;
    let auth_server = p.auth_url.trim().trim_end_matches('/');

    if args.iter().any(|a| a == "--store-credentials") {
        let username = prompt("Username");
        let password = prompt("Password");
        match keyring::store_credentials(auth_server, &username, &password).await {
            Ok(()) => println!("Stored credentials for {}", auth_server),
            Err(e) => println!("Failed: {}", e),
        }
    } else if args.iter().any(|a| a == "--store-api-key") {
        let key = prompt("Store API key");
        match keyring::store_api_key(&p.store_url, &key).await {
            Ok(()) => println!("Stored API key for {}", p.store_url),
            Err(e) => println!("Failed: {}", e),
        }
    } else if args.iter().any(|a| a == "--forget") {
        for server in [auth_server, p.store_url.as_str()] {
            match keyring::delete_secrets(server).await {
                Ok(()) => println!("Removed secrets for {}", server),
                Err(e) => println!("Failed for {}: {}", server, e),
            }
        }
    } else {
        return false;
    }
    true
}

#[tokio::main]
async fn main() {
    if let Ok(journal) = systemd_journal_logger::JournalLog::new() {
        let _ = journal
            .with_syslog_identifier("ventboard-check".to_string())
            .install();
    }
    log::set_max_level(log::LevelFilter::Info);

    let config = AppConfig::load();
    if manage_secrets(&config).await {
        return;
    }

    println!("=== Ventboard service check ===\n");
    println!("Config: {}", AppConfig::default_path().display());

    // Task-intelligence service
    println!("\n--- API: {} ---", config.api_base_url);
    let client = match HttpIntelligence::new(
        &config.api_base_url,
        Duration::from_secs(config.request_timeout_secs),
    ) {
        Ok(c) => c,
        Err(e) => {
            println!("  Client error: {}", e);
            return;
        }
    };

    match client.label_todo(SAMPLE_TODO).await {
        Ok(label) => println!("  /label \"{}\" -> {}", SAMPLE_TODO, label),
        Err(e) => println!("  /label failed: {}", e),
    }

    match client.send_chat(SAMPLE_CHAT).await {
        Ok(reply) => {
            println!("  /chat -> {}", reply.response_text);
            match reply.extracted_todo {
                Some(todo) => println!(
                    "  extracted: {} [{}]",
                    todo,
                    reply.label.as_deref().unwrap_or("no label")
                ),
                None => println!("  extracted: nothing"),
            }
        }
        Err(e) => println!("  /chat failed: {}", e),
    }

    // Persistence
    let p = &config.persistence;
    if !config.persistence_enabled() {
        println!("\nPersistence disabled.");
        println!("\n=== Done ===");
        return;
    }

    println!("\n--- Identity: {} ---", p.auth_url);
    match keyring::load_credentials(p.auth_url.trim().trim_end_matches('/')).await {
        Ok(Some((user, _))) => println!("  Credentials for {}", user),
        Ok(None) => println!("  No credentials found"),
        Err(e) => println!("  Keyring error: {}", e),
    }

    let session = SessionCache::new(config.session_path());
    let cached = session.load();
    match &cached {
        Some(identity) => println!("  Cached session: {}", identity.display_name()),
        None => println!("  No cached session ({})", session.path().display()),
    }

    println!("\n--- Store: {} ---", p.store_url);
    let api_key = keyring::load_api_key(&p.store_url).await.unwrap_or_else(|e| {
        println!("  Keyring error: {}", e);
        None
    });
    if api_key.is_none() {
        println!("  No API key, requests are unauthenticated");
    }
    let store = match HttpDocumentStore::new(&p.store_url, &p.collection) {
        Ok(s) => s.with_api_key(api_key),
        Err(e) => {
            println!("  Store error: {}", e);
            return;
        }
    };

    if let Some(identity) = cached {
        use ventboard::sync::DocumentStore;
        println!("  Document: {}", store.document_url(&identity.uid));
        match store.load_todos(&identity.uid).await {
            Ok(Some(todos)) => {
                let done = todos.iter().filter(|t| t.completed).count();
                println!("  Stored: {} todos ({} completed)", todos.len(), done);
            }
            Ok(None) => println!("  No document yet"),
            Err(e) => println!("  Error reading document: {}", e),
        }
    }

    println!("\n=== Done ===");
}
