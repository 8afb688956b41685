use std::collections::HashMap;

use crate::{Error, Result};

pub(crate) const SERVICE_NAME: &str = "ventboard-sync";

const API_KEY_KIND: &str = "store-api-key";
const CREDENTIALS_KIND: &str = "identity-credentials";

fn keyring_err(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Keyring(format!("{}: {}", context, e))
}

async fn open() -> Result<oo7::Keyring> {
    oo7::Keyring::new()
        .await
        .map_err(|e| keyring_err("Failed to connect to keyring", e))
}

fn attributes<'a>(server: &'a str, kind: &'a str) -> HashMap<&'a str, &'a str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", server);
    attrs.insert("kind", kind);
    attrs
}

async fn store_secret(label: &str, server: &str, kind: &str, secret: &[u8]) -> Result<()> {
    let keyring = open().await?;
    keyring
        .create_item(label, &attributes(server, kind), secret, true)
        .await
        .map_err(|e| keyring_err("Failed to store secret", e))?;
    Ok(())
}

async fn load_secret(server: &str, kind: &str) -> Result<Option<String>> {
    let keyring = open().await?;
    let items = keyring
        .search_items(&attributes(server, kind))
        .await
        .map_err(|e| keyring_err("Failed to search keyring", e))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| keyring_err("Failed to read secret", e))?;
        let secret = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| keyring_err("Invalid UTF-8 in secret", e))?;
        if !secret.is_empty() {
            return Ok(Some(secret));
        }
    }
    Ok(None)
}

/// Store identity-provider credentials for `server`.
pub async fn store_credentials(server: &str, username: &str, password: &str) -> Result<()> {
    let secret = format!("{}:{}", username, password);
    store_secret(
        &format!("Ventboard sign-in ({})", server),
        server,
        CREDENTIALS_KIND,
        secret.as_bytes(),
    )
    .await
}

/// Load identity-provider credentials. Returns (username, password) if found.
pub async fn load_credentials(server: &str) -> Result<Option<(String, String)>> {
    let secret = load_secret(server, CREDENTIALS_KIND).await?;
    Ok(secret.and_then(|s| {
        s.split_once(':')
            .map(|(u, p)| (u.to_string(), p.to_string()))
    }))
}

/// Store the document-store API key for `server`.
pub async fn store_api_key(server: &str, key: &str) -> Result<()> {
    store_secret(
        &format!("Ventboard store key ({})", server),
        server,
        API_KEY_KIND,
        key.as_bytes(),
    )
    .await
}

pub async fn load_api_key(server: &str) -> Result<Option<String>> {
    load_secret(server, API_KEY_KIND).await
}

/// Delete every secret stored for `server`.
pub async fn delete_secrets(server: &str) -> Result<()> {
    let keyring = open().await?;
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", server);

    let items = keyring
        .search_items(&attrs)
        .await
        .map_err(|e| keyring_err("Failed to search keyring", e))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| keyring_err("Failed to delete secret", e))?;
    }
    Ok(())
}
