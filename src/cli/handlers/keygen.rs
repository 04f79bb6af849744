//! API key generation handler

use serde::Serialize;

use crate::config::AuthConfig;
use crate::security::generate_api_key;
use crate::security::generate_api_secret;
use crate::RagbotError;
use crate::Result;

#[derive(Serialize)]
struct AuthSection<'a> {
    auth: &'a AuthConfig,
}

/// Print a fresh key plus the config entries that accept it
pub fn handle_keygen() -> Result<()> {
    let key = generate_api_key();
    let auth = AuthConfig {
        write_secret: generate_api_secret(&key)?,
    };

    let toml = toml::to_string(&AuthSection { auth: &auth })
        .map_err(|e| RagbotError::Custom(format!("Failed to render secret: {e}")))?;
    let json = serde_json::to_string(&auth.write_secret)?;

    println!("🔑 API key (send as x-api-key, shown once):\n\n  {key}\n");
    println!("Add to config.toml:\n\n{toml}");
    println!("Or export:\n\n  RAGBOT_WRITE_API_SECRET='{json}'");
    Ok(())
}
