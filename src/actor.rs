//! Acting user resolution.
//!
//! Resolution order:
//! 1) CLI --user (explicit)
//! 2) TODOSHARE_USER environment variable
//! 3) Persisted value in `<data-dir>/actor`
//! 4) Config default (`actor.default`)
//!
//! The resolved value is an email or a numeric user id; the caller looks it up.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// Environment variable naming the acting user
pub const USER_ENV: &str = "TODOSHARE_USER";

/// Resolve the acting user reference, failing when no source provides one.
pub fn resolve_actor(storage: &Storage, config: &Config, cli_user: Option<&str>) -> Result<String> {
    let env_user = std::env::var(USER_ENV).ok();
    resolve_actor_from(storage, config, cli_user, env_user.as_deref())
}

fn resolve_actor_from(
    storage: &Storage,
    config: &Config,
    cli_user: Option<&str>,
    env_user: Option<&str>,
) -> Result<String> {
    if let Some(actor) = non_empty(cli_user) {
        return Ok(actor.to_string());
    }

    if let Some(actor) = non_empty(env_user) {
        return Ok(actor.to_string());
    }

    if let Some(actor) = storage.read_actor()? {
        return Ok(actor);
    }

    if let Some(actor) = non_empty(config.actor.default.as_deref()) {
        return Ok(actor.to_string());
    }

    Err(Error::InvalidArgument(format!(
        "no acting user: pass --user, set {USER_ENV}, or run `todoshare actor set <email>`"
    )))
}

/// Persist the acting user for later invocations.
pub fn persist_actor(storage: &Storage, actor: &str) -> Result<()> {
    let actor = non_empty(Some(actor))
        .ok_or_else(|| Error::InvalidArgument("actor cannot be empty".to_string()))?;
    storage.write_actor(actor)
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
