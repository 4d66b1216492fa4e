//! Cache subcommands.

use std::time::Duration;

use serde_json::Value;
use tracing::info;

use mnemo_config::Config;

use crate::cli::CacheAction;
use crate::components::open_cache;

/// JSON if `raw` parses as JSON, otherwise a JSON string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub(crate) async fn handle_cache_command(action: CacheAction, config: &Config) -> anyhow::Result<()> {
    let cache = open_cache(&config.cache).await?;
    info!("Cache backend: {}", cache.backend_name());

    match action {
        CacheAction::Set { key, value, ttl } => {
            let ttl = ttl.map(Duration::from_secs);
            cache.set(&key, &parse_value(&value), ttl).await?;
        }
        CacheAction::Get { key } => match cache.get::<Value>(&key).await? {
            Some(value) => println!("{}", value),
            None => info!("No live entry for {}", key),
        },
        CacheAction::Delete { key } => cache.delete(&key).await?,
        CacheAction::Clear => cache.clear().await?,
    }

    Ok(())
}
