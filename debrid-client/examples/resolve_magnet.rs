use std::sync::Arc;

use debrid_client::{CacheConfig, ClientOptions, DebridClient, MemoryCache};

/// Resolves a magnet link given on the command line.
///
/// DEBRID_API_TOKEN=... cargo run --example resolve_magnet -- 'magnet:?xt=urn:btih:...' [options.yaml]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let magnet = args.next().ok_or("usage: resolve_magnet <magnet> [options.yaml]")?;
    let options = match args.next() {
        Some(path) => ClientOptions::load(path)?,
        None => ClientOptions::default(),
    };
    let token = std::env::var("DEBRID_API_TOKEN")?;

    let client = DebridClient::new(
        options,
        Arc::new(MemoryCache::new(CacheConfig::default())),
        Arc::new(MemoryCache::new(CacheConfig::default())),
    )?;

    client.validate_token(&token).await?;
    println!("Token OK");

    if let Some(info_hash) = magnet
        .split('&')
        .find_map(|part| part.split("urn:btih:").nth(1))
    {
        let available = client.check_instant_availability(&token, &[info_hash]).await;
        println!("Instantly available: {}", !available.is_empty());
    }

    let url = client.get_stream_url(&magnet, &token, false).await?;
    println!("{url}");

    Ok(())
}
