/// Cache walkthrough: insert, hit, age out, sweep.
///
/// Run with: cargo run --example cache_demo
use packrat::compress::{compress, decompress};
use packrat::{unix_now, CacheStore, InsertOutcome, MAX_ENTRY_AGE};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cache = CacheStore::new();
    let url = "http://example.com/index.html";
    let response = b"HTTP/1.0 200 OK\r\n\r\n<html><body>Hello</body></html>";

    let compressed = compress(response)?;
    println!(
        "storing {} bytes ({} compressed)",
        response.len(),
        compressed.len()
    );
    match cache.insert(url.to_string(), compressed, unix_now()).await {
        InsertOutcome::Inserted { free_space } => {
            println!("cached, {free_space} bytes of budget left");
        }
        other => println!("not cached: {other:?}"),
    }

    if let Some(entry) = cache.get(url).await {
        let body = decompress(&entry.body)?;
        println!("hit: {} bytes after inflate", body.len());
    }

    // backdate the entry past the age limit, then sweep
    let stale = compress(response)?;
    cache
        .insert(url.to_string(), stale, unix_now() - MAX_ENTRY_AGE - 1)
        .await;
    let removed = cache.evict_stale(unix_now()).await;
    println!(
        "sweep removed {removed} entries, {} left",
        cache.len().await
    );
    Ok(())
}
