use tokio::net::TcpListener;
use tracing::info;

use packrat::{serve, CacheStore, MAX_CACHE_SIZE, MAX_ENTRY_AGE, MAX_OBJECT_SIZE};

fn usage() -> ! {
    eprintln!("usage: packrat <port>");
    std::process::exit(1);
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("packrat=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let port: u16 = match (args.next(), args.next()) {
        (Some(arg), None) => arg.parse().unwrap_or_else(|_| usage()),
        _ => usage(),
    };

    info!("packrat - caching forward proxy");
    info!("Listening on localhost:{}", port);
    info!("Cache budget: {} bytes", MAX_CACHE_SIZE);
    info!("Max cached object: {} bytes compressed", MAX_OBJECT_SIZE);
    info!("Entries swept after {}s", MAX_ENTRY_AGE);

    let cache = CacheStore::new();
    let listener = TcpListener::bind(("localhost", port)).await?;
    serve(listener, cache).await;
    Ok(())
}
