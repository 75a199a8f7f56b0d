use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::cache::CacheStore;
use crate::handler::handle_connection;
use crate::MAX_CONNECTIONS;

/// Accept loop. A permit is taken before each accept, so at most
/// [`MAX_CONNECTIONS`] connections are in flight at once and the rest
/// wait in the listener backlog instead of being turned away.
pub async fn serve(listener: TcpListener, cache: CacheStore) {
    let permits = Arc::new(Semaphore::new(MAX_CONNECTIONS));
    loop {
        let permit = permits
            .clone()
            .acquire_owned()
            .await
            .expect("connection semaphore is never closed");
        match listener.accept().await {
            Ok((stream, peer)) => {
                debug!("accepted connection from {peer}");
                let cache = cache.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, cache).await {
                        if err.is_parse() {
                            debug!("dropping connection: {err}");
                        } else {
                            error!("connection error: {err}");
                        }
                    }
                    drop(permit);
                });
            }
            Err(err) => {
                error!("accept failed: {err}");
            }
        }
    }
}
