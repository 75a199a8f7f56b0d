use std::time::Duration;

pub mod cache;
pub mod compress;
pub mod error;
pub mod handler;
pub mod parser;
pub mod server;
pub mod upstream;

pub use cache::{unix_now, CacheEntry, CacheStore, InsertOutcome};
pub use error::ProxyError;
pub use handler::handle_connection;
pub use parser::{build_forwarded_headers, parse_request, Request};
pub use server::serve;

pub const DEFAULT_PORT: u16 = 80;
pub const MAX_OBJECT_SIZE: usize = 1_000_000; // per-entry compressed body cap
pub const MAX_CACHE_SIZE: usize = 5_000_000;  // total budget: url + body + timestamp per entry
pub const MAX_ENTRY_AGE: u64 = 3600;          // seconds before an entry is sweepable
pub const COMPRESSION_LEVEL: u32 = 9;         // zlib level; 0 stores bodies uncompressed
pub const MAX_CONNECTIONS: usize = 100;
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
