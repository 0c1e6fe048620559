mod ping_server;

pub use ping_server::{resolve_hostname, router, serve, PingServer, PingState, PING_PATH};
