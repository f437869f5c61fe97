pub mod config;
pub mod error;
pub mod ingest;
pub mod permissions;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod utils;

pub use ingest::IngestService;
pub use server::Server;
