pub mod config;
pub mod datastore;
mod db;
mod junction;
pub mod migration;
mod projection;
mod query;
mod resources;
mod search;
pub mod store;

pub mod api {
    pub use agora_core::api::*;
}

pub mod models {
    pub use agora_core::models::*;
}

pub use agora_core::*;
pub use config::{AgoraConfig, DatabaseConfig, PoolConfig};
pub use datastore::{default_sqlite_path, load_or_init_config, open_store};
pub use db::JunctionKind;
pub use store::AgoraStore;
