pub mod api;
pub mod error;
pub mod ids;
pub mod models;
pub mod query;
pub mod time;

pub use api::*;
pub use error::{AgoraError, AgoraResult};
pub use ids::*;
pub use models::*;
pub use query::*;
pub use time::*;
