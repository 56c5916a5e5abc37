pub mod config;
pub mod error;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod storage;

pub use error::KunyuError;
pub use models::ResourceKind;
