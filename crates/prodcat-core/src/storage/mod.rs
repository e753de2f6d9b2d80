//! Storage layer.
//!
//! A sled-backed store for categories, product templates, and the links
//! between them, with staged template transactions.

mod config;
mod engine;
mod record;
mod transaction;

pub mod key;

pub use config::StorageConfig;
pub use engine::Store;
pub use key::{current_timestamp, decode_u64, LinkKey};
pub use record::TemplateRecord;
pub use transaction::{TemplateOp, Transaction};

pub(crate) use record::aligned;
