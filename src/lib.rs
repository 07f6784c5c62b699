// tasktrack - Single-user task tracking with local key-value persistence

pub mod config;
pub mod error;
pub mod filter;
pub mod kv;
pub mod models;
pub mod record;
pub mod render;
pub mod shell;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use error::TaskError;
pub use filter::{ListQuery, StatusFilter};
pub use kv::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
pub use models::{Task, TaskDraft, TaskStatus};
pub use record::Record;
pub use store::TaskStore;
pub use view::{Action, Command, View, reduce};
