mod engine;
mod error;
mod types;

pub use engine::{BACKUP_PREFIX, Engine, Session, backup_path};
pub use error::{CoreError, CoreErrorCode};
pub use types::{ItemEntry, Snapshot, StatEntry};
