use std::fs;
use std::path::{Path, PathBuf};

use crate::encoding::CodecOptions;
use crate::item::Item;
use crate::stash::{Stash, StashSummary};

use super::error::{CoreError, CoreErrorCode};
use super::types::{ItemEntry, Snapshot, StatEntry};

/// Prefix of the backup file kept next to a stash saved in place.
pub const BACKUP_PREFIX: &str = "_";

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine {
    options: CodecOptions,
}

/// A decoded stash plus the options it was decoded with, which are reused
/// when it is written back out.
#[derive(Debug)]
pub struct Session {
    options: CodecOptions,
    stash: Stash,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CodecOptions) -> Self {
        Self { options }
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        let stash = Stash::decode_bytes(bytes.as_ref(), &self.options).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to parse stash: {e}"),
            )
        })?;
        Ok(Session {
            options: self.options,
            stash,
        })
    }

    pub fn open_path<P: AsRef<Path>>(&self, path: P) -> Result<Session, CoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        tracing::debug!(path = %path.display(), len = bytes.len(), "read stash file");
        self.open_bytes(bytes)
    }
}

impl Session {
    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    pub fn stash_mut(&mut self) -> &mut Stash {
        &mut self.stash
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            header: self.stash.header,
            version: self.stash.version,
            declared_size: self.stash.declared_size,
            item_count: self.stash.items.len(),
            live_item_count: self.stash.live_items().len(),
        }
    }

    /// Live items, numbered from 1.
    pub fn items(&self) -> Vec<ItemEntry> {
        self.item_entries(self.stash.live_items().len())
    }

    /// Every item in the body, including those past the declared size.
    pub fn all_items(&self) -> Vec<ItemEntry> {
        self.item_entries(self.stash.items.len())
    }

    fn item_entries(&self, count: usize) -> Vec<ItemEntry> {
        let live = self.stash.live_items().len();
        self.stash
            .items
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, item)| ItemEntry {
                index: i + 1,
                name: item.display_name().map(ToString::to_string),
                live: i < live,
                stat_count: item.stats.len(),
            })
            .collect()
    }

    pub fn item(&self, index: usize) -> Result<&Item, CoreError> {
        let count = self.stash.items.len();
        index
            .checked_sub(1)
            .and_then(|i| self.stash.items.get(i))
            .ok_or_else(|| item_not_found(index, count))
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut Item, CoreError> {
        let count = self.stash.items.len();
        index
            .checked_sub(1)
            .and_then(|i| self.stash.items.get_mut(i))
            .ok_or_else(|| item_not_found(index, count))
    }

    /// Stats of item `index` in name order.
    pub fn item_stats(&self, index: usize) -> Result<Vec<StatEntry>, CoreError> {
        Ok(self
            .item(index)?
            .sorted_stats()
            .into_iter()
            .map(|stat| StatEntry {
                name: stat.name.clone(),
                kind: stat.kind.to_string(),
                value: stat.value.clone(),
            })
            .collect())
    }

    /// Parses `input` per the stat's kind and stores it. The model is left
    /// untouched when the input is rejected.
    pub fn set_stat_value(
        &mut self,
        index: usize,
        name: &str,
        input: &str,
    ) -> Result<(), CoreError> {
        let options = self.options;
        let item = self.item_mut(index)?;
        let stat = item.stat_mut(name).ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::NotFound,
                format!("item {index} has no stat named {name:?}"),
            )
        })?;
        stat.set_value(input, &options)
            .map_err(|e| CoreError::new(CoreErrorCode::InvalidValue, e.to_string()))?;
        tracing::debug!(index, stat = name, value = input, "updated stat");
        Ok(())
    }

    pub fn set_declared_size(&mut self, size: usize) {
        self.stash.set_declared_size(size);
    }

    pub fn summary(&self) -> StashSummary {
        self.stash.summary()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        self.stash.to_bytes(&self.options).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Encode,
                format!("failed to encode stash: {e}"),
            )
        })
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), CoreError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|e| io_error("write", path, e))
    }

    /// Moves the existing file at `path` to its backup name, then writes the
    /// current stash to `path`. Returns the backup path when a file was moved.
    ///
    /// Not atomic: a failed write can leave `path` truncated, with the
    /// previous contents still in the backup.
    pub fn save_in_place<P: AsRef<Path>>(&self, path: P) -> Result<Option<PathBuf>, CoreError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;

        let backup = if path.exists() {
            let backup = backup_path(path).ok_or_else(|| {
                CoreError::new(
                    CoreErrorCode::Io,
                    format!("cannot derive a backup name for {}", path.display()),
                )
            })?;
            fs::rename(path, &backup).map_err(|e| io_error("back up", path, e))?;
            tracing::info!(backup = %backup.display(), "kept previous stash");
            Some(backup)
        } else {
            None
        };

        fs::write(path, bytes).map_err(|e| io_error("write", path, e))?;
        Ok(backup)
    }
}

/// `dir/player.stash` -> `dir/_player.stash`.
pub fn backup_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    Some(path.with_file_name(format!("{BACKUP_PREFIX}{name}")))
}

fn item_not_found(index: usize, count: usize) -> CoreError {
    CoreError::new(
        CoreErrorCode::NotFound,
        format!("no item {index}, expected 1..={count}"),
    )
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> CoreError {
    CoreError::new(
        CoreErrorCode::Io,
        format!("failed to {action} {}: {e}", path.display()),
    )
}
