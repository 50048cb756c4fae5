use serde::Serialize;

use crate::encoding::CodecOptions;
use crate::error::{DecodeError, EncodeError};
use crate::stat::{Stat, StatValue};

/// Name of the stat holding an item's display name.
pub const NAME_STAT: &str = "name";
/// Record marker written for items that were not read from a file.
pub const DEFAULT_MARKER: u32 = 1;

/// One inventory entry: an ordered, comma-separated list of stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    /// Opaque word preceding the item in the body.
    pub marker: u32,
    pub stats: Vec<Stat>,
}

/// The inspection view of an item: its title plus every other stat that has
/// a value. Repeated stat names keep their first position and last value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub name: Option<StatValue>,
    pub stats: Vec<(String, StatValue)>,
}

impl Item {
    pub fn new(stats: Vec<Stat>) -> Self {
        Self {
            marker: DEFAULT_MARKER,
            stats,
        }
    }

    pub fn decode(payload: &[u8], options: &CodecOptions) -> Result<Self, DecodeError> {
        let text = options.encoding.decode(payload, "item payload")?;
        let stats = text
            .split(',')
            .filter(|segment| !segment.is_empty())
            .map(|segment| Stat::decode(segment, options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(stats))
    }

    pub fn encode(&self, options: &CodecOptions) -> Result<Vec<u8>, EncodeError> {
        let records = self
            .stats
            .iter()
            .map(|stat| stat.encode(options))
            .collect::<Result<Vec<_>, _>>()?;
        options.encoding.encode(&records.join(","))
    }

    pub fn display_name(&self) -> Option<&StatValue> {
        self.stat(NAME_STAT).and_then(|stat| stat.value.as_ref())
    }

    pub fn stat(&self, name: &str) -> Option<&Stat> {
        self.stats.iter().find(|stat| stat.name == name)
    }

    pub fn stat_mut(&mut self, name: &str) -> Option<&mut Stat> {
        self.stats.iter_mut().find(|stat| stat.name == name)
    }

    /// Stats in name order, as the editor lists them.
    pub fn sorted_stats(&self) -> Vec<&Stat> {
        let mut stats: Vec<&Stat> = self.stats.iter().collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }

    pub fn summary(&self) -> ItemSummary {
        let mut stats: Vec<(String, StatValue)> = Vec::new();
        for stat in &self.stats {
            if stat.name == NAME_STAT {
                continue;
            }
            let Some(value) = &stat.value else {
                continue;
            };
            match stats.iter_mut().find(|(name, _)| *name == stat.name) {
                Some(entry) => entry.1 = value.clone(),
                None => stats.push((stat.name.clone(), value.clone())),
            }
        }

        ItemSummary {
            name: self.display_name().cloned(),
            stats,
        }
    }
}
