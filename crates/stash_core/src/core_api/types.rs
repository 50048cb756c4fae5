use serde::Serialize;

use crate::stat::StatValue;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub header: [u32; 3],
    pub version: f64,
    pub declared_size: usize,
    pub item_count: usize,
    pub live_item_count: usize,
}

/// One row of the item list. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemEntry {
    pub index: usize,
    pub name: Option<String>,
    pub live: bool,
    pub stat_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatEntry {
    pub name: String,
    pub kind: String,
    pub value: Option<StatValue>,
}
