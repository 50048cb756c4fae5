use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use stash_core::core_api::{CoreError, ItemEntry, Session, StatEntry};
use stash_core::number::format_float;
use stash_core::{Item, ItemSummary, StatValue};

const STAT_LABEL_WIDTH: usize = 15;
const UNNAMED: &str = "<unnamed>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Also show items past the declared size.
    pub include_stale: bool,
}

/// The stash as JSON: version, declared size, and each item's title and
/// stats. Keys keep file order.
pub fn render_json(session: &Session, options: RenderOptions) -> JsonValue {
    let snapshot = session.snapshot();
    let stash = session.stash();
    let items: Vec<&Item> = if options.include_stale {
        stash.items.iter().collect()
    } else {
        stash.live_items().iter().collect()
    };

    let mut out = JsonMap::new();
    out.insert("version".to_string(), JsonValue::from(snapshot.version));
    out.insert("size".to_string(), JsonValue::from(snapshot.declared_size));
    out.insert(
        "items".to_string(),
        JsonValue::Array(
            items
                .iter()
                .map(|item| item_summary_to_json(&item.summary()))
                .collect(),
        ),
    );
    JsonValue::Object(out)
}

pub fn render_item_stats_json(session: &Session, index: usize) -> Result<JsonValue, CoreError> {
    let stats = session.item_stats(index)?;
    Ok(JsonValue::Array(stats.iter().map(stat_entry_to_json).collect()))
}

/// Header line plus one `   N: name` row per item.
pub fn render_item_list(session: &Session, options: RenderOptions) -> String {
    let snapshot = session.snapshot();
    let entries = if options.include_stale {
        session.all_items()
    } else {
        session.items()
    };

    let mut out = String::new();
    writeln!(
        &mut out,
        "Version: {}  Size: {}  Items: {}",
        format_float(snapshot.version),
        snapshot.declared_size,
        snapshot.item_count
    )
    .expect("writing to String cannot fail");
    for entry in &entries {
        writeln!(&mut out, "{}", format_item_row(entry)).expect("writing to String cannot fail");
    }
    out
}

/// The stat grid of one item, sorted by stat name.
pub fn render_item_sheet(session: &Session, index: usize) -> Result<String, CoreError> {
    let item = session.item(index)?;
    let stats = session.item_stats(index)?;
    let title = item
        .display_name()
        .map(ToString::to_string)
        .unwrap_or_else(|| UNNAMED.to_string());

    let mut out = String::new();
    writeln!(&mut out, "{index:4}: {title}").expect("writing to String cannot fail");
    for stat in &stats {
        writeln!(
            &mut out,
            "{:>width$} = {}",
            stat.name,
            format_value(stat.value.as_ref()),
            width = STAT_LABEL_WIDTH
        )
        .expect("writing to String cannot fail");
    }
    Ok(out)
}

pub fn format_item_row(entry: &ItemEntry) -> String {
    let name = entry.name.as_deref().unwrap_or(UNNAMED);
    if entry.live {
        format!("{:4}: {}", entry.index, name)
    } else {
        format!("{:4}: {} (stale)", entry.index, name)
    }
}

fn format_value(value: Option<&StatValue>) -> String {
    value.map_or_else(|| "-".to_string(), ToString::to_string)
}

fn item_summary_to_json(summary: &ItemSummary) -> JsonValue {
    let mut stats = JsonMap::new();
    for (name, value) in &summary.stats {
        stats.insert(name.clone(), value_to_json(Some(value)));
    }

    let mut out = JsonMap::new();
    out.insert("name".to_string(), value_to_json(summary.name.as_ref()));
    out.insert("stats".to_string(), JsonValue::Object(stats));
    JsonValue::Object(out)
}

fn stat_entry_to_json(stat: &StatEntry) -> JsonValue {
    let mut out = JsonMap::new();
    out.insert("name".to_string(), JsonValue::String(stat.name.clone()));
    out.insert("kind".to_string(), JsonValue::String(stat.kind.clone()));
    out.insert("value".to_string(), value_to_json(stat.value.as_ref()));
    JsonValue::Object(out)
}

fn value_to_json(value: Option<&StatValue>) -> JsonValue {
    match value {
        None => JsonValue::Null,
        Some(StatValue::Float(v)) => JsonValue::from(*v),
        Some(StatValue::Text(text)) => JsonValue::String(text.clone()),
        Some(bytes @ StatValue::Bytes(_)) => JsonValue::String(bytes.to_string()),
    }
}
