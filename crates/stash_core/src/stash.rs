use serde::Serialize;

use crate::encoding::CodecOptions;
use crate::error::{DecodeError, EncodeError};
use crate::item::{DEFAULT_MARKER, Item, ItemSummary};
use crate::layout::{BodyLayout, RECORD_PADDING, RecordLayout};
use crate::number::{format_float, parse_float};
use crate::reader::LittleEndianReader;

/// Hex characters occupied by the three header words.
pub const HEADER_HEX_LEN: usize = 24;
pub const HEADER_WORDS: usize = 3;

const FOOTER_SEGMENTS: usize = 3;

/// A whole stash file.
///
/// `declared_size` is not kept in sync with `items`; items past it are stale
/// entries that are still written back out.
#[derive(Debug, Clone, Serialize)]
pub struct Stash {
    pub header: [u32; HEADER_WORDS],
    pub version: f64,
    pub declared_size: usize,
    pub items: Vec<Item>,
    #[serde(skip)]
    layout: BodyLayout,
}

/// Size plus the summary of every live item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StashSummary {
    pub size: usize,
    pub items: Vec<ItemSummary>,
}

impl Stash {
    pub fn new(
        header: [u32; HEADER_WORDS],
        version: f64,
        declared_size: usize,
        items: Vec<Item>,
    ) -> Self {
        Self {
            header,
            version,
            declared_size,
            items,
            layout: BodyLayout::default(),
        }
    }

    pub fn decode_bytes(bytes: &[u8], options: &CodecOptions) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(bytes)
            .ok()
            .filter(|_| bytes.is_ascii())
            .ok_or_else(|| DecodeError::Text {
                context: "stash file".to_string(),
                encoding: "ascii",
            })?;
        Self::decode(text, options)
    }

    pub fn decode(text: &str, options: &CodecOptions) -> Result<Self, DecodeError> {
        let (header, rest) = decode_header(text)?;
        let (body_hex, version, declared_size) = decode_footer(rest)?;
        let (items, layout) = decode_body(body_hex, options)?;

        if declared_size > items.len() {
            tracing::warn!(
                declared_size,
                items = items.len(),
                "declared size exceeds the number of items in the body"
            );
        }
        tracing::debug!(
            version,
            declared_size,
            items = items.len(),
            body_bytes = layout.body_len,
            "decoded stash"
        );

        Ok(Self {
            header,
            version,
            declared_size,
            items,
            layout,
        })
    }

    pub fn encode(&self, options: &CodecOptions) -> Result<String, EncodeError> {
        Ok(format!(
            "{}{}\n{}",
            self.encode_header(),
            self.encode_body(options)?,
            self.encode_footer()
        ))
    }

    pub fn to_bytes(&self, options: &CodecOptions) -> Result<Vec<u8>, EncodeError> {
        self.encode(options).map(String::into_bytes)
    }

    pub fn encode_header(&self) -> String {
        self.header
            .iter()
            .map(|word| hex::encode(word.to_le_bytes()))
            .collect()
    }

    pub fn encode_footer(&self) -> String {
        format!("{}\n{} ", format_float(self.version), self.declared_size)
    }

    /// Writes every item, including those past `declared_size`.
    pub fn encode_body(&self, options: &CodecOptions) -> Result<String, EncodeError> {
        let mut out = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            let payload = item.encode(options)?;
            let marker = if options.is_legacy() {
                DEFAULT_MARKER
            } else {
                item.marker
            };
            out.extend_from_slice(&marker.to_le_bytes());
            out.extend_from_slice(&record_length(index, payload.len())?.to_le_bytes());
            out.extend_from_slice(&payload);
            out.extend_from_slice(&[0u8; RECORD_PADDING]);
        }
        Ok(hex::encode_upper(out))
    }

    /// Items the game treats as present.
    pub fn live_items(&self) -> &[Item] {
        &self.items[..self.declared_size.min(self.items.len())]
    }

    pub fn set_declared_size(&mut self, size: usize) {
        if size > self.items.len() {
            tracing::warn!(size, items = self.items.len(), "declared size past last item");
        }
        self.declared_size = size;
    }

    /// Byte layout of the body as it was decoded. Empty for stashes built in
    /// memory.
    pub fn layout(&self) -> &BodyLayout {
        &self.layout
    }

    pub fn summary(&self) -> StashSummary {
        StashSummary {
            size: self.declared_size,
            items: self.live_items().iter().map(Item::summary).collect(),
        }
    }
}

fn decode_header(text: &str) -> Result<([u32; HEADER_WORDS], &str), DecodeError> {
    let (Some(header_hex), Some(rest)) = (text.get(..HEADER_HEX_LEN), text.get(HEADER_HEX_LEN..))
    else {
        return Err(DecodeError::ShortHeader {
            len: text.len(),
            needed: HEADER_HEX_LEN,
        });
    };

    let bytes = hex::decode(header_hex).map_err(|source| DecodeError::Hex {
        field: "header",
        source,
    })?;
    let mut header = [0u32; HEADER_WORDS];
    for (word, chunk) in header.iter_mut().zip(bytes.chunks_exact(4)) {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(chunk);
        *word = u32::from_le_bytes(buf);
    }
    Ok((header, rest))
}

fn decode_footer(text: &str) -> Result<(&str, f64, usize), DecodeError> {
    let segments: Vec<&str> = text.split('\n').collect();
    if segments.len() < FOOTER_SEGMENTS {
        return Err(DecodeError::MissingFooter {
            found: segments.len(),
        });
    }
    if let Some(extra) = segments[FOOTER_SEGMENTS..]
        .iter()
        .find(|segment| !segment.trim().is_empty())
    {
        return Err(DecodeError::TrailingFooter(extra.to_string()));
    }

    let version_text = segments[1].trim();
    let version = parse_float(version_text).map_err(|source| DecodeError::Version {
        text: version_text.to_string(),
        source,
    })?;
    let size_text = segments[2].trim();
    let declared_size = size_text
        .parse::<usize>()
        .map_err(|source| DecodeError::Size {
            text: size_text.to_string(),
            source,
        })?;

    Ok((segments[0].trim(), version, declared_size))
}

fn decode_body(
    body_hex: &str,
    options: &CodecOptions,
) -> Result<(Vec<Item>, BodyLayout), DecodeError> {
    let bytes = hex::decode(body_hex).map_err(|source| DecodeError::Hex {
        field: "body",
        source,
    })?;

    let mut r = LittleEndianReader::new(&bytes);
    let mut items = Vec::new();
    let mut records = Vec::new();
    while !r.is_empty() {
        let index = items.len();
        let (item, record) =
            read_record(&mut r, options).map_err(|source| DecodeError::Record {
                index,
                source: Box::new(source),
            })?;
        tracing::debug!(
            index,
            marker = record.marker,
            payload_len = record.payload.len(),
            stats = item.stats.len(),
            "decoded record"
        );
        items.push(item);
        records.push(record);
    }

    let layout = BodyLayout {
        body_len: bytes.len(),
        records,
    };
    layout.validate()?;
    Ok((items, layout))
}

fn read_record(
    r: &mut LittleEndianReader<'_>,
    options: &CodecOptions,
) -> Result<(Item, RecordLayout), DecodeError> {
    let start = r.position();
    let marker = r.read_u32()?;
    let item_len = r.read_u32()? as usize;
    let payload = r.read_bytes(item_len)?;
    let padding = r.read_bytes(RECORD_PADDING)?;
    if padding.iter().any(|&b| b != 0) {
        tracing::warn!(
            offset = start + 8 + item_len,
            "non-zero record padding will be rewritten as zeros"
        );
    }

    let mut item = Item::decode(payload, options)?;
    item.marker = marker;
    Ok((item, RecordLayout::at(start, marker, item_len)))
}

fn record_length(index: usize, len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::PayloadTooLarge { index, len })
}
