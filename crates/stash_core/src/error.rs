use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

/// Structural failure while decoding a stash file. Decoding never returns a
/// partial model alongside one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("file is {len} characters long, header needs {needed}")]
    ShortHeader { len: usize, needed: usize },

    #[error("invalid hex in {field}: {source}")]
    Hex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error("footer has {found} newline-separated segments, expected 3")]
    MissingFooter { found: usize },

    #[error("unexpected data after footer: {0:?}")]
    TrailingFooter(String),

    #[error("invalid version {text:?}: {source}")]
    Version {
        text: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("invalid declared size {text:?}: {source}")]
    Size {
        text: String,
        #[source]
        source: ParseIntError,
    },

    #[error("body truncated at byte {offset}: needed {needed} bytes, {available} left")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("stat record {0:?} must have exactly three ':'-separated fields")]
    StatFields(String),

    #[error("stat record {0:?} has an empty name field")]
    EmptyName(String),

    #[error("float value of stat {name:?} is {len} bytes, at most 8 allowed")]
    FloatWidth { name: String, len: usize },

    #[error("{context} is not valid {encoding} text")]
    Text {
        context: String,
        encoding: &'static str,
    },

    #[error("body layout: {0}")]
    Layout(String),

    #[error("record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Text that cannot be represented in the codec's text encoding.
    #[error("{text:?} cannot be encoded as {encoding}")]
    Unmappable {
        text: String,
        encoding: &'static str,
    },

    #[error("record {index} payload is {len} bytes, too long for a 32-bit length")]
    PayloadTooLarge { index: usize, len: usize },
}

/// Rejected input for a stat value. The stat keeps its previous value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("stat {name:?} expects a number, got {input:?}")]
    NotANumber { name: String, input: String },

    #[error("stat {name:?} expects hex bytes, got {input:?}: {source}")]
    NotHex {
        name: String,
        input: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("stat {name:?} has kind {kind}, whose values are not written in legacy mode")]
    LegacyDropped { name: String, kind: String },
}
