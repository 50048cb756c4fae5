//! Codec for Chronicon stash files.
//!
//! A stash file is a hex-encoded header, a hex-encoded body of
//! length-prefixed item records, and a two-line footer with the format
//! version and the number of live items. Items are comma-separated
//! `kind:hexName:hexValue` stat records.

pub mod core_api;
pub mod encoding;
pub mod error;
pub mod item;
pub mod layout;
pub mod number;
pub mod reader;
pub mod stash;
pub mod stat;

pub use encoding::{CodecOptions, Fidelity, TextEncoding};
pub use error::{DecodeError, EncodeError, ValueError};
pub use item::{Item, ItemSummary};
pub use stash::{Stash, StashSummary};
pub use stat::{Stat, StatKind, StatValue};
