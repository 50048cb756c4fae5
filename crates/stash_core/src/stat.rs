use std::fmt;

use serde::{Serialize, Serializer};

use crate::encoding::CodecOptions;
use crate::error::{DecodeError, EncodeError, ValueError};
use crate::number::{format_float, parse_float};

pub const FLOAT64_TAG: &str = "1";
pub const STRING_TAG: &str = "3";

const FLOAT_WIDTH: usize = 8;

/// Type tag of a stat record. Tags other than `1` and `3` are carried
/// verbatim as `Opaque`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum StatKind {
    Float64,
    String,
    Opaque(String),
}

impl StatKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            FLOAT64_TAG => Self::Float64,
            STRING_TAG => Self::String,
            other => Self::Opaque(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::Float64 => FLOAT64_TAG,
            Self::String => STRING_TAG,
            Self::Opaque(tag) => tag,
        }
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }
}

impl fmt::Display for StatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float64 => f.write_str("Float64"),
            Self::String => f.write_str("String"),
            Self::Opaque(tag) => write!(f, "Opaque({tag})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Float(f64),
    Text(String),
    /// Raw value bytes of an opaque-kind stat.
    Bytes(Vec<u8>),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Text(text) => f.write_str(text),
            Self::Bytes(bytes) => f.write_str(&hex::encode_upper(bytes)),
        }
    }
}

impl Serialize for StatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Bytes(bytes) => serializer.serialize_str(&hex::encode_upper(bytes)),
        }
    }
}

/// Packs a float big-endian and drops trailing zero bytes.
pub fn pack_float(value: f64) -> Vec<u8> {
    let mut bytes = value.to_be_bytes().to_vec();
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    bytes
}

/// Right-pads up to 8 bytes with zeros and reads a big-endian float.
pub fn unpack_float(bytes: &[u8]) -> Option<f64> {
    if bytes.len() > FLOAT_WIDTH {
        return None;
    }
    let mut buf = [0u8; FLOAT_WIDTH];
    buf[..bytes.len()].copy_from_slice(bytes);
    Some(f64::from_be_bytes(buf))
}

/// One `kind:hexName:hexValue` record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stat {
    pub kind: StatKind,
    pub name: String,
    pub value: Option<StatValue>,
}

impl Stat {
    pub fn new(kind: StatKind, name: impl Into<String>, value: Option<StatValue>) -> Self {
        Self {
            kind,
            name: name.into(),
            value,
        }
    }

    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self::new(StatKind::Float64, name, Some(StatValue::Float(value)))
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(StatKind::String, name, Some(StatValue::Text(value.into())))
    }

    pub fn decode(record: &str, options: &CodecOptions) -> Result<Self, DecodeError> {
        let fields: Vec<&str> = record.split(':').collect();
        let [tag, name_hex, value_hex] = fields.as_slice() else {
            return Err(DecodeError::StatFields(record.to_string()));
        };

        let kind = StatKind::from_tag(tag);
        let name_bytes = hex::decode(name_hex).map_err(|source| DecodeError::Hex {
            field: "stat name",
            source,
        })?;
        if name_bytes.is_empty() {
            return Err(DecodeError::EmptyName(record.to_string()));
        }
        let name = options.encoding.decode(&name_bytes, "stat name")?;

        if value_hex.is_empty() {
            return Ok(Self::new(kind, name, None));
        }

        let raw = hex::decode(value_hex).map_err(|source| DecodeError::Hex {
            field: "stat value",
            source,
        })?;
        let value = match kind {
            StatKind::Float64 => {
                let v = unpack_float(&raw).ok_or_else(|| DecodeError::FloatWidth {
                    name: name.clone(),
                    len: raw.len(),
                })?;
                Some(StatValue::Float(v))
            }
            StatKind::String => Some(StatValue::Text(
                options
                    .encoding
                    .decode(&raw, &format!("value of stat {name:?}"))?,
            )),
            StatKind::Opaque(_) if options.is_legacy() => {
                tracing::debug!(stat = %name, kind = %kind, "dropping value of unrecognized kind");
                None
            }
            StatKind::Opaque(_) => Some(StatValue::Bytes(raw)),
        };

        Ok(Self::new(kind, name, value))
    }

    pub fn encode(&self, options: &CodecOptions) -> Result<String, EncodeError> {
        let name = hex::encode_upper(options.encoding.encode(&self.name)?);

        let raw = match &self.value {
            _ if options.is_legacy() && self.kind.is_opaque() => Vec::new(),
            None => Vec::new(),
            // The legacy editor skipped falsy values, which includes -0.0.
            Some(StatValue::Float(v)) if options.is_legacy() && *v == 0.0 => Vec::new(),
            Some(StatValue::Float(v)) => pack_float(*v),
            Some(StatValue::Text(text)) => options.encoding.encode(text)?,
            Some(StatValue::Bytes(bytes)) => bytes.clone(),
        };

        Ok(format!("{}:{}:{}", self.kind.tag(), name, hex::encode_upper(raw)).to_uppercase())
    }

    /// Replaces the value from user text. On error the stat is unchanged.
    ///
    /// Opaque stats take hex, the same form they are displayed in. Legacy
    /// mode never writes opaque values, so edits to them are rejected there.
    pub fn set_value(&mut self, input: &str, options: &CodecOptions) -> Result<(), ValueError> {
        let value = match &self.kind {
            StatKind::Float64 => {
                let v = parse_float(input).map_err(|_| ValueError::NotANumber {
                    name: self.name.clone(),
                    input: input.to_string(),
                })?;
                StatValue::Float(v)
            }
            StatKind::String => StatValue::Text(input.to_string()),
            kind @ StatKind::Opaque(_) if options.is_legacy() => {
                return Err(ValueError::LegacyDropped {
                    name: self.name.clone(),
                    kind: kind.to_string(),
                });
            }
            StatKind::Opaque(_) => {
                let bytes = hex::decode(input.trim()).map_err(|source| ValueError::NotHex {
                    name: self.name.clone(),
                    input: input.to_string(),
                    source,
                })?;
                StatValue::Bytes(bytes)
            }
        };
        self.value = Some(value);
        Ok(())
    }
}
