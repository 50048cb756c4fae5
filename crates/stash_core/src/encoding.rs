use std::fmt;

use encoding_rs::{UTF_8, WINDOWS_1252};

use crate::error::{DecodeError, EncodeError};

/// Text encoding applied to stat names, string values and item payloads.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Ascii,
    Utf8,
    Windows1252,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Utf8 => "utf-8",
            Self::Windows1252 => "windows-1252",
        }
    }

    pub fn decode(&self, bytes: &[u8], context: &str) -> Result<String, DecodeError> {
        let text = match self {
            Self::Ascii => bytes
                .is_ascii()
                .then(|| String::from_utf8_lossy(bytes).into_owned()),
            Self::Utf8 => UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            Self::Windows1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
        };
        text.ok_or_else(|| DecodeError::Text {
            context: context.to_string(),
            encoding: self.as_str(),
        })
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        let unmappable = || EncodeError::Unmappable {
            text: text.to_string(),
            encoding: self.as_str(),
        };
        match self {
            Self::Ascii if text.is_ascii() => Ok(text.as_bytes().to_vec()),
            Self::Ascii => Err(unmappable()),
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Windows1252 => {
                let (bytes, _, had_errors) = WINDOWS_1252.encode(text);
                if had_errors {
                    return Err(unmappable());
                }
                Ok(bytes.into_owned())
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How closely re-encoding follows the legacy editor.
///
/// `Legacy` reproduces two lossy behaviors of the original tool: values of
/// unrecognized stat kinds are dropped, and every body record marker is
/// rewritten as `1`. `Lossless` keeps both.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Fidelity {
    #[default]
    Lossless,
    Legacy,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CodecOptions {
    pub encoding: TextEncoding,
    pub fidelity: Fidelity,
}

impl CodecOptions {
    pub fn legacy() -> Self {
        Self {
            encoding: TextEncoding::Ascii,
            fidelity: Fidelity::Legacy,
        }
    }

    pub fn is_legacy(&self) -> bool {
        self.fidelity == Fidelity::Legacy
    }
}
