//! Text Encoding Module
//! Strict decoders for the encodings the loader is allowed to try.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bytes that have no mapping in the windows-1252 code page.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Default trial order: universal encoding first, then single-byte Western ones.
pub const DEFAULT_ENCODINGS: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid {encoding} byte sequence at offset {offset}")]
    InvalidSequence {
        encoding: TextEncoding,
        offset: usize,
    },
    #[error("unknown encoding label '{0}'")]
    UnknownLabel(String),
}

/// A text encoding the dataset loader can decode with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
}

impl TextEncoding {
    /// Canonical label, as accepted on the command line.
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Windows1252 => "windows-1252",
        }
    }

    /// Decode `bytes` completely, failing on the first byte the encoding cannot map.
    ///
    /// No replacement characters are ever produced.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        match self {
            TextEncoding::Utf8 => {
                let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(body)
                    .map(str::to_owned)
                    .map_err(|e| DecodeError::InvalidSequence {
                        encoding: *self,
                        offset: e.valid_up_to() + (bytes.len() - body.len()),
                    })
            }
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            TextEncoding::Windows1252 => {
                if let Some(offset) = bytes.iter().position(|b| CP1252_UNDEFINED.contains(b)) {
                    return Err(DecodeError::InvalidSequence {
                        encoding: *self,
                        offset,
                    });
                }
                encoding_rs::WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(|text| text.into_owned())
                    .ok_or(DecodeError::InvalidSequence {
                        encoding: *self,
                        offset: 0,
                    })
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin-1" | "latin1" => Ok(TextEncoding::Latin1),
            "windows-1252" | "cp1252" => Ok(TextEncoding::Windows1252),
            other => Err(DecodeError::UnknownLabel(other.to_string())),
        }
    }
}
