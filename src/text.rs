//! Reading and writing source files in the encoding they were saved in.
//!
//! Resource scripts are commonly UTF-16 with a byte order mark, while code
//! files are usually plain UTF-8. Files are decoded by sniffing the BOM and
//! written back with the same encoding and BOM.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::Result;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: [u8; 2] = [0xFF, 0xFE];
const UTF16BE_BOM: [u8; 2] = [0xFE, 0xFF];

/// On-disk encoding of a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8 without a BOM
    #[default]
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
}

/// Decoded file content and the encoding it was stored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    pub content: String,
    pub encoding: TextEncoding,
}

impl TextEncoding {
    fn from_bom(encoding: &'static Encoding) -> Self {
        if encoding == UTF_16LE {
            TextEncoding::Utf16Le
        } else if encoding == UTF_16BE {
            TextEncoding::Utf16Be
        } else {
            TextEncoding::Utf8Bom
        }
    }

    /// Encodes `content`, including the BOM for encodings that carry one.
    pub fn encode(self, content: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => content.as_bytes().to_vec(),
            TextEncoding::Utf8Bom => {
                let mut bytes = UTF8_BOM.to_vec();
                bytes.extend_from_slice(content.as_bytes());
                bytes
            }
            TextEncoding::Utf16Le => {
                let mut bytes = UTF16LE_BOM.to_vec();
                bytes.extend(content.encode_utf16().flat_map(u16::to_le_bytes));
                bytes
            }
            TextEncoding::Utf16Be => {
                let mut bytes = UTF16BE_BOM.to_vec();
                bytes.extend(content.encode_utf16().flat_map(u16::to_be_bytes));
                bytes
            }
        }
    }
}

/// Decodes `bytes` as BOM-marked UTF-8/UTF-16, or as plain UTF-8.
///
/// Returns `None` when the bytes are not valid text in the detected encoding.
pub fn decode(bytes: &[u8]) -> Option<TextFile> {
    let (encoding, bom_length) = Encoding::for_bom(bytes).unwrap_or((UTF_8, 0));
    let (content, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
    if had_errors {
        return None;
    }

    let encoding = if bom_length == 0 {
        TextEncoding::Utf8
    } else {
        TextEncoding::from_bom(encoding)
    };
    Some(TextFile {
        content: content.into_owned(),
        encoding,
    })
}

/// Reads a candidate file, returning `None` when it is not text.
pub fn read_text(path: &Path) -> Result<Option<TextFile>> {
    let bytes = fs::read(path)?;
    let decoded = decode(&bytes);
    if decoded.is_none() {
        warn!(path = %path.display(), "skipping file that is not UTF-8 or UTF-16 text");
    }
    Ok(decoded)
}

/// Writes `content` to `path` in `encoding`.
pub fn write_text(path: &Path, content: &str, encoding: TextEncoding) -> Result<()> {
    fs::write(path, encoding.encode(content))?;
    Ok(())
}
