//! Payload Codec
//!
//! Turns raw payload bytes into the string stored in a document, optionally
//! gzip-compressing them first. Compressed payloads carry a sentinel prefix so
//! decoding never depends on the current configuration.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{CacheError, Result};

/// Prefix marking a gzip-compressed payload.
pub const COMPRESSED_TAG: &str = "[Compress]";

// == Payload Codec ==
#[derive(Debug, Clone, Copy)]
pub struct PayloadCodec {
    compress: bool,
    min_compress_length: usize,
}

impl PayloadCodec {
    pub fn new(compress: bool, min_compress_length: usize) -> Self {
        Self {
            compress,
            min_compress_length,
        }
    }

    /// Codec that never compresses.
    pub fn plain() -> Self {
        Self::new(false, 0)
    }

    // == Encode ==
    pub fn encode(&self, raw: &[u8]) -> Result<String> {
        if self.compress && raw.len() >= self.min_compress_length {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder
                .write_all(raw)
                .map_err(|e| CacheError::Codec(format!("Gzip compression error: {}", e)))?;
            let compressed = encoder
                .finish()
                .map_err(|e| CacheError::Codec(format!("Gzip compression error: {}", e)))?;

            Ok(format!("{}{}", COMPRESSED_TAG, BASE64_STANDARD.encode(compressed)))
        } else {
            Ok(BASE64_STANDARD.encode(raw))
        }
    }

    // == Decode ==
    pub fn decode(&self, stored: &str) -> Result<Vec<u8>> {
        match stored.strip_prefix(COMPRESSED_TAG) {
            Some(body) => {
                let compressed = decode_base64(body)?;
                let mut decompressed = Vec::new();
                GzDecoder::new(compressed.as_slice())
                    .read_to_end(&mut decompressed)
                    .map_err(|e| CacheError::Codec(format!("Gzip decompression error: {}", e)))?;
                Ok(decompressed)
            }
            None => decode_base64(stored),
        }
    }
}

fn decode_base64(text: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(text)
        .map_err(|e| CacheError::Codec(format!("Invalid base64 payload: {}", e)))
}
