//! Payload codecs for BLOB and stream values: base64 for the wire
//! form, zlib in front of it when a definition asks for compression.

use std::io::{Read, Write};

use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

pub fn base64_encode(payload: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(payload)
}

/// Decodes base64 text, `None` when the text is not valid base64.
pub fn base64_decode(text: &str) -> Option<Vec<u8>> {
    match base64::engine::general_purpose::STANDARD.decode(text) {
        Ok(payload) => Some(payload),
        Err(error) => {
            log::error!("invalid base64 payload: {error}");
            None
        }
    }
}

/// Compresses a payload into a zlib stream.
pub fn zlib_deflate(payload: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    match encoder.write_all(payload).and_then(|_| encoder.finish()) {
        Ok(compressed) => compressed,
        Err(error) => {
            log::error!("zlib compression failed: {error}");
            Vec::new()
        }
    }
}

/// Decompresses a zlib stream, `None` when the stream is corrupt.
pub fn zlib_inflate(payload: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(payload);
    let mut decompressed = Vec::new();
    match decoder.read_to_end(&mut decompressed) {
        Ok(_) => Some(decompressed),
        Err(error) => {
            log::error!("zlib decompression failed: {error}");
            None
        }
    }
}

/// Compresses then base64-encodes a payload in one step.
pub fn zlib_base64_deflate(payload: &[u8]) -> String {
    base64_encode(&zlib_deflate(payload))
}

/// Base64-decodes then decompresses a payload in one step.
pub fn zlib_base64_inflate(text: &str) -> Option<Vec<u8>> {
    zlib_inflate(&base64_decode(text)?)
}
