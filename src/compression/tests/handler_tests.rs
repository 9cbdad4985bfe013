//! Tests for block decompression handlers

extern crate std;

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::compression::jpeg::{is_abbreviated_stream, merge_jpeg_tables};
use crate::compression::{CompressionFactory, CompressionHandler, PackBitsHandler};
use crate::tiff::errors::TiffError;

#[test]
fn test_packbits_literal_and_repeat_runs() {
    // Worked example from section 9 of TIFF 6.0
    let encoded = [
        0xFE, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00, 0x2A, 0x22, 0xF7, 0xAA,
    ];
    let expected = [
        0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0x22, 0xAA, 0xAA,
        0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
    ];

    let handler = CompressionFactory::create_handler(32773, None, 1).unwrap();
    std::assert_eq!(handler.decompress(&encoded, expected.len()).unwrap(), expected.to_vec());
}

#[test]
fn test_packbits_noop_and_truncation() {
    std::assert_eq!(PackBitsHandler.decompress(&[0x80, 0x00, 0x07], 16).unwrap(), vec![0x07]);
    std::assert!(PackBitsHandler.decompress(&[0x03, 0x01], 16).is_err());
    std::assert!(PackBitsHandler.decompress(&[0xFF], 16).is_err());
}

#[test]
fn test_deflate_both_codes() {
    let raw: Vec<u8> = (0..=255u8).cycle().take(4000).collect();
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).unwrap();
    let compressed = encoder.finish().unwrap();

    for code in [8u16, 32946] {
        let handler = CompressionFactory::create_handler(code, None, 1).unwrap();
        std::assert_eq!(handler.code(), code);
        std::assert_eq!(handler.decompress(&compressed, raw.len()).unwrap(), raw);
    }
}

#[test]
fn test_zstd_both_codes() {
    let raw = vec![42u8; 10_000];
    let compressed = zstd::encode_all(&raw[..], 3).unwrap();

    for code in [14u16, 50000] {
        let handler = CompressionFactory::create_handler(code, None, 1).unwrap();
        std::assert_eq!(handler.decompress(&compressed, raw.len()).unwrap(), raw);
    }
}

#[test]
fn test_output_stops_at_expected_size() {
    // 16 MiB of zeros squeezed into a few kilobytes
    let raw = vec![0u8; 16 << 20];
    let limit = 4096;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&raw).unwrap();
    let deflated = encoder.finish().unwrap();
    let zstded = zstd::encode_all(&raw[..], 3).unwrap();

    for (code, compressed) in [(8u16, &deflated), (50000, &zstded)] {
        let handler = CompressionFactory::create_handler(code, None, 1).unwrap();
        std::assert_eq!(handler.decompress(compressed, limit).unwrap().len(), limit);
    }

    // Runs of 128 bytes each, cut at the limit
    let runs = vec![0x81u8, 0x05].repeat(1000);
    let unpacked = PackBitsHandler.decompress(&runs, 300).unwrap();
    std::assert_eq!(unpacked.len(), 300);
    std::assert!(unpacked.iter().all(|&b| b == 0x05));
}

#[test]
fn test_unsupported_codes() {
    for code in [5u16, 6, 33003, 9999] {
        match CompressionFactory::create_handler(code, None, 1) {
            Err(TiffError::UnsupportedCompression(c)) => std::assert_eq!(c, code as u64),
            Err(other) => panic!("unexpected error {:?}", other),
            Ok(_) => panic!("code {} should be rejected", code),
        }
    }
}

#[test]
fn test_jpeg_rejects_odd_sample_counts() {
    std::assert!(CompressionFactory::create_handler(7, None, 4).is_err());
    std::assert!(CompressionFactory::create_handler(7, None, 3).unwrap().yields_pixels());
}

#[test]
fn test_abbreviated_stream_detection() {
    // SOI, SOS: abbreviated
    std::assert!(is_abbreviated_stream(&[0xFF, 0xD8, 0xFF, 0xDA, 0x00, 0x02]));
    // SOI, DQT: complete
    std::assert!(!is_abbreviated_stream(&[0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x02]));
    // Not a JPEG at all
    std::assert!(!is_abbreviated_stream(&[0x00, 0x01, 0x02, 0x03]));
}

#[test]
fn test_merge_jpeg_tables() {
    let tables = [0xFF, 0xD8, 0xFF, 0xDB, 0x01, 0xFF, 0xD9];
    let tile = [0xFF, 0xD8, 0xFF, 0xDA, 0x02, 0xFF, 0xD9];
    std::assert_eq!(
        merge_jpeg_tables(&tables, &tile),
        vec![0xFF, 0xD8, 0xFF, 0xDB, 0x01, 0xFF, 0xDA, 0x02, 0xFF, 0xD9]
    );
    std::assert_eq!(merge_jpeg_tables(&[], &tile), tile.to_vec());
    std::assert!(merge_jpeg_tables(&tables, &[]).is_empty());
}
