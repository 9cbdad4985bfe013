//! In-memory TIFF fixtures
//!
//! Builds small but structurally complete TIFF and BigTIFF files (tiled or
//! stripped, optionally compressed and predicted) so readers can be tested
//! without fixture files on disk.

use std::io::{Cursor, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

use crate::tiff::constants::{compression, field_types, predictor, tags};

/// Block organisation of a fixture
#[derive(Debug, Clone, Copy)]
pub(crate) enum Blocks {
    Tiles(u32, u32),
    Strips(u32),
}

/// Description of a single-image TIFF to synthesise
#[derive(Debug, Clone)]
pub(crate) struct TiffFixture {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u16,
    pub bits_per_sample: u16,
    pub sample_format: u16,
    pub blocks: Blocks,
    pub compression: u16,
    pub predictor: u16,
    pub big_endian: bool,
    pub big_tiff: bool,
    pub description: Option<String>,
}

struct Entry {
    tag: u16,
    field_type: u16,
    values: Vec<u64>,
}

impl TiffFixture {
    /// Greyscale 8-bit, one uncompressed strip
    pub fn new(width: u32, height: u32) -> Self {
        TiffFixture {
            width,
            height,
            samples_per_pixel: 1,
            bits_per_sample: 8,
            sample_format: 1,
            blocks: Blocks::Strips(height),
            compression: compression::NONE,
            predictor: predictor::NONE,
            big_endian: false,
            big_tiff: false,
            description: None,
        }
    }

    pub fn tiled(mut self, tile_width: u32, tile_height: u32) -> Self {
        self.blocks = Blocks::Tiles(tile_width, tile_height);
        self
    }

    pub fn strips(mut self, rows_per_strip: u32) -> Self {
        self.blocks = Blocks::Strips(rows_per_strip);
        self
    }

    pub fn channels(mut self, samples_per_pixel: u16) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self
    }

    pub fn samples(mut self, bits_per_sample: u16, sample_format: u16) -> Self {
        self.bits_per_sample = bits_per_sample;
        self.sample_format = sample_format;
        self
    }

    pub fn compressed(mut self, code: u16) -> Self {
        self.compression = code;
        self
    }

    pub fn predicted(mut self) -> Self {
        self.predictor = predictor::HORIZONTAL_DIFFERENCING;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn big_tiff(mut self) -> Self {
        self.big_tiff = true;
        self
    }

    pub fn described(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }

    fn bytes_per_pixel(&self) -> usize {
        self.samples_per_pixel as usize * self.bits_per_sample as usize / 8
    }

    /// Serialise the image; `pixels` is row-major in the fixture's byte order
    pub fn build(&self, pixels: &[u8]) -> Vec<u8> {
        let bpp = self.bytes_per_pixel();
        std::assert_eq!(pixels.len(), self.width as usize * self.height as usize * bpp);

        let mut file = Vec::new();
        // Header, first-IFD offset patched later
        file.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        if self.big_tiff {
            self.put(&mut file, 43, 2);
            self.put(&mut file, 8, 2);
            self.put(&mut file, 0, 2);
            self.put(&mut file, 0, 8);
        } else {
            self.put(&mut file, 42, 2);
            self.put(&mut file, 0, 4);
        }

        let mut offsets = Vec::new();
        let mut byte_counts = Vec::new();
        for block in self.raw_blocks(pixels) {
            let encoded = self.encode_block(block);
            offsets.push(file.len() as u64);
            byte_counts.push(encoded.len() as u64);
            file.extend_from_slice(&encoded);
        }

        let long = if self.big_tiff { field_types::LONG8 } else { field_types::LONG };
        let spp = self.samples_per_pixel as usize;
        let mut entries = vec![
            Entry { tag: tags::IMAGE_WIDTH, field_type: field_types::LONG, values: vec![self.width as u64] },
            Entry { tag: tags::IMAGE_LENGTH, field_type: field_types::LONG, values: vec![self.height as u64] },
            Entry { tag: tags::BITS_PER_SAMPLE, field_type: field_types::SHORT, values: vec![self.bits_per_sample as u64; spp] },
            Entry { tag: tags::COMPRESSION, field_type: field_types::SHORT, values: vec![self.compression as u64] },
            Entry {
                tag: tags::PHOTOMETRIC_INTERPRETATION,
                field_type: field_types::SHORT,
                values: vec![if spp >= 3 { 2 } else { 1 }],
            },
            Entry { tag: tags::SAMPLES_PER_PIXEL, field_type: field_types::SHORT, values: vec![spp as u64] },
            Entry { tag: tags::PLANAR_CONFIGURATION, field_type: field_types::SHORT, values: vec![1] },
            Entry { tag: tags::SAMPLE_FORMAT, field_type: field_types::SHORT, values: vec![self.sample_format as u64; spp] },
        ];
        if let Some(text) = &self.description {
            let mut values: Vec<u64> = text.bytes().map(u64::from).collect();
            values.push(0);
            entries.push(Entry { tag: tags::IMAGE_DESCRIPTION, field_type: field_types::ASCII, values });
        }
        if self.predictor != predictor::NONE {
            entries.push(Entry { tag: tags::PREDICTOR, field_type: field_types::SHORT, values: vec![self.predictor as u64] });
        }
        match self.blocks {
            Blocks::Tiles(tw, th) => {
                entries.push(Entry { tag: tags::TILE_WIDTH, field_type: field_types::LONG, values: vec![tw as u64] });
                entries.push(Entry { tag: tags::TILE_LENGTH, field_type: field_types::LONG, values: vec![th as u64] });
                entries.push(Entry { tag: tags::TILE_OFFSETS, field_type: long, values: offsets });
                entries.push(Entry { tag: tags::TILE_BYTE_COUNTS, field_type: long, values: byte_counts });
            }
            Blocks::Strips(rps) => {
                entries.push(Entry { tag: tags::STRIP_OFFSETS, field_type: long, values: offsets });
                entries.push(Entry { tag: tags::ROWS_PER_STRIP, field_type: field_types::LONG, values: vec![rps as u64] });
                entries.push(Entry { tag: tags::STRIP_BYTE_COUNTS, field_type: long, values: byte_counts });
            }
        }
        entries.sort_by_key(|e| e.tag);

        // Out-of-line value arrays go before the IFD
        let inline_size = if self.big_tiff { 8 } else { 4 };
        let mut value_fields = Vec::new();
        for entry in &entries {
            let size = field_size(entry.field_type);
            let mut encoded = Vec::new();
            for &v in &entry.values {
                self.put(&mut encoded, v, size);
            }

            if encoded.len() <= inline_size {
                encoded.resize(inline_size, 0);
                value_fields.push(encoded);
            } else {
                if file.len() % 2 == 1 {
                    file.push(0);
                }
                let mut field = Vec::new();
                self.put(&mut field, file.len() as u64, inline_size);
                file.extend_from_slice(&encoded);
                value_fields.push(field);
            }
        }

        if file.len() % 2 == 1 {
            file.push(0);
        }
        let ifd_offset = file.len() as u64;
        self.put(&mut file, entries.len() as u64, if self.big_tiff { 8 } else { 2 });
        for (entry, field) in entries.iter().zip(value_fields) {
            self.put(&mut file, entry.tag as u64, 2);
            self.put(&mut file, entry.field_type as u64, 2);
            self.put(&mut file, entry.values.len() as u64, inline_size);
            file.extend_from_slice(&field);
        }
        self.put(&mut file, 0, inline_size);

        let mut header_field = Vec::new();
        self.put(&mut header_field, ifd_offset, inline_size);
        let at = if self.big_tiff { 8 } else { 4 };
        file[at..at + inline_size].copy_from_slice(&header_field);

        file
    }

    /// Same as `build`, wrapped in a cursor
    pub fn cursor(&self, pixels: &[u8]) -> Cursor<Vec<u8>> {
        Cursor::new(self.build(pixels))
    }

    fn put(&self, out: &mut Vec<u8>, value: u64, size: usize) {
        let mut buf = [0u8; 8];
        match (size, self.big_endian) {
            (1, _) => buf[0] = value as u8,
            (2, false) => LittleEndian::write_u16(&mut buf, value as u16),
            (2, true) => BigEndian::write_u16(&mut buf, value as u16),
            (4, false) => LittleEndian::write_u32(&mut buf, value as u32),
            (4, true) => BigEndian::write_u32(&mut buf, value as u32),
            (_, false) => LittleEndian::write_u64(&mut buf, value),
            (_, true) => BigEndian::write_u64(&mut buf, value),
        }
        out.extend_from_slice(&buf[..size]);
    }

    /// Uncompressed block contents in row-major block order
    ///
    /// Tiles are padded with zeros to the full tile size; the last strip
    /// only holds the remaining rows.
    fn raw_blocks(&self, pixels: &[u8]) -> Vec<Vec<u8>> {
        let bpp = self.bytes_per_pixel();
        let image_row = self.width as usize * bpp;
        let mut blocks = Vec::new();

        match self.blocks {
            Blocks::Tiles(tw, th) => {
                for ty in 0..self.height.div_ceil(th) {
                    for tx in 0..self.width.div_ceil(tw) {
                        let mut block = vec![0u8; (tw * th) as usize * bpp];
                        for row in 0..th {
                            let y = ty * th + row;
                            if y >= self.height {
                                break;
                            }
                            let x0 = tx * tw;
                            let cols = tw.min(self.width - x0) as usize;
                            let src = y as usize * image_row + x0 as usize * bpp;
                            let dst = row as usize * tw as usize * bpp;
                            block[dst..dst + cols * bpp].copy_from_slice(&pixels[src..src + cols * bpp]);
                        }
                        blocks.push(block);
                    }
                }
            }
            Blocks::Strips(rps) => {
                for chunk in pixels.chunks(image_row * rps as usize) {
                    blocks.push(chunk.to_vec());
                }
            }
        }

        blocks
    }

    fn block_width(&self) -> usize {
        match self.blocks {
            Blocks::Tiles(tw, _) => tw as usize,
            Blocks::Strips(_) => self.width as usize,
        }
    }

    fn encode_block(&self, mut block: Vec<u8>) -> Vec<u8> {
        if self.predictor == predictor::HORIZONTAL_DIFFERENCING {
            self.apply_predictor(&mut block);
        }

        match self.compression {
            compression::NONE => block,
            compression::DEFLATE | compression::DEFLATE_OLD => {
                let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(&block).unwrap();
                encoder.finish().unwrap()
            }
            compression::ZSTD | compression::ZSTD_LIBTIFF => zstd::encode_all(&block[..], 3).unwrap(),
            compression::PACKBITS => packbits_encode(&block),
            compression::JPEG => {
                let width = self.block_width() as u32;
                let height = (block.len() / self.bytes_per_pixel() / width as usize) as u32;
                let color = if self.samples_per_pixel == 1 { ExtendedColorType::L8 } else { ExtendedColorType::Rgb8 };
                let mut out = Vec::new();
                JpegEncoder::new_with_quality(&mut out, 100).encode(&block, width, height, color).unwrap();
                out
            }
            other => panic!("fixture cannot encode compression {}", other),
        }
    }

    fn apply_predictor(&self, block: &mut [u8]) {
        let channels = self.samples_per_pixel as usize;
        let row_bytes = self.block_width() * self.bytes_per_pixel();

        for row in block.chunks_exact_mut(row_bytes) {
            match self.bits_per_sample {
                8 => {
                    for i in (channels..row.len()).rev() {
                        row[i] = row[i].wrapping_sub(row[i - channels]);
                    }
                }
                16 => {
                    let read = |b: &[u8]| if self.big_endian { BigEndian::read_u16(b) } else { LittleEndian::read_u16(b) };
                    let samples: Vec<u16> = row.chunks_exact(2).map(read).collect();
                    for i in (channels..samples.len()).rev() {
                        let diff = samples[i].wrapping_sub(samples[i - channels]);
                        if self.big_endian {
                            BigEndian::write_u16(&mut row[i * 2..], diff);
                        } else {
                            LittleEndian::write_u16(&mut row[i * 2..], diff);
                        }
                    }
                }
                other => panic!("fixture cannot predict {}-bit samples", other),
            }
        }
    }
}

fn field_size(field_type: u16) -> usize {
    match field_type {
        field_types::ASCII => 1,
        field_types::SHORT => 2,
        field_types::LONG => 4,
        _ => 8,
    }
}

/// PackBits encoding using literal runs only
pub(crate) fn packbits_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    for chunk in data.chunks(128) {
        out.push((chunk.len() - 1) as u8);
        out.extend_from_slice(chunk);
    }
    out
}

/// Deterministic 8-bit test pattern, distinct for nearby pixels
pub(crate) fn pattern_u8(width: u32, height: u32, channels: u16) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((width * height) as usize * channels as usize);
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels as u32 {
                pixels.push(((x * 7 + y * 13 + c * 31) % 251) as u8);
            }
        }
    }
    pixels
}
