//! Pixel layout of one TIFF image
//!
//! Collects everything needed to locate and decode the blocks (tiles or
//! strips) of an IFD into one validated structure, so block reads never go
//! back to the tag table.

use log::debug;

use crate::adapter::SampleType;
use crate::grid::Region;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{compression, planar_config, predictor, sample_format, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::reader::TiffReader;

/// Geometry, sample encoding and block table of a chunky TIFF image
#[derive(Debug, Clone)]
pub struct ImageLayout {
    pub width: u32,
    pub height: u32,
    pub samples_per_pixel: u16,
    pub bits_per_sample: u16,
    pub sample_type: SampleType,
    pub compression: u16,
    pub predictor: u16,
    pub photometric: u16,
    /// Whether blocks are tiles (true) or strips (false)
    pub tiled: bool,
    /// Block width; strips span the full image width
    pub block_width: u32,
    /// Block height; rows per strip for stripped images
    pub block_height: u32,
    pub offsets: Vec<u64>,
    pub byte_counts: Vec<u64>,
    /// Shared JPEG tables (tag 347), if present
    pub jpeg_tables: Option<Vec<u8>>,
}

/// Sample type for a (SampleFormat, BitsPerSample) pair
pub fn sample_type_for(format: u16, bits: u16) -> TiffResult<SampleType> {
    let sample_type = match (format, bits) {
        (sample_format::UNSIGNED, 8) => SampleType::U8,
        (sample_format::SIGNED, 8) => SampleType::I8,
        (sample_format::UNSIGNED, 16) => SampleType::U16,
        (sample_format::SIGNED, 16) => SampleType::I16,
        (sample_format::UNSIGNED, 32) => SampleType::U32,
        (sample_format::SIGNED, 32) => SampleType::I32,
        (sample_format::IEEEFP, 32) => SampleType::F32,
        (sample_format::IEEEFP, 64) => SampleType::F64,
        (sample_format::COMPLEX_IEEEFP, 64) => SampleType::Complex32,
        (sample_format::COMPLEX_IEEEFP, 128) => SampleType::Complex64,
        _ => {
            return Err(TiffError::UnsupportedLayout(format!(
                "{}-bit samples with SampleFormat {}",
                bits, format
            )))
        }
    };

    Ok(sample_type)
}

/// All values of a per-sample tag must agree; returns the common value
fn uniform_value(values: &[u64], tag_name: &str) -> TiffResult<u64> {
    let first = *values.first().ok_or_else(|| TiffError::GenericError(format!("{} has no values", tag_name)))?;
    if values.iter().any(|&v| v != first) {
        return Err(TiffError::UnsupportedLayout(format!("mixed {} values {:?}", tag_name, values)));
    }
    Ok(first)
}

impl ImageLayout {
    /// Read and validate the layout of `ifd`
    pub fn from_ifd(tiff_reader: &TiffReader, reader: &mut dyn SeekableReader, ifd: &IFD) -> TiffResult<Self> {
        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        if width == 0 || height == 0 || width > u32::MAX as u64 || height > u32::MAX as u64 {
            return Err(TiffError::UnsupportedLayout(format!("image size {}x{}", width, height)));
        }
        let (width, height) = (width as u32, height as u32);

        let samples_per_pixel = match u16::try_from(ifd.get_samples_per_pixel()) {
            Ok(0) | Err(_) => {
                return Err(TiffError::UnsupportedLayout(format!(
                    "{} samples per pixel",
                    ifd.get_samples_per_pixel()
                )))
            }
            Ok(samples) => samples,
        };
        let bits_per_sample = if ifd.has_tag(tags::BITS_PER_SAMPLE) {
            uniform_value(&tiff_reader.read_tag_values(reader, ifd, tags::BITS_PER_SAMPLE)?, "BitsPerSample")? as u16
        } else {
            1
        };
        let format = if ifd.has_tag(tags::SAMPLE_FORMAT) {
            uniform_value(&tiff_reader.read_tag_values(reader, ifd, tags::SAMPLE_FORMAT)?, "SampleFormat")? as u16
        } else {
            sample_format::UNSIGNED
        };
        let sample_type = sample_type_for(format, bits_per_sample)?;

        let planar = ifd.get_tag_value(tags::PLANAR_CONFIGURATION).unwrap_or(planar_config::CHUNKY as u64) as u16;
        if planar != planar_config::CHUNKY && samples_per_pixel > 1 {
            return Err(TiffError::UnsupportedLayout("separate sample planes".to_string()));
        }

        let compression = ifd.get_tag_value(tags::COMPRESSION).unwrap_or(compression::NONE as u64) as u16;
        let predictor = ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64) as u16;
        match predictor {
            predictor::NONE => {}
            predictor::HORIZONTAL_DIFFERENCING if bits_per_sample == 8 || bits_per_sample == 16 => {}
            other => {
                return Err(TiffError::UnsupportedLayout(format!(
                    "predictor {} with {}-bit samples",
                    other, bits_per_sample
                )))
            }
        }
        let photometric = ifd.get_tag_value(tags::PHOTOMETRIC_INTERPRETATION).unwrap_or(1) as u16;

        let tiled = ifd.is_tiled();
        let (block_width, block_height, offsets_tag, counts_tag) = if tiled {
            let tile_width = ifd.get_tag_value(tags::TILE_WIDTH).unwrap_or(0);
            let tile_height = ifd.get_tag_value(tags::TILE_LENGTH).ok_or(TiffError::TagNotFound(tags::TILE_LENGTH))?;
            if tile_width == 0 || tile_height == 0 || tile_width > u32::MAX as u64 || tile_height > u32::MAX as u64 {
                return Err(TiffError::UnsupportedLayout(format!("tile size {}x{}", tile_width, tile_height)));
            }
            (tile_width as u32, tile_height as u32, tags::TILE_OFFSETS, tags::TILE_BYTE_COUNTS)
        } else {
            let rows_per_strip = ifd.get_tag_value(tags::ROWS_PER_STRIP).unwrap_or(height as u64);
            let rows = rows_per_strip.clamp(1, height as u64) as u32;
            (width, rows, tags::STRIP_OFFSETS, tags::STRIP_BYTE_COUNTS)
        };

        let offsets = tiff_reader.read_tag_values(reader, ifd, offsets_tag)?;
        let byte_counts = tiff_reader.read_tag_values(reader, ifd, counts_tag)?;

        let jpeg_tables = if ifd.has_tag(tags::JPEG_TABLES) {
            Some(tiff_reader.read_tag_bytes(reader, ifd, tags::JPEG_TABLES)?)
        } else {
            None
        };

        let layout = ImageLayout {
            width,
            height,
            samples_per_pixel,
            bits_per_sample,
            sample_type,
            compression,
            predictor,
            photometric,
            tiled,
            block_width,
            block_height,
            offsets,
            byte_counts,
            jpeg_tables,
        };

        let expected = layout.block_count();
        if layout.offsets.len() < expected || layout.byte_counts.len() < expected {
            return Err(TiffError::GenericError(format!(
                "expected {} blocks, found {} offsets and {} byte counts",
                expected,
                layout.offsets.len(),
                layout.byte_counts.len()
            )));
        }

        debug!("Layout: {}x{} {} x{} in {} {}x{} blocks, compression {}, predictor {}",
               width, height, sample_type, samples_per_pixel, expected,
               block_width, block_height, compression, predictor);

        Ok(layout)
    }

    /// Bytes per pixel in decoded block data
    pub fn bytes_per_pixel(&self) -> usize {
        self.samples_per_pixel as usize * self.sample_type.bytes_per_sample()
    }

    /// Blocks per block row
    pub fn blocks_across(&self) -> u32 {
        self.width.div_ceil(self.block_width)
    }

    /// Number of block rows
    pub fn blocks_down(&self) -> u32 {
        self.height.div_ceil(self.block_height)
    }

    pub fn block_count(&self) -> usize {
        self.blocks_across() as usize * self.blocks_down() as usize
    }

    /// Linear block index of block (column, row)
    pub fn block_index(&self, column: u32, row: u32) -> usize {
        row as usize * self.blocks_across() as usize + column as usize
    }

    /// Image area covered by block (column, row), clipped to the image
    pub fn block_region(&self, column: u32, row: u32) -> Region {
        let x = column * self.block_width;
        let y = row * self.block_height;
        Region::new(x, y, self.block_width.min(self.width - x), self.block_height.min(self.height - y))
    }

    /// Number of rows stored in a decoded block
    ///
    /// Tiles are always padded to the full tile height; the last strip only
    /// holds the rows that remain.
    pub fn stored_rows(&self, row: u32) -> u32 {
        if self.tiled {
            self.block_height
        } else {
            self.block_height.min(self.height - row * self.block_height)
        }
    }

    /// Byte length of one row of a decoded block
    pub fn block_row_bytes(&self) -> usize {
        self.block_width as usize * self.bytes_per_pixel()
    }

    /// (column, row) of every block intersecting `region`, in row-major order
    pub fn blocks_intersecting(&self, region: &Region) -> Vec<(u32, u32)> {
        if region.width == 0 || region.height == 0 {
            return Vec::new();
        }

        let first_column = region.x / self.block_width;
        let last_column = (region.end_x() - 1) / self.block_width;
        let first_row = region.y / self.block_height;
        let last_row = (region.end_y() - 1) / self.block_height;

        (first_row..=last_row)
            .flat_map(|row| (first_column..=last_column).map(move |column| (column, row)))
            .collect()
    }
}
