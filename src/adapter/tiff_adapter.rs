//! Adapter for TIFF, BigTIFF and Aperio SVS files
//!
//! Only the blocks (tiles or strips) of the first IFD that intersect the
//! requested rectangle are read and decompressed, so regions of very large
//! images can be served without decoding the whole image.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, info, trace, warn};

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::errors::{RegionError, RegionResult};
use crate::grid::Region;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{predictor, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::layout::ImageLayout;
use crate::tiff::validation;
use crate::tiff::TiffReader;
use crate::utils::tag_utils;

use super::buffer::{PixelBuffer, SampleType};
use super::handler::BackendAdapter;

const ADAPTER_NAME: &str = "tiff";

/// Random-access reader over the full-resolution image of a TIFF file
pub struct TiffAdapter {
    source: Box<dyn SeekableReader>,
    reader: TiffReader,
    layout: ImageLayout,
    decoder: Box<dyn CompressionHandler>,
    file_size: u64,
    overview_count: usize,
    description: Option<String>,
}

impl TiffAdapter {
    /// Open a TIFF file from disk
    pub fn open(path: &Path) -> RegionResult<Self> {
        info!("Opening TIFF file: {}", path.display());
        let file = File::open(path).map_err(|e| RegionError::adapter(ADAPTER_NAME, e))?;
        TiffAdapter::from_reader(BufReader::with_capacity(1024 * 1024, file))
    }

    /// Registry constructor
    pub fn create(path: &Path) -> RegionResult<Box<dyn BackendAdapter>> {
        Ok(Box::new(TiffAdapter::open(path)?))
    }

    /// Parse a TIFF from any seekable source
    pub fn from_reader<R: SeekableReader + 'static>(source: R) -> RegionResult<Self> {
        TiffAdapter::parse(Box::new(source)).map_err(|e| RegionError::adapter(ADAPTER_NAME, e))
    }

    fn parse(mut source: Box<dyn SeekableReader>) -> TiffResult<Self> {
        let mut reader = TiffReader::new();
        let tiff = reader.read(source.as_mut())?;
        let ifd = tiff.main_ifd().ok_or(TiffError::NoImage)?;

        let layout = ImageLayout::from_ifd(&reader, source.as_mut(), ifd)?;
        let decoder = CompressionFactory::for_layout(&layout)?;
        let file_size = validation::get_file_size(source.as_mut())?;

        // Aperio SVS files keep scanner metadata here
        let description = if ifd.has_tag(tags::IMAGE_DESCRIPTION) {
            match reader.read_ascii(source.as_mut(), ifd, tags::IMAGE_DESCRIPTION) {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!("Ignoring unreadable image description: {}", e);
                    None
                }
            }
        } else {
            None
        };

        debug!("TIFF image {}x{}, {} ({}), {} block(s), {} overview(s)",
               layout.width, layout.height,
               tag_utils::get_compression_name(layout.compression as u64),
               tag_utils::get_photometric_name(layout.photometric as u64),
               layout.block_count(), tiff.overviews().len());

        Ok(TiffAdapter {
            source,
            reader,
            layout,
            decoder,
            file_size,
            overview_count: tiff.overviews().len(),
            description,
        })
    }

    pub fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    /// Number of reduced-resolution directories after the main image
    pub fn overview_count(&self) -> usize {
        self.overview_count
    }

    /// ImageDescription of the main image, if present
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Read, decompress and un-predict one block
    ///
    /// The result holds at least `stored_rows(row) * block_row_bytes()`
    /// bytes laid out with a stride of `block_row_bytes()`.
    fn read_block(&mut self, column: u32, row: u32) -> TiffResult<Vec<u8>> {
        let index = self.layout.block_index(column, row);
        let offset = self.layout.offsets[index];
        let byte_count = self.layout.byte_counts[index];
        let row_bytes = self.layout.block_row_bytes();
        let expected = self.layout.stored_rows(row) as usize * row_bytes;

        // Sparse files leave never-written blocks empty
        if byte_count == 0 {
            trace!("Block {} is empty, filling with zeros", index);
            return Ok(vec![0u8; expected]);
        }

        validation::validate_data_range(offset, byte_count, self.file_size, "block")?;
        self.source.seek(SeekFrom::Start(offset))?;
        let mut compressed = vec![0u8; byte_count as usize];
        self.source.read_exact(&mut compressed)?;

        let mut data = self.decoder.decompress(&compressed, expected)?;
        trace!("Block {} ({}, {}): {} -> {} bytes", index, column, row, byte_count, data.len());

        if data.len() < expected {
            return Err(TiffError::TruncatedBlock {
                block: index,
                expected,
                actual: data.len(),
            });
        }

        if self.layout.predictor == predictor::HORIZONTAL_DIFFERENCING && !self.decoder.yields_pixels() {
            self.undo_predictor(&mut data[..expected], row_bytes)?;
        }

        Ok(data)
    }

    fn undo_predictor(&self, data: &mut [u8], row_bytes: usize) -> TiffResult<()> {
        let channels = self.layout.samples_per_pixel as usize;

        match self.layout.bits_per_sample {
            8 => {
                for row in data.chunks_exact_mut(row_bytes) {
                    for i in channels..row.len() {
                        row[i] = row[i].wrapping_add(row[i - channels]);
                    }
                }
            }
            16 => {
                let handler = self.reader.handler()?;
                for row in data.chunks_exact_mut(row_bytes) {
                    handler.undo_predictor_u16(row, channels);
                }
            }
            bits => {
                return Err(TiffError::UnsupportedLayout(format!("predictor with {}-bit samples", bits)));
            }
        }

        Ok(())
    }

    fn read_region(&mut self, region: Region) -> TiffResult<PixelBuffer> {
        let bytes_per_pixel = self.layout.bytes_per_pixel();
        let row_bytes = self.layout.block_row_bytes();
        let out_row_bytes = region.width as usize * bytes_per_pixel;
        let mut out = vec![0u8; out_row_bytes * region.height as usize];

        let blocks = self.layout.blocks_intersecting(&region);
        debug!("Reading {} from {} block(s)", region, blocks.len());

        for (column, row) in blocks {
            let block_area = self.layout.block_region(column, row);
            let overlap = match block_area.intersect(&region) {
                Some(overlap) => overlap,
                None => continue,
            };
            let block = self.read_block(column, row)?;

            let span = overlap.width as usize * bytes_per_pixel;
            for y in overlap.y..overlap.end_y() {
                let src = (y - block_area.y) as usize * row_bytes + (overlap.x - block_area.x) as usize * bytes_per_pixel;
                let dst = (y - region.y) as usize * out_row_bytes + (overlap.x - region.x) as usize * bytes_per_pixel;
                out[dst..dst + span].copy_from_slice(&block[src..src + span]);
            }
        }

        let samples = self.reader.handler()?.decode_samples(&out, self.layout.sample_type)?;
        PixelBuffer::new(region.width, region.height, self.layout.samples_per_pixel, samples)
            .map_err(|e| TiffError::GenericError(e.to_string()))
    }
}

impl BackendAdapter for TiffAdapter {
    fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn width(&self) -> u32 {
        self.layout.width
    }

    fn height(&self) -> u32 {
        self.layout.height
    }

    fn channels(&self) -> u16 {
        self.layout.samples_per_pixel
    }

    fn sample_type(&self) -> SampleType {
        self.layout.sample_type
    }

    fn fetch(&mut self, region: Region) -> RegionResult<PixelBuffer> {
        if !region.fits_within(self.layout.width, self.layout.height) {
            return Err(RegionError::RegionOutOfBounds(format!(
                "{} outside {}x{} image",
                region, self.layout.width, self.layout.height
            )));
        }

        self.read_region(region).map_err(|e| RegionError::adapter(ADAPTER_NAME, e))
    }
}
