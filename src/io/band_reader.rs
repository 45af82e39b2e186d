//! Seek-based strided extraction of band samples

use crate::types::{LandsatError, LandsatResult};
use std::io::{Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, Ordering};

/// Window of the band raster to sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRegion {
    pub offset_x: usize,
    pub offset_y: usize,
    pub width: usize,
    pub height: usize,
    pub step_x: usize,
    pub step_y: usize,
}

impl SourceRegion {
    /// The whole band at full resolution
    pub fn full(width: usize, height: usize) -> Self {
        Self { offset_x: 0, offset_y: 0, width, height, step_x: 1, step_y: 1 }
    }
}

/// Tile the samples are written to, row-major in the destination buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestRegion {
    pub offset_x: usize,
    pub offset_y: usize,
    pub width: usize,
    pub height: usize,
}

impl DestRegion {
    /// Samples in the tile; saturates for geometries no buffer can hold
    pub fn len(&self) -> usize {
        self.width.saturating_mul(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    Completed,
    /// Stopped after `rows_done` destination rows; later rows of the buffer are untouched
    Cancelled { rows_done: usize },
}

/// A band-scoped cursor over an image stream
pub struct PixelStream<R> {
    reader: R,
    image_width: usize,
    image_height: usize,
    bytes_per_pixel: usize,
    /// Byte position of the first sample of the band
    band_offset: u64,
}

impl<R: Read + Seek> PixelStream<R> {
    pub fn new(reader: R, image_width: usize, image_height: usize, bytes_per_pixel: usize, band_offset: u64) -> Self {
        Self {
            reader,
            image_width,
            image_height,
            bytes_per_pixel: bytes_per_pixel.max(1),
            band_offset,
        }
    }

    pub fn row_stride(&self) -> u64 {
        (self.image_width * self.bytes_per_pixel) as u64
    }

    fn sample_position(&self, x: usize, y: usize) -> u64 {
        (y as u64 * self.image_width as u64 + x as u64) * self.bytes_per_pixel as u64 + self.band_offset
    }
}

/// Copies strided band samples into one-byte-per-pixel destination tiles
pub struct PixelBandReader;

impl PixelBandReader {
    pub fn read<R: Read + Seek>(
        stream: &mut PixelStream<R>,
        source: &SourceRegion,
        dest: &DestRegion,
        buffer: &mut [u8],
        cancel: &AtomicBool,
    ) -> LandsatResult<ReadStatus> {
        Self::validate(stream, source, dest, buffer)?;

        let bpp = stream.bytes_per_pixel;
        let rows = ((source.height - 1) / source.step_y + 1).min(dest.height);
        let skip = if rows > 1 { Self::row_skip(stream, source)? } else { 0 };
        let mut row = vec![0u8; source.width * bpp];

        let start = stream.sample_position(source.offset_x, source.offset_y);
        log::debug!(
            "Reading {} rows of {} samples from byte {} into tile at ({}, {})",
            rows,
            source.width,
            start,
            dest.offset_x,
            dest.offset_y
        );
        stream.reader.seek(SeekFrom::Start(start))?;

        for r in 0..rows {
            if cancel.load(Ordering::Relaxed) {
                log::debug!("Band read cancelled after {} rows", r);
                return Ok(ReadStatus::Cancelled { rows_done: r });
            }

            stream.reader.read_exact(&mut row)?;
            let out = &mut buffer[r * dest.width..(r + 1) * dest.width];
            for (c, sample) in row.chunks_exact(bpp).step_by(source.step_x).take(dest.width).enumerate() {
                out[c] = sample[0];
            }

            if r + 1 < rows && skip > 0 {
                stream.reader.seek(SeekFrom::Current(skip))?;
            }
        }

        Ok(ReadStatus::Completed)
    }

    fn validate<R: Read + Seek>(
        stream: &PixelStream<R>,
        source: &SourceRegion,
        dest: &DestRegion,
        buffer: &[u8],
    ) -> LandsatResult<()> {
        if source.step_x == 0 || source.step_y == 0 {
            return Err(LandsatError::InvalidRegion("sub-sampling steps must be positive".to_string()));
        }
        if source.width == 0 || source.height == 0 {
            return Err(LandsatError::InvalidRegion("empty source region".to_string()));
        }
        let end_x = source.offset_x.checked_add(source.width);
        let end_y = source.offset_y.checked_add(source.height);
        let inside = matches!((end_x, end_y), (Some(x), Some(y)) if x <= stream.image_width && y <= stream.image_height);
        if !inside {
            return Err(LandsatError::InvalidRegion(format!(
                "source {}x{} at ({}, {}) exceeds image {}x{}",
                source.width,
                source.height,
                source.offset_x,
                source.offset_y,
                stream.image_width,
                stream.image_height
            )));
        }
        let needed = dest.width.checked_mul(dest.height).ok_or_else(|| {
            LandsatError::InvalidRegion(format!("destination tile {}x{} is too large", dest.width, dest.height))
        })?;
        if buffer.len() < needed {
            return Err(LandsatError::InvalidRegion(format!(
                "destination buffer holds {} samples, tile needs {}",
                buffer.len(),
                needed
            )));
        }
        Ok(())
    }

    /// Bytes between the end of one sampled row and the start of the next
    fn row_skip<R: Read + Seek>(stream: &PixelStream<R>, source: &SourceRegion) -> LandsatResult<i64> {
        let bpp = stream.bytes_per_pixel;
        let tail = (stream.image_width - source.width).checked_mul(bpp);
        let skipped_rows = (source.step_y - 1)
            .checked_mul(stream.image_width)
            .and_then(|bytes| bytes.checked_mul(bpp));
        tail.zip(skipped_rows)
            .and_then(|(tail, rows)| tail.checked_add(rows))
            .and_then(|skip| i64::try_from(skip).ok())
            .ok_or_else(|| LandsatError::InvalidRegion(format!("row step {} is too large", source.step_y)))
    }
}
