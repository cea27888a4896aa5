//! # Compressed Size Estimation Module
//!
//! This module estimates how well the minified output compresses, on two
//! independent channels:
//!
//! - **gzip** through `flate2`, at the maximum compression ratio unless
//!   explicit options are given
//! - **brotli** through the `brotli` encoder in text mode, at the engine's
//!   default quality unless explicit options are given
//!
//! Both channels are pure functions of the same buffer and run
//! concurrently on the blocking pool when both are enabled. A disabled
//! channel produces no size at all. A failure on either channel fails the
//! whole item, but never prevents the other channel from completing.

use crate::config::{BrotliEstimate, BrotliOptions, GzipEstimate, GzipOptions};
use crate::error::RawError;
use brotli::enc::backward_references::BrotliEncoderMode;
use brotli::enc::BrotliEncoderParams;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

/// Estimated compressed sizes of one minified buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressedSizes {
    pub gzipped_size: Option<u64>,
    pub brotlied_size: Option<u64>,
}

fn gzipped_size(buffer: &[u8], options: &GzipOptions) -> Result<u64, RawError> {
    if options.level > 9 {
        return Err(RawError::new(format!(
            "Invalid gzip compression level: {}.",
            options.level
        )));
    }

    let mut encoder = GzEncoder::new(Vec::new(), Compression::new(options.level));
    encoder.write_all(buffer).map_err(RawError::from)?;
    let compressed = encoder.finish().map_err(RawError::from)?;
    Ok(compressed.len() as u64)
}

fn brotlied_size(buffer: &[u8], options: &BrotliOptions) -> Result<u64, RawError> {
    // Explicit options are merged over the text-mode defaults
    let mut params = BrotliEncoderParams::default();
    params.mode = BrotliEncoderMode::BROTLI_MODE_TEXT;
    if let Some(quality) = options.quality {
        if !(0..=11).contains(&quality) {
            return Err(RawError::new(format!(
                "Invalid brotli compression quality: {}.",
                quality
            )));
        }
        params.quality = quality;
    }
    if let Some(window) = options.window {
        if !(10..=24).contains(&window) {
            return Err(RawError::new(format!(
                "Invalid brotli window size: {}.",
                window
            )));
        }
        params.lgwin = window;
    }

    let mut compressed = Vec::new();
    brotli::BrotliCompress(&mut &buffer[..], &mut compressed, &params).map_err(RawError::from)?;
    Ok(compressed.len() as u64)
}

/// Estimate the enabled compressed sizes of one minified buffer.
///
/// The two channels run concurrently; both are awaited to completion
/// before either failure is reported.
pub async fn estimate_compressed_sizes(
    buffer: &[u8],
    gzip: &GzipEstimate,
    brotli: &BrotliEstimate,
) -> Result<CompressedSizes, RawError> {
    let gzip_task = gzip.is_enabled().then(|| {
        let buffer = buffer.to_vec();
        let options = gzip.effective_options();
        tokio::task::spawn_blocking(move || gzipped_size(&buffer, &options))
    });
    let brotli_task = brotli.is_enabled().then(|| {
        let buffer = buffer.to_vec();
        let options = brotli.effective_options();
        tokio::task::spawn_blocking(move || brotlied_size(&buffer, &options))
    });

    let (gzip_result, brotli_result) = tokio::join!(
        async {
            match gzip_task {
                Some(task) => Some(task.await),
                None => None,
            }
        },
        async {
            match brotli_task {
                Some(task) => Some(task.await),
                None => None,
            }
        }
    );

    let mut sizes = CompressedSizes::default();
    if let Some(joined) = gzip_result {
        let size = joined.map_err(|error| RawError::new(error.to_string()))??;
        sizes.gzipped_size = Some(size);
    }
    if let Some(joined) = brotli_result {
        let size = joined.map_err(|error| RawError::new(error.to_string()))??;
        sizes.brotlied_size = Some(size);
    }
    Ok(sizes)
}
