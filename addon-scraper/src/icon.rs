// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Icon thumbnail generation.
//!
//! Downloaded icons are decoded, scaled to fit a square bound while keeping
//! their aspect ratio, re-encoded in their original format and returned as
//! standard base64 text for embedding in the database.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat, imageops::FilterType};

/// Default thumbnail bound in pixels.
pub const DEFAULT_ICON_SIZE: u32 = 64;

/// Failure while turning icon bytes into a thumbnail.
#[derive(Debug, masterror::Error)]
pub enum IconError
{
    /// The bytes are not an image in a supported format.
    #[error("failed to decode icon: {message}")]
    Decode
    {
        message: String,
    },
    /// The thumbnail could not be written back in the source format.
    #[error("failed to encode icon as {format:?}: {message}")]
    Encode
    {
        format:  ImageFormat,
        message: String,
    },
}

/// Computes thumbnail dimensions for a `width`×`height` source scaled by
/// `min(bound_width / width, bound_height / height)`.
///
/// Integer arithmetic is used so exact ratios such as 200×100 → 64×32 are
/// not lost to floating point truncation. Both dimensions are at least 1.
///
/// # Examples
///
/// ```
/// use addon_scraper::thumbnail_dimensions;
///
/// assert_eq!(thumbnail_dimensions(200, 100, 64, 64), (64, 32));
/// assert_eq!(thumbnail_dimensions(16, 32, 64, 64), (32, 64));
/// ```
pub fn thumbnail_dimensions(width: u32, height: u32, bound_width: u32, bound_height: u32,)
-> (u32, u32,)
{
    if width == 0 || height == 0 {
        return (bound_width.max(1,), bound_height.max(1,),);
    }

    let (width, height,) = (u64::from(width,), u64::from(height,),);
    let (bound_width, bound_height,) = (u64::from(bound_width,), u64::from(bound_height,),);

    let (target_width, target_height,) = if width * bound_height >= height * bound_width {
        (bound_width, height * bound_width / width,)
    } else {
        (width * bound_height / height, bound_height,)
    };

    (clamp_dimension(target_width,), clamp_dimension(target_height,),)
}

fn clamp_dimension(value: u64,) -> u32
{
    u32::try_from(value.max(1,),).unwrap_or(u32::MAX,)
}

/// Decodes `bytes`, fits the image into a `bound`×`bound` square and returns
/// the re-encoded thumbnail as base64.
///
/// # Errors
///
/// Returns [`IconError::Decode`] when the format cannot be detected or
/// decoded and [`IconError::Encode`] when the source format has no encoder.
pub fn compress_icon(bytes: &[u8], bound: u32,) -> Result<String, IconError,>
{
    let format = image::guess_format(bytes,).map_err(|e| IconError::Decode {
        message: e.to_string(),
    },)?;
    let image = image::load_from_memory_with_format(bytes, format,).map_err(|e| {
        IconError::Decode {
            message: e.to_string(),
        }
    },)?;

    let (width, height,) = thumbnail_dimensions(image.width(), image.height(), bound, bound,);
    let resized = image.resize_exact(width, height, FilterType::CatmullRom,);
    let resized = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8(),),
        _ => resized,
    };

    let mut encoded = Vec::new();
    resized.write_to(&mut Cursor::new(&mut encoded,), format,).map_err(|e| {
        IconError::Encode {
            format,
            message: e.to_string(),
        }
    },)?;

    Ok(general_purpose::STANDARD.encode(encoded,),)
}
