//! Re-encoding embedded image XObjects as PNG.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Object, Stream};

use crate::error::{Error, Result};

/// Whether a stream dictionary describes an image XObject.
pub fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype").and_then(Object::as_name), Ok(b"Image"))
}

/// Convert an image XObject stream to PNG bytes.
///
/// Handles JPEG (`DCTDecode`) data and 8-bit gray or RGB samples, raw or
/// Flate-compressed. Everything else is an [`Error::ImageEncode`].
pub fn to_png(stream: &Stream) -> Result<Vec<u8>> {
    let dict = &stream.dict;
    let filters = filter_names(dict);

    let image = match filters.last().map(String::as_str) {
        Some("DCTDecode") if filters.len() == 1 => {
            image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)?
        }
        Some(name @ ("DCTDecode" | "JPXDecode" | "JBIG2Decode" | "CCITTFaxDecode")) => {
            return Err(Error::ImageEncode(format!("unsupported filter {}", name)));
        }
        _ => {
            let samples = if filters.is_empty() {
                stream.content.clone()
            } else {
                stream
                    .decompressed_content()
                    .map_err(|e| Error::ImageEncode(e.to_string()))?
            };
            from_samples(dict, samples)?
        }
    };

    encode_png(&image)
}

fn from_samples(dict: &Dictionary, samples: Vec<u8>) -> Result<DynamicImage> {
    let width = integer(dict, b"Width")?;
    let height = integer(dict, b"Height")?;
    let bits = integer(dict, b"BitsPerComponent").unwrap_or(8);
    if bits != 8 {
        return Err(Error::ImageEncode(format!(
            "{} bits per component not supported",
            bits
        )));
    }
    if is_indexed(dict) {
        return Err(Error::ImageEncode("indexed color not supported".into()));
    }

    let pixels = (width as usize) * (height as usize);
    if pixels == 0 {
        return Err(Error::ImageEncode("empty image".into()));
    }
    let components = samples.len() / pixels;
    let needed = pixels * components;

    let mut samples = samples;
    samples.truncate(needed);
    let image = match components {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        n => {
            return Err(Error::ImageEncode(format!(
                "{} color components not supported",
                n
            )))
        }
    };
    image.ok_or_else(|| Error::ImageEncode("sample buffer too short".into()))
}

/// Encode an image as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

fn filter_names(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![String::from_utf8_lossy(name).to_string()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .map(|name| String::from_utf8_lossy(name).to_string())
            .collect(),
        _ => Vec::new(),
    }
}

fn integer(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .ok()
        .and_then(|value| value.as_i64().ok())
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| {
            Error::ImageEncode(format!("missing {}", String::from_utf8_lossy(key)))
        })
}

fn is_indexed(dict: &Dictionary) -> bool {
    match dict.get(b"ColorSpace") {
        Ok(Object::Array(items)) => {
            matches!(items.first().and_then(|o| o.as_name().ok()), Some(b"Indexed"))
        }
        _ => false,
    }
}
