//! Test helpers for building real image payloads.

use base64::Engine;
use std::io::Cursor;

/// Builds a `<mime>;base64,<payload>` data URI holding a real PNG of the
/// given size. `seed` varies the pixel content so different seeds produce
/// different bytes (and therefore different content hashes).
pub fn png_data_uri(width: u32, height: u32, seed: u8) -> String {
    let mut img = image::RgbImage::new(width, height);
    if width > 0 && height > 0 {
        img.put_pixel(0, 0, image::Rgb([seed, seed.wrapping_mul(3), 0]));
    }

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("in-memory PNG encode");

    let payload = base64::engine::general_purpose::STANDARD.encode(&buf);
    format!("image/png;base64,{payload}")
}
