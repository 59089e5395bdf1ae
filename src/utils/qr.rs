//! QR code rendering for links sent by email.

use std::io::Cursor;

use image::{ImageFormat, Luma};
use qrcode::QrCode;
use thiserror::Error;

/// Smallest edge, in pixels, of a rendered code
const MIN_QR_SIZE: u32 = 200;

#[derive(Debug, Error)]
pub enum QrRenderError {
    #[error("cannot encode QR code: {0}")]
    Encode(String),
    #[error("cannot write PNG: {0}")]
    Png(#[from] image::ImageError),
}

/// Render `data` as a black-on-white PNG QR code.
pub fn qr_png(data: &str) -> Result<Vec<u8>, QrRenderError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| QrRenderError::Encode(e.to_string()))?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(MIN_QR_SIZE, MIN_QR_SIZE)
        .build();

    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
