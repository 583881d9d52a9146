//! Header logos.
//!
//! Logos are JPEG images embedded as-is. A logo that cannot be read or
//! decoded is logged and left out; the rest of the voucher still renders.

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use super::page::LogoSlot;

#[derive(Debug, Error)]
pub enum LogoError {
    #[error("failed to read logo file: {0}")]
    Io(#[from] std::io::Error),
    #[error("logo data URI is malformed")]
    MalformedDataUri,
    #[error("logo base64 payload is invalid: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("logo is not a baseline or progressive JPEG")]
    NotJpeg,
}

/// Color model of a JPEG, from its component count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
}

impl ColorSpace {
    pub fn pdf_name(self) -> &'static str {
        match self {
            ColorSpace::Gray => "DeviceGray",
            ColorSpace::Rgb => "DeviceRGB",
            ColorSpace::Cmyk => "DeviceCMYK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegImage {
    pub width: u16,
    pub height: u16,
    pub color_space: ColorSpace,
    pub data: Vec<u8>,
}

impl JpegImage {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, LogoError> {
        let (width, height, components) = read_frame_header(&data).ok_or(LogoError::NotJpeg)?;
        if width == 0 || height == 0 {
            return Err(LogoError::NotJpeg);
        }
        let color_space = match components {
            1 => ColorSpace::Gray,
            3 => ColorSpace::Rgb,
            4 => ColorSpace::Cmyk,
            _ => return Err(LogoError::NotJpeg),
        };
        Ok(Self {
            width,
            height,
            color_space,
            data,
        })
    }

    /// Decode a `data:image/jpeg;base64,...` URI. A bare base64 payload is
    /// accepted too.
    pub fn from_data_uri(uri: &str) -> Result<Self, LogoError> {
        let payload = match uri.trim().strip_prefix("data:") {
            Some(rest) => {
                let (meta, payload) = rest.split_once(',').ok_or(LogoError::MalformedDataUri)?;
                if !meta.ends_with(";base64") {
                    return Err(LogoError::MalformedDataUri);
                }
                payload
            }
            None => uri.trim(),
        };
        let bytes = STANDARD.decode(payload.trim())?;
        Self::from_bytes(bytes)
    }

    pub async fn from_file(path: &Path) -> Result<Self, LogoError> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(bytes)
    }
}

/// Scan JPEG markers for the first start-of-frame segment and return
/// width, height and component count.
fn read_frame_header(data: &[u8]) -> Option<(u16, u16, u8)> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];
        // Fill bytes before a marker.
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        let length = usize::from(u16::from_be_bytes([data[pos + 2], data[pos + 3]]));
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let segment = data.get(pos + 4..pos + 2 + length)?;
            if segment.len() < 6 {
                return None;
            }
            let height = u16::from_be_bytes([segment[1], segment[2]]);
            let width = u16::from_be_bytes([segment[3], segment[4]]);
            return Some((width, height, segment[5]));
        }
        if marker == 0xDA || length < 2 {
            return None;
        }
        pos += 2 + length;
    }
    None
}

/// Logos available to the PDF writer, one per header slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoSet {
    pub left: Option<JpegImage>,
    pub right: Option<JpegImage>,
}

impl LogoSet {
    /// Load logos from disk. Failures are logged and the slot left empty.
    pub async fn load(left: Option<&Path>, right: Option<&Path>) -> Self {
        Self {
            left: load_logged(LogoSlot::Left, left).await,
            right: load_logged(LogoSlot::Right, right).await,
        }
    }

    pub fn get(&self, slot: LogoSlot) -> Option<&JpegImage> {
        match slot {
            LogoSlot::Left => self.left.as_ref(),
            LogoSlot::Right => self.right.as_ref(),
        }
    }

    /// Replace slots with logos supplied as data URIs. A payload that fails
    /// to decode keeps whatever the slot held before.
    pub fn with_overrides(mut self, left: Option<&str>, right: Option<&str>) -> Self {
        if let Some(image) = left.and_then(|uri| decode_logged(LogoSlot::Left, uri)) {
            self.left = Some(image);
        }
        if let Some(image) = right.and_then(|uri| decode_logged(LogoSlot::Right, uri)) {
            self.right = Some(image);
        }
        self
    }
}

async fn load_logged(slot: LogoSlot, path: Option<&Path>) -> Option<JpegImage> {
    let path = path?;
    match JpegImage::from_file(path).await {
        Ok(image) => {
            log::info!(
                "Loaded {:?} logo from {} ({}x{})",
                slot,
                path.display(),
                image.width,
                image.height
            );
            Some(image)
        }
        Err(e) => {
            log::warn!("Skipping {:?} logo at {}: {}", slot, path.display(), e);
            None
        }
    }
}

fn decode_logged(slot: LogoSlot, uri: &str) -> Option<JpegImage> {
    match JpegImage::from_data_uri(uri) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("Ignoring {:?} logo supplied with the request: {}", slot, e);
            None
        }
    }
}
