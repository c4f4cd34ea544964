use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

/// Plane count reported by images whose pixels are interleaved in one buffer.
pub const PACKED: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Bgrx,
    Bgra,
    Rgbx,
    Rgba,
    Bgr,
    Rgb,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgr | Self::Rgb => 3,
            _ => 4,
        }
    }

    pub fn depth(self) -> u32 {
        match self {
            Self::Bgra | Self::Rgba => 32,
            _ => 24,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bgrx => "BGRX",
            Self::Bgra => "BGRA",
            Self::Rgbx => "RGBX",
            Self::Rgba => "RGBA",
            Self::Bgr => "BGR",
            Self::Rgb => "RGB",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "BGRX" => Ok(Self::Bgrx),
            "BGRA" => Ok(Self::Bgra),
            "RGBX" => Ok(Self::Rgbx),
            "RGBA" => Ok(Self::Rgba),
            "BGR" => Ok(Self::Bgr),
            "RGB" => Ok(Self::Rgb),
            _ => Err(Error::UnknownPixelFormat(s.to_string())),
        }
    }
}

/// Raw pixels borrowed from a capture buffer.
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    pub width: u32,
    pub height: u32,
    pub rowstride: usize,
    pub pixel_format: PixelFormat,
    pub planes: usize,
    pub pixels: &'a [u8],
}

impl<'a> RawImage<'a> {
    /// Wraps a tightly packed buffer, rejecting one too short for the geometry.
    pub fn packed(pixels: &'a [u8], width: u32, height: u32, pixel_format: PixelFormat) -> Result<Self> {
        let rowstride = width as usize * pixel_format.bytes_per_pixel();
        let expected = rowstride * height as usize;
        if pixels.len() < expected {
            return Err(Error::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            rowstride,
            pixel_format,
            planes: PACKED,
            pixels: &pixels[..expected],
        })
    }

    pub fn depth(&self) -> u32 {
        self.pixel_format.depth()
    }
}
