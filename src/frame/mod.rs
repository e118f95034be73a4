//! Camera frames as handed to the decoder: an 8-bit luminance plane plus the
//! rotation the camera reported for it.

pub mod source;

use std::borrow::Cow;

use image::{imageops, DynamicImage, GrayImage};

use crate::error::{Error, Result};

pub use source::{is_image_file, FrameSource, ImageFiles, RawLumaStream, MAX_FRAME_BYTES};

// Rotation
//------------------------------------------------------------------------------

/// Clockwise rotation that brings a frame upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Self::R0 => 0,
            Self::R90 => 90,
            Self::R180 => 180,
            Self::R270 => 270,
        }
    }
}

impl TryFrom<u32> for Rotation {
    type Error = Error;

    fn try_from(deg: u32) -> Result<Self> {
        match deg {
            0 => Ok(Self::R0),
            90 => Ok(Self::R90),
            180 => Ok(Self::R180),
            270 => Ok(Self::R270),
            _ => Err(Error::InvalidRotation(deg)),
        }
    }
}

// Frame
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    luma: GrayImage,
    rotation: Rotation,
}

impl Frame {
    /// Wraps a planar luminance buffer of exactly `width * height` bytes,
    /// row-major with no padding.
    pub fn new(luma: Vec<u8>, width: u32, height: u32, rotation: Rotation) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize;
        let actual = luma.len();
        if actual != expected {
            return Err(Error::FrameSize { width, height, expected, actual });
        }
        let luma = GrayImage::from_raw(width, height, luma)
            .ok_or(Error::FrameSize { width, height, expected, actual })?;
        Ok(Self { luma, rotation })
    }

    pub fn from_gray(luma: GrayImage) -> Result<Self> {
        let (width, height) = luma.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::ZeroDimension { width, height });
        }
        Ok(Self { luma, rotation: Rotation::R0 })
    }

    pub fn from_image(img: &DynamicImage) -> Result<Self> {
        Self::from_gray(img.to_luma8())
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.luma.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.luma.height()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Raw luminance plane as captured, before rotation.
    pub fn luma(&self) -> &[u8] {
        self.luma.as_raw()
    }

    /// Luminance plane with the reported rotation applied.
    pub fn upright(&self) -> Cow<'_, GrayImage> {
        match self.rotation {
            Rotation::R0 => Cow::Borrowed(&self.luma),
            Rotation::R90 => Cow::Owned(imageops::rotate90(&self.luma)),
            Rotation::R180 => Cow::Owned(imageops::rotate180(&self.luma)),
            Rotation::R270 => Cow::Owned(imageops::rotate270(&self.luma)),
        }
    }
}
