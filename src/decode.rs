//! Bridge between frames and the QR recognizer. Locating and reading symbols is
//! left to `rqrr`; this module only adapts frames to it and turns the raw
//! payload bytes into text.

use encoding_rs::{UTF_8, WINDOWS_1252};
use thiserror::Error;
use tracing::trace;

use crate::{frame::Frame, link::CandidatePayload};

// Decoder
//------------------------------------------------------------------------------

/// Why a frame yielded no candidate. Neither case is an error for the scanner,
/// the frame is simply passed over.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    #[error("No QR symbol found")]
    NoSymbol,
    #[error("QR symbol found but unreadable: {0}")]
    Unreadable(String),
}

pub trait Decoder: Send {
    fn decode(&mut self, frame: &Frame) -> Result<CandidatePayload, DecodeFailure>;
}

impl<F> Decoder for F
where
    F: FnMut(&Frame) -> Result<CandidatePayload, DecodeFailure> + Send,
{
    fn decode(&mut self, frame: &Frame) -> Result<CandidatePayload, DecodeFailure> {
        self(frame)
    }
}

/// Reads the first decodable QR symbol in a frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrDecoder;

impl QrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for QrDecoder {
    fn decode(&mut self, frame: &Frame) -> Result<CandidatePayload, DecodeFailure> {
        let img = frame.upright();
        let (w, h) = img.dimensions();
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
                img.get_pixel(x as u32, y as u32)[0]
            });

        let grids = prepared.detect_grids();
        trace!("Found {} candidate grid(s) in {w}x{h} frame", grids.len());

        let mut last_err = None;
        for grid in grids {
            let mut raw = Vec::new();
            match grid.decode_to(&mut raw) {
                Ok(_meta) => return Ok(CandidatePayload::new(payload_text(&raw))),
                Err(e) => last_err = Some(e.to_string()),
            }
        }

        match last_err {
            Some(e) => Err(DecodeFailure::Unreadable(e)),
            None => Err(DecodeFailure::NoSymbol),
        }
    }
}

// Payload text
//------------------------------------------------------------------------------

/// Interprets payload bytes as UTF-8, falling back to ISO-8859-1, the default
/// QR character set. A leading UTF-8 byte order mark is dropped.
pub fn payload_text(raw: &[u8]) -> String {
    let (text, malformed) = UTF_8.decode_with_bom_removal(raw);
    if !malformed {
        return text.into_owned();
    }
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(raw);
    text.into_owned()
}
