//! # plainqr
//!
//! A plain QR link scanner. Frames come in from a frame source, a QR decoder
//! looks for a code in each one, and decoded text that turns out to be an
//! HTTP(S) link is put to the user, who either visits it or dismisses it.
//!
//! ## Features
//!
//! - **Link validation**: [`is_valid_url`] accepts absolute `http`/`https` links with a host
//! - **Host labels**: [`format_host`] turns a link into a short label for display
//! - **Frame sources**: image files, directories of images, or raw 8-bit luminance streams
//!   such as a camera piped through `ffmpeg`
//! - **One link at a time**: scanning pauses while a link is presented and resumes after
//!   the user answers
//!
//! ## Quick Start
//!
//! ### Validating a Payload
//!
//! ```rust
//! use plainqr::{format_host, is_valid_url};
//!
//! assert!(is_valid_url("https://example.com/path"));
//! assert!(!is_valid_url("ftp://example.com"));
//! assert!(!is_valid_url("http://"));
//!
//! assert_eq!(format_host("https://example.com/page?x=1"), "example.com");
//! assert_eq!(format_host("not a url"), "not a url");
//! ```
//!
//! ### Scheme Matching
//!
//! By default only `http` and `https` pass. The looser prefix rule accepts any
//! scheme that starts with `http`.
//!
//! ```rust
//! use plainqr::{is_valid_url_with, SchemeMatch};
//!
//! assert!(!is_valid_url_with("httpfoo://example.com", SchemeMatch::Exact));
//! assert!(is_valid_url_with("httpfoo://example.com", SchemeMatch::Prefix));
//! ```
//!
//! ### Scanning a Directory
//!
//! ```rust,no_run
//! use std::{io, path::Path};
//!
//! use plainqr::{
//!     decode::QrDecoder,
//!     frame::ImageFiles,
//!     opener::PrintOpener,
//!     prompt::AutoPrompter,
//!     scan::{Decision, Session, SessionOptions},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ImageFiles::open(Path::new("photos"))?;
//! let prompter = AutoPrompter::new(Decision::Visit, io::stdout());
//! let opener = PrintOpener::new(io::stdout());
//!
//! let mut session = Session::new(SessionOptions::default(), prompter, opener);
//! let summary = session.run(source, QrDecoder::new())?;
//! println!("{} links visited", summary.visited.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Scanning Model
//!
//! A single worker thread pulls frames in arrival order, decodes them and
//! offers each payload to a shared [`scan::Scanner`]. The first valid link
//! moves the scanner to `Presented`; everything decoded while a link is
//! presented is discarded. Live sources drop frames while scanning is paused,
//! finite sources wait so that every file is considered.

#![allow(clippy::items_after_test_module)]

pub mod config;
pub mod decode;
pub mod error;
pub mod frame;
pub mod link;
pub mod logging;
pub mod opener;
pub mod prompt;
pub mod scan;

pub use error::{Error, Result};
pub use link::{
    format_host, is_valid_url, is_valid_url_with, CandidatePayload, SchemeMatch, ValidatedUrl,
};
