use std::{
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
    vec,
};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::{Frame, Rotation};
use crate::error::{Error, Result};

// Frame source
//------------------------------------------------------------------------------

/// Lazy, non-restartable sequence of frames.
pub trait FrameSource: Iterator<Item = Result<Frame>> + Send {
    /// Live sources keep producing frames whether or not anyone consumes them,
    /// so frames that arrive while scanning is paused are stale and dropped.
    fn is_live(&self) -> bool;
}

// Image files
//------------------------------------------------------------------------------

pub fn is_image_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() && has_image_extension(entry.path())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .map(|e| matches!(e.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "gif" | "webp"))
        .unwrap_or(false)
}

/// Frames read from a single image or from every image below a directory, in
/// file name order. Images are loaded one at a time as frames are pulled.
#[derive(Debug)]
pub struct ImageFiles {
    paths: vec::IntoIter<PathBuf>,
}

impl ImageFiles {
    pub fn open(path: &Path) -> Result<Self> {
        if path.is_file() {
            return Ok(Self { paths: vec![path.to_path_buf()].into_iter() });
        }
        if !path.is_dir() {
            let msg = format!("{} is neither an image nor a directory", path.display());
            return Err(Error::Io(std::io::Error::new(ErrorKind::NotFound, msg)));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            match entry {
                Ok(e) if is_image_file(&e) => paths.push(e.into_path()),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry: {e}"),
            }
        }
        debug!("Found {} image(s) under {}", paths.len(), path.display());

        Ok(Self { paths: paths.into_iter() })
    }

    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl Iterator for ImageFiles {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.next()?;
        debug!("Loading {}", path.display());
        let frame = match image::open(&path) {
            Ok(img) => Frame::from_image(&img),
            Err(source) => Err(Error::Image { path, source }),
        };
        Some(frame)
    }
}

impl FrameSource for ImageFiles {
    fn is_live(&self) -> bool {
        false
    }
}

// Raw luminance stream
//------------------------------------------------------------------------------

/// Largest raw frame accepted, 8192x8192 luminance bytes.
pub const MAX_FRAME_BYTES: usize = 8192 * 8192;

/// Back to back `width * height` luminance planes, e.g. the output of
/// `ffmpeg -pix_fmt gray -f rawvideo -`.
#[derive(Debug)]
pub struct RawLumaStream<R> {
    reader: R,
    width: u32,
    height: u32,
    rotation: Rotation,
    live: bool,
    done: bool,
}

impl<R: Read> RawLumaStream<R> {
    pub fn new(reader: R, width: u32, height: u32, rotation: Rotation) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::ZeroDimension { width, height });
        }
        if width as u64 * height as u64 > MAX_FRAME_BYTES as u64 {
            return Err(Error::FrameTooLarge { width, height, max: MAX_FRAME_BYTES });
        }
        Ok(Self { reader, width, height, rotation, live: true, done: false })
    }

    /// Marks a recorded stream as replayable at the consumer's pace.
    pub fn live(mut self, live: bool) -> Self {
        self.live = live;
        self
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    // Fills as much of buf as the reader allows, returning the bytes read
    fn read_full(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut read = 0;
        while read < buf.len() {
            match self.reader.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(read)
    }
}

impl<R: Read> Iterator for RawLumaStream<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let expected = self.frame_len();
        let mut buf = vec![0; expected];
        let read = match self.read_full(&mut buf) {
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };

        if read == 0 {
            self.done = true;
            return None;
        }
        if read < expected {
            self.done = true;
            return Some(Err(Error::TruncatedFrame { read, expected }));
        }

        Some(Frame::new(buf, self.width, self.height, self.rotation))
    }
}

impl<R: Read + Send> FrameSource for RawLumaStream<R> {
    fn is_live(&self) -> bool {
        self.live
    }
}
