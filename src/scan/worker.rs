use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use tracing::{debug, trace, warn};

use super::{shared::SharedScanner, state::Offer};
use crate::{
    decode::Decoder,
    error::{Error, Result},
    frame::FrameSource,
    link::ValidatedUrl,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    /// Frames pulled from the source, readable or not.
    pub frames: usize,
    pub unreadable: usize,
    /// Live frames that arrived while scanning was not accepting candidates.
    pub dropped: usize,
    pub decoded: usize,
    pub rejected: usize,
    /// Decoded while a link was presented or scanning was paused.
    pub discarded: usize,
    pub presented: usize,
}

// Worker
//------------------------------------------------------------------------------

/// Background thread pulling frames one at a time, in arrival order, and
/// offering every decoded payload to the shared scanner. Presented links are
/// forwarded over a channel.
#[derive(Debug)]
pub struct Worker {
    handle: JoinHandle<WorkerStats>,
    links: Receiver<ValidatedUrl>,
    live: bool,
}

impl Worker {
    pub fn spawn<S, D>(source: S, decoder: D, scanner: SharedScanner) -> Result<Self>
    where
        S: FrameSource + 'static,
        D: Decoder + 'static,
    {
        let live = source.is_live();
        let (tx, links) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("plainqr-scan".into())
            .spawn(move || scan_frames(source, decoder, scanner, tx))?;
        Ok(Self { handle, links, live })
    }

    pub fn links(&self) -> &Receiver<ValidatedUrl> {
        &self.links
    }

    /// Waits for the worker to wind down. The scanner should be stopped first.
    ///
    /// A live worker may sit in a blocking read for a frame that never comes;
    /// it is left to die with the process and `None` is returned.
    pub fn finish(self) -> Result<Option<WorkerStats>> {
        let returning = matches!(self.links.try_recv(), Err(TryRecvError::Disconnected));
        drop(self.links);
        if self.live && !returning && !self.handle.is_finished() {
            debug!("Leaving live scan worker blocked on its source");
            return Ok(None);
        }
        self.handle.join().map(Some).map_err(|_| Error::WorkerPanicked)
    }
}

fn scan_frames<S, D>(
    source: S,
    mut decoder: D,
    scanner: SharedScanner,
    tx: Sender<ValidatedUrl>,
) -> WorkerStats
where
    S: FrameSource,
    D: Decoder,
{
    let live = source.is_live();
    let mut stats = WorkerStats::default();

    for frame in source {
        if scanner.is_stopped() {
            break;
        }
        stats.frames += 1;

        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                warn!("Skipping frame {}: {e}", stats.frames);
                stats.unreadable += 1;
                continue;
            }
        };

        if live {
            if !scanner.is_scanning() {
                stats.dropped += 1;
                continue;
            }
        } else if !scanner.wait_scanning() {
            break;
        }

        let payload = match decoder.decode(&frame) {
            Ok(p) => p,
            Err(e) => {
                trace!("Frame {}: {e}", stats.frames);
                continue;
            }
        };
        drop(frame);
        stats.decoded += 1;

        match scanner.offer(payload) {
            Offer::Presented(url) => {
                stats.presented += 1;
                if tx.send(url).is_err() {
                    break;
                }
            }
            Offer::Rejected(_) => stats.rejected += 1,
            Offer::Busy | Offer::Discarded => {
                debug!("Scanning not accepting candidates, discarding frame {}", stats.frames);
                stats.discarded += 1;
            }
        }
    }

    debug!("Scan worker done: {stats:?}");
    stats
}
