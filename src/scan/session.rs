use std::{
    thread,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    shared::SharedScanner,
    state::{Response, Scanner},
    worker::{Worker, WorkerStats},
};
use crate::{
    decode::Decoder,
    error::Result,
    frame::FrameSource,
    link::{SchemeMatch, ValidatedUrl},
    opener::LinkOpener,
    prompt::Prompter,
};

/// What scanning does once a link has been handed to the opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AfterVisit {
    #[default]
    Resume,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub scheme_match: SchemeMatch,
    pub decision_cooldown: Duration,
    pub after_visit: AfterVisit,
    /// End after the first decision.
    pub once: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            scheme_match: SchemeMatch::default(),
            decision_cooldown: Duration::from_millis(200),
            after_visit: AfterVisit::default(),
            once: false,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub visited: Vec<ValidatedUrl>,
    pub dismissed: Vec<ValidatedUrl>,
    /// `None` when a live worker was left blocked on its source.
    pub worker: Option<WorkerStats>,
}

// Session
//------------------------------------------------------------------------------

/// One scanning run: frames are decoded on a worker thread while presented
/// links are put to the user on the calling thread.
pub struct Session<P, O> {
    opts: SessionOptions,
    prompter: P,
    opener: O,
}

impl<P: Prompter, O: LinkOpener> Session<P, O> {
    pub fn new(opts: SessionOptions, prompter: P, opener: O) -> Self {
        Self { opts, prompter, opener }
    }

    pub fn run<S, D>(&mut self, source: S, decoder: D) -> Result<SessionSummary>
    where
        S: FrameSource + 'static,
        D: Decoder + 'static,
    {
        let scanner =
            SharedScanner::new(Scanner::new(self.opts.scheme_match, self.opts.decision_cooldown));
        let worker = Worker::spawn(source, decoder, scanner.clone())?;

        let mut summary = SessionSummary::default();
        let served = self.serve(&worker, &scanner, &mut summary);

        scanner.stop();
        summary.worker = worker.finish()?;
        served?;

        info!(
            "Session over: {} visited, {} dismissed",
            summary.visited.len(),
            summary.dismissed.len()
        );
        Ok(summary)
    }

    fn serve(
        &mut self,
        worker: &Worker,
        scanner: &SharedScanner,
        summary: &mut SessionSummary,
    ) -> Result<()> {
        for url in worker.links() {
            if !self.decide(url, scanner, summary)? || self.opts.once {
                break;
            }
        }
        Ok(())
    }

    // Returns whether scanning goes on
    fn decide(
        &mut self,
        url: ValidatedUrl,
        scanner: &SharedScanner,
        summary: &mut SessionSummary,
    ) -> Result<bool> {
        loop {
            let Some(decision) = self.prompter.prompt(&url)? else {
                info!("No more answers, stopping");
                return Ok(false);
            };

            match scanner.respond(decision, Instant::now()) {
                Response::Visit(link) => {
                    self.opener.open(&link)?;
                    summary.visited.push(link);
                    return match self.opts.after_visit {
                        AfterVisit::Resume => {
                            scanner.resume();
                            Ok(true)
                        }
                        AfterVisit::Stop => Ok(false),
                    };
                }
                Response::Dismissed => {
                    summary.dismissed.push(url);
                    return Ok(true);
                }
                Response::TooEarly { retry_in } => {
                    debug!("Decision too soon after the previous one, asking again");
                    thread::sleep(retry_in);
                }
                Response::NothingPresented => return Ok(true),
            }
        }
    }
}

#[cfg(test)]
mod session_tests {
    use std::{collections::VecDeque, io, io::Cursor, time::Duration};

    use super::{AfterVisit, Session, SessionOptions};
    use crate::{
        decode::DecodeFailure,
        frame::{Frame, RawLumaStream, Rotation},
        link::{CandidatePayload, ValidatedUrl},
        opener::PrintOpener,
        prompt::Prompter,
        scan::Decision,
    };

    struct Scripted(VecDeque<Decision>);

    impl Prompter for Scripted {
        fn prompt(&mut self, _: &ValidatedUrl) -> io::Result<Option<Decision>> {
            Ok(self.0.pop_front())
        }
    }

    fn scripted(decisions: &[Decision]) -> Scripted {
        Scripted(decisions.iter().copied().collect())
    }

    fn by_luma(frame: &Frame) -> Result<CandidatePayload, DecodeFailure> {
        match frame.luma()[0] {
            0 => Err(DecodeFailure::NoSymbol),
            1 => Ok("BEGIN:VCARD".into()),
            n => Ok(format!("https://site{n}.example/").into()),
        }
    }

    fn replay(frames: &[u8]) -> RawLumaStream<Cursor<Vec<u8>>> {
        RawLumaStream::new(Cursor::new(frames.to_vec()), 1, 1, Rotation::R0).unwrap().live(false)
    }

    fn opts() -> SessionOptions {
        SessionOptions { decision_cooldown: Duration::ZERO, ..Default::default() }
    }

    fn hosts(urls: &[ValidatedUrl]) -> Vec<&str> {
        urls.iter().map(ValidatedUrl::host).collect()
    }

    #[test]
    fn test_visit_and_dismiss() {
        let mut opened = Vec::new();
        let prompter = scripted(&[Decision::Exit, Decision::Visit]);
        let mut session = Session::new(opts(), prompter, PrintOpener::new(&mut opened));

        let summary = session.run(replay(&[2, 1, 0, 3]), by_luma).unwrap();
        drop(session);

        assert_eq!(hosts(&summary.dismissed), vec!["site2.example"]);
        assert_eq!(hosts(&summary.visited), vec!["site3.example"]);
        assert_eq!(String::from_utf8(opened).unwrap(), "open https://site3.example/\n");
        assert_eq!(summary.worker.unwrap().rejected, 1);
    }

    #[test]
    fn test_stop_after_visit() {
        let opts = SessionOptions { after_visit: AfterVisit::Stop, ..opts() };
        let prompter = scripted(&[Decision::Visit, Decision::Visit]);
        let mut session = Session::new(opts, prompter, PrintOpener::new(io::sink()));

        let summary = session.run(replay(&[2, 3, 4]), by_luma).unwrap();
        assert_eq!(hosts(&summary.visited), vec!["site2.example"]);
    }

    #[test]
    fn test_once() {
        let opts = SessionOptions { once: true, ..opts() };
        let prompter = scripted(&[Decision::Exit, Decision::Exit]);
        let mut session = Session::new(opts, prompter, PrintOpener::new(io::sink()));

        let summary = session.run(replay(&[2, 3]), by_luma).unwrap();
        assert_eq!(hosts(&summary.dismissed), vec!["site2.example"]);
    }

    #[test]
    fn test_closed_input_ends_session() {
        let mut session = Session::new(opts(), scripted(&[]), PrintOpener::new(io::sink()));
        let summary = session.run(replay(&[2, 3]), by_luma).unwrap();
        assert!(summary.visited.is_empty());
        assert!(summary.dismissed.is_empty());
    }

    #[test]
    fn test_cooldown_delays_rapid_decisions() {
        let opts = SessionOptions { decision_cooldown: Duration::from_millis(30), ..opts() };
        let prompter = scripted(&[Decision::Exit, Decision::Exit, Decision::Exit]);
        let mut session = Session::new(opts, prompter, PrintOpener::new(io::sink()));

        let summary = session.run(replay(&[2, 3]), by_luma).unwrap();
        assert_eq!(hosts(&summary.dismissed), vec!["site2.example", "site3.example"]);
    }
}
