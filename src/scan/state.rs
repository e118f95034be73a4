use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::link::{CandidatePayload, SchemeMatch, ValidatedUrl};

// States & decisions
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Accepting candidates.
    Scanning,
    /// One link is waiting for the user; further candidates are ignored.
    Presented(ValidatedUrl),
    /// Not accepting candidates until resumed.
    Paused,
    /// Terminal, nothing is accepted any more.
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Decision {
    Visit,
    Exit,
}

/// What happened to an offered candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer {
    Presented(ValidatedUrl),
    /// Not a link, scanning carries on.
    Rejected(CandidatePayload),
    /// Another link is already presented.
    Busy,
    /// Scanning is paused or stopped.
    Discarded,
}

/// Outcome of a user decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The link to open. Scanning is paused until resumed.
    Visit(ValidatedUrl),
    /// Back to scanning.
    Dismissed,
    /// Came in before the cooldown since the previous decision elapsed and
    /// was ignored.
    TooEarly { retry_in: Duration },
    NothingPresented,
}

// Scanner
//------------------------------------------------------------------------------

/// Scan loop state machine. Time is supplied by the caller.
#[derive(Debug, Clone)]
pub struct Scanner {
    state: ScanState,
    policy: SchemeMatch,
    cooldown: Duration,
    last_decision: Option<Instant>,
}

impl Scanner {
    pub fn new(policy: SchemeMatch, cooldown: Duration) -> Self {
        Self { state: ScanState::Scanning, policy, cooldown, last_decision: None }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn policy(&self) -> SchemeMatch {
        self.policy
    }

    pub fn is_scanning(&self) -> bool {
        self.state == ScanState::Scanning
    }

    pub fn is_stopped(&self) -> bool {
        self.state == ScanState::Stopped
    }

    pub fn presented(&self) -> Option<&ValidatedUrl> {
        match &self.state {
            ScanState::Presented(url) => Some(url),
            _ => None,
        }
    }

    pub fn offer(&mut self, payload: CandidatePayload) -> Offer {
        match self.state {
            ScanState::Scanning => {}
            ScanState::Presented(_) => return Offer::Busy,
            ScanState::Paused | ScanState::Stopped => return Offer::Discarded,
        }

        match ValidatedUrl::validate(payload, self.policy) {
            Ok(url) => {
                info!("Presenting link to {}", url.host());
                self.state = ScanState::Presented(url.clone());
                Offer::Presented(url)
            }
            Err(payload) => {
                debug!("Ignoring non-link payload ({} bytes)", payload.len());
                Offer::Rejected(payload)
            }
        }
    }

    pub fn respond(&mut self, decision: Decision, now: Instant) -> Response {
        if self.presented().is_none() {
            return Response::NothingPresented;
        }

        if let Some(last) = self.last_decision {
            let elapsed = now.saturating_duration_since(last);
            if elapsed < self.cooldown {
                return Response::TooEarly { retry_in: self.cooldown - elapsed };
            }
        }
        self.last_decision = Some(now);

        let next = match decision {
            Decision::Visit => ScanState::Paused,
            Decision::Exit => ScanState::Scanning,
        };
        let ScanState::Presented(url) = std::mem::replace(&mut self.state, next) else {
            return Response::NothingPresented;
        };

        info!("{decision:?} chosen for {}", url.host());
        match decision {
            Decision::Visit => Response::Visit(url),
            Decision::Exit => Response::Dismissed,
        }
    }

    /// Stops accepting candidates. A presented link stays presented.
    pub fn pause(&mut self) {
        if self.state == ScanState::Scanning {
            self.state = ScanState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == ScanState::Paused {
            self.state = ScanState::Scanning;
        }
    }

    pub fn stop(&mut self) {
        self.state = ScanState::Stopped;
    }
}
