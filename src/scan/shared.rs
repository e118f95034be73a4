use std::{
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use super::state::{Decision, Offer, Response, ScanState, Scanner};
use crate::link::CandidatePayload;

/// A [`Scanner`] shared between the frame worker and the session that talks to
/// the user. Every state change wakes a worker waiting for scanning to resume.
#[derive(Debug, Clone)]
pub struct SharedScanner {
    inner: Arc<(Mutex<Scanner>, Condvar)>,
}

impl SharedScanner {
    pub fn new(scanner: Scanner) -> Self {
        Self { inner: Arc::new((Mutex::new(scanner), Condvar::new())) }
    }

    fn lock(&self) -> MutexGuard<'_, Scanner> {
        self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<T>(&self, f: impl FnOnce(&mut Scanner) -> T) -> T {
        let res = {
            let mut guard = self.lock();
            f(&mut *guard)
        };
        self.inner.1.notify_all();
        res
    }

    pub fn state(&self) -> ScanState {
        self.lock().state().clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.lock().is_scanning()
    }

    pub fn is_stopped(&self) -> bool {
        self.lock().is_stopped()
    }

    pub fn offer(&self, payload: CandidatePayload) -> Offer {
        self.update(|sc| sc.offer(payload))
    }

    pub fn respond(&self, decision: Decision, now: Instant) -> Response {
        self.update(|sc| sc.respond(decision, now))
    }

    pub fn pause(&self) {
        self.update(Scanner::pause)
    }

    pub fn resume(&self) {
        self.update(Scanner::resume)
    }

    pub fn stop(&self) {
        self.update(Scanner::stop)
    }

    /// Blocks until the scanner accepts candidates again. Returns `false` once
    /// it has stopped.
    pub fn wait_scanning(&self) -> bool {
        let guard = self.lock();
        let guard = self
            .inner
            .1
            .wait_while(guard, |sc| !sc.is_scanning() && !sc.is_stopped())
            .unwrap_or_else(PoisonError::into_inner);
        guard.is_scanning()
    }
}
