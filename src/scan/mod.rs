//! The scan loop. [`Scanner`] is the state machine deciding what happens to
//! each decoded payload; [`Session`] runs it against a frame source, a user
//! and a link opener.

pub mod session;
pub mod shared;
pub mod state;
pub mod worker;

pub use session::{AfterVisit, Session, SessionOptions, SessionSummary};
pub use shared::SharedScanner;
pub use state::{Decision, Offer, Response, ScanState, Scanner};
pub use worker::{Worker, WorkerStats};
