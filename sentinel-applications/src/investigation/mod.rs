//! Investigation Module
//!
//! Owns the investigation session state machine: query generation, simulated
//! searches, suggestions and summaries, with single-source-of-truth state and
//! an event stream for presentation layers.

pub mod manager;
pub mod session;
pub mod types;

pub use manager::{InvestigationManager, SearchDispatch};
pub use session::{InvestigationSession, SearchRejection, SearchTicket};
pub use types::*;
