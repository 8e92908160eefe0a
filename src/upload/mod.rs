//! Upload of user files to the graph-processing service.

pub mod client;
pub mod orchestrator;

pub use client::{AnalysisClient, UploadFile};
pub use orchestrator::{UploadOrchestrator, UploadOutcome, UploadStatus, UploadTicket};
