//! Error types for the concept-review workflow.
//!
//! Data-quality problems (empty text, failed extraction) are never errors;
//! they resolve to defaults or omitted fields. Only workflow-sequencing
//! violations and I/O faults surface here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("phase {requested} requires phase {required} to be completed first")]
    PhaseOrder { requested: u8, required: u8 },

    #[error("unknown phase {0}; valid phases are 1-4")]
    UnknownPhase(u8),

    #[error("case {0} not found")]
    CaseNotFound(u64),

    #[error("invalid decision '{0}'; expected 'approve' or 'reject'")]
    InvalidDecision(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}
