//! Error taxonomy of the pipeline.
//!
//! Every variant is fatal to the run. The pipeline is one-shot
//! compute-and-report, so nothing is retried and nothing is rolled back.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FemError {
  /// Bad element degree, malformed rectangle bounds or an unsupported
  /// solver/form configuration.
  #[error("invalid configuration: {reason}")]
  InvalidConfiguration { reason: String },

  /// Out-of-range entity indices or non-manifold facet incidence.
  #[error("topology error: {reason}")]
  Topology { reason: String },

  /// The assembled system was rejected by the factorization backend.
  #[error("linear solve failed: {reason}")]
  LinearSolve { reason: String },

  /// A collective went wrong, e.g. a worker abandoned the reduction.
  #[error("collective reduction failed: {reason}")]
  Reduction { reason: String },
}

pub type FemResult<T> = Result<T, FemError>;
