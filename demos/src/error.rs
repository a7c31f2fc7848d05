//! Error type for the pipelines.

use thiserror::Error;

use qsolve_hal::HalError;
use qsolve_ir::IrError;

use crate::config::ConfigError;
use crate::problems::{GraphError, TspError};
use crate::runners::ReportError;
use crate::solvers::SolverError;

/// Anything that can stop a pipeline run.
#[derive(Debug, Error)]
pub enum DemoError {
    /// Circuit construction.
    #[error(transparent)]
    Circuit(#[from] IrError),

    /// Graph construction.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// TSP encoding or route decoding.
    #[error(transparent)]
    Tsp(#[from] TspError),

    /// Backend selection or execution.
    #[error(transparent)]
    Backend(#[from] HalError),

    /// Eigensolver or eigenstate decoding.
    #[error(transparent)]
    Solver(#[from] SolverError),

    /// Histogram checks.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Config file.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cost and mixer angle lists differ in length.
    #[error("{gammas} cost angles but {betas} mixer angles")]
    AngleMismatch {
        /// Number of cost angles.
        gammas: usize,
        /// Number of mixer angles.
        betas: usize,
    },
}

/// Result alias for the pipelines.
pub type DemoResult<T> = Result<T, DemoError>;
