//! Running circuits and reporting their results.

pub mod driver;
pub mod report;

pub use driver::{
    DEUTSCH_JOZSA_SHOTS, QAOA_SHOTS, Run, execute, execute_on_least_busy, hardware_filter,
    local_simulator, run_on, select_backend,
};
pub use report::{BAR_WIDTH, Histogram, ReportError, print_summary};
