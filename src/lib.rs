pub mod aggregate;
pub mod config;
pub mod error;
pub mod join;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod source;

pub use config::PipelineConfig;
pub use error::{RecordError, RejectedRecord, Series};
pub use pipeline::{run, JoinOutcome, RunSummary};
