use thiserror::Error;

use tc_core::TcError;
use tc_table::TableError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] TcError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("job {job:?} failed: {source}")]
    Job {
        job:    String,
        #[source]
        source: Box<PipelineError>,
    },
}

pub type PipelineResult<T> = Result<T, PipelineError>;
