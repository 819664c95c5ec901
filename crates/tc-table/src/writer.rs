//! The `TableWriter` trait implemented by all backend writers.

use arrow::record_batch::RecordBatch;

use crate::TableResult;

/// Trait implemented by the CSV and Parquet writers.
///
/// A writer is bound to one schema when created; every batch must match it.
pub trait TableWriter {
    /// Append the rows of `batch`.
    fn write_batch(&mut self, batch: &RecordBatch) -> TableResult<()>;

    /// Flush and close the underlying file.
    ///
    /// Idempotent.
    fn finish(&mut self) -> TableResult<()>;
}

/// Write every batch of a stream, then finish the writer.  Returns the number
/// of rows written.  The writer is finished only if every batch succeeded.
pub fn write_all<W, I>(writer: &mut W, batches: I) -> TableResult<usize>
where
    W: TableWriter + ?Sized,
    I: IntoIterator<Item = TableResult<RecordBatch>>,
{
    let mut rows = 0;
    for batch in batches {
        let batch = batch?;
        writer.write_batch(&batch)?;
        rows += batch.num_rows();
    }
    writer.finish()?;
    Ok(rows)
}
