//! Bounded-size materialization of record streams.

use std::collections::VecDeque;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use tracing::debug;

use tc_core::TcResult;

use crate::{TableResult, TableRow};

/// Adapts a fallible record stream into record batches of at most
/// `chunk_size` rows.
///
/// Records are buffered until they expand to `chunk_size` rows; the batch
/// built from them is then sliced, so a single record that expands to many
/// rows (a mean-data interval) still respects the bound.  A stream error is
/// yielded once and ends the iterator; buffered records are dropped.
pub struct RecordBatchChunks<I, T> {
    items:        I,
    chunk_size:   usize,
    pending:      Vec<T>,
    pending_rows: usize,
    ready:        VecDeque<RecordBatch>,
    done:         bool,
}

impl<I, T> RecordBatchChunks<I, T>
where
    I: Iterator<Item = TcResult<T>>,
    T: TableRow,
{
    /// A `chunk_size` of zero is treated as one.
    pub fn new(items: I, chunk_size: usize) -> Self {
        Self {
            items,
            chunk_size: chunk_size.max(1),
            pending: Vec::new(),
            pending_rows: 0,
            ready: VecDeque::new(),
            done: false,
        }
    }

    /// Drain the stream into one batch (empty, with `T`'s schema, when the
    /// stream has no rows).
    pub fn collect_table(self) -> TableResult<RecordBatch> {
        let batches = self.collect::<TableResult<Vec<_>>>()?;
        Ok(concat_batches(&T::schema(), &batches)?)
    }

    fn flush(&mut self) -> TableResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = T::to_record_batch(&self.pending)?;
        self.pending.clear();
        self.pending_rows = 0;

        let rows = batch.num_rows();
        let mut offset = 0;
        while offset < rows {
            let len = self.chunk_size.min(rows - offset);
            self.ready.push_back(batch.slice(offset, len));
            offset += len;
        }
        debug!(rows, batches = self.ready.len(), "record chunk materialized");
        Ok(())
    }
}

impl<I, T> Iterator for RecordBatchChunks<I, T>
where
    I: Iterator<Item = TcResult<T>>,
    T: TableRow,
{
    type Item = TableResult<RecordBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(batch) = self.ready.pop_front() {
                return Some(Ok(batch));
            }
            if self.done {
                return None;
            }
            let step = match self.items.next() {
                Some(Ok(item)) => {
                    self.pending_rows += item.row_count();
                    self.pending.push(item);
                    if self.pending_rows >= self.chunk_size { self.flush() } else { Ok(()) }
                }
                Some(Err(e)) => {
                    self.done = true;
                    self.pending.clear();
                    Err(e.into())
                }
                None => {
                    self.done = true;
                    self.flush()
                }
            };
            if let Err(e) = step {
                self.done = true;
                return Some(Err(e));
            }
        }
    }
}
