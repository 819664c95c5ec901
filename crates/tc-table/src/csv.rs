//! CSV output backend.
//!
//! One file per table.  The header row comes from the schema the writer is
//! created with; cells are rendered with Arrow's display formatting, nulls as
//! empty cells and timestamps as `YYYY-MM-DDTHH:MM:SS`.

use std::fs::File;
use std::path::Path;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use csv::Writer;

use crate::writer::TableWriter;
use crate::{TableError, TableResult};

/// Writes record batches to a single CSV file.
pub struct CsvTableWriter {
    out:      Writer<File>,
    schema:   SchemaRef,
    finished: bool,
}

impl CsvTableWriter {
    /// Create (or truncate) `path` and write the header row.
    pub fn new(path: &Path, schema: SchemaRef) -> TableResult<Self> {
        Self::with_delimiter(path, schema, b',')
    }

    pub fn with_delimiter(path: &Path, schema: SchemaRef, delimiter: u8) -> TableResult<Self> {
        let mut out = csv::WriterBuilder::new().delimiter(delimiter).from_path(path)?;
        out.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;
        Ok(Self { out, schema, finished: false })
    }
}

impl TableWriter for CsvTableWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> TableResult<()> {
        if batch.schema().fields() != self.schema.fields() {
            return Err(TableError::InvalidTable(
                "batch schema does not match the CSV header".to_owned(),
            ));
        }
        let mut record = Vec::with_capacity(batch.num_columns());
        for row in 0..batch.num_rows() {
            record.clear();
            for column in batch.columns() {
                record.push(array_value_to_string(column, row)?);
            }
            self.out.write_record(&record)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> TableResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.out.flush()?;
        Ok(())
    }
}
