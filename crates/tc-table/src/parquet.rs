//! Parquet output backend (feature `parquet`).

use std::fs::File;
use std::path::Path;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::TableWriter;
use crate::TableResult;

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes record batches to a single Snappy-compressed Parquet file.
///
/// `finish()` **must** be called to write the Parquet file footer; files
/// written without calling `finish()` cannot be opened by Parquet readers.
pub struct ParquetTableWriter {
    writer: Option<ArrowWriter<File>>,
}

impl ParquetTableWriter {
    pub fn new(path: &Path, schema: SchemaRef) -> TableResult<Self> {
        let file = File::create(path)?;
        let writer = ArrowWriter::try_new(file, schema, Some(snappy_props()))?;
        Ok(Self { writer: Some(writer) })
    }
}

impl TableWriter for ParquetTableWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> TableResult<()> {
        if batch.num_rows() == 0 {
            return Ok(());
        }
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        writer.write(batch)?;
        Ok(())
    }

    fn finish(&mut self) -> TableResult<()> {
        if let Some(w) = self.writer.take() {
            w.close()?;
        }
        Ok(())
    }
}
