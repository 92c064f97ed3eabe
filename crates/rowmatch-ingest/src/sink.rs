use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use tracing::info;

use rowmatch_core::DatasetSink;
use rowmatch_model::Dataset;

/// Writes exported datasets as headed CSV.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    target: String,
}

impl CsvSink<File> {
    /// Create (or truncate) `path`, creating parent directories as needed.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output directory: {}", parent.display()))?;
        }
        let writer = WriterBuilder::new()
            .from_path(path)
            .with_context(|| format!("create csv: {}", path.display()))?;
        Ok(Self {
            writer,
            target: path.display().to_string(),
        })
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(output: W) -> Self {
        Self {
            writer: WriterBuilder::new().from_writer(output),
            target: "<writer>".to_string(),
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        let Self { writer, target } = self;
        writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("flush csv {target}: {}", err.error()))
    }
}

impl<W: Write> DatasetSink for CsvSink<W> {
    fn write_dataset(&mut self, dataset: &Dataset) -> Result<()> {
        self.writer
            .write_record(dataset.columns())
            .with_context(|| format!("write header: {}", self.target))?;
        for row in dataset.rows() {
            self.writer
                .write_record(row)
                .with_context(|| format!("write record: {}", self.target))?;
        }
        self.writer
            .flush()
            .with_context(|| format!("flush csv: {}", self.target))?;
        info!(output = %self.target, rows = dataset.len(), "exported dataset");
        Ok(())
    }
}
