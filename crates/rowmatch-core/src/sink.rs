//! Export seam: the serialization format belongs to the caller.

use rowmatch_model::Dataset;

/// Receives the augmented incoming dataset at the end of a session.
pub trait DatasetSink {
    fn write_dataset(&mut self, dataset: &Dataset) -> anyhow::Result<()>;
}

/// Keeps exported datasets in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub datasets: Vec<Dataset>,
}

impl DatasetSink for MemorySink {
    fn write_dataset(&mut self, dataset: &Dataset) -> anyhow::Result<()> {
        self.datasets.push(dataset.clone());
        Ok(())
    }
}
