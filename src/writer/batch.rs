use log::info;
use serde_json::Value;
use crate::core::error::Result;
use crate::writer::index_writer::IndexWriter;

/// Batch writer for bulk ingestion
///
/// The cache is cleared once in `finish`; resident files are released every
/// `free_interval` documents.
pub struct BatchWriter<'a> {
    pub writer: &'a IndexWriter,
    pub free_interval: usize,
    pub count: usize,
}

impl<'a> BatchWriter<'a> {
    pub fn new(writer: &'a IndexWriter, free_interval: usize) -> Self {
        BatchWriter {
            writer,
            free_interval,
            count: 0,
        }
    }

    pub fn add(&mut self, document: &Value) -> Result<()> {
        self.writer.update_deferred(document)?;
        self.count += 1;

        if self.free_interval > 0 && self.count % self.free_interval == 0 {
            self.writer.free();
        }

        Ok(())
    }

    /// Returns the number of documents indexed.
    pub fn finish(self) -> Result<usize> {
        self.writer.free();
        self.writer.clear_cache()?;
        info!("Indexed a batch of {} documents", self.count);
        Ok(self.count)
    }
}
