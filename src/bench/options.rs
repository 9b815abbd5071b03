use crate::core::BenchError;

/// How each trial writes its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Unconditional bulk insert.
    #[default]
    Insert,
    /// Replace-or-insert keyed by the record's natural key.
    Upsert,
}

impl WriteMode {
    pub fn needs_key(&self) -> bool {
        matches!(self, WriteMode::Upsert)
    }
}

/// Per-run benchmark settings, taken from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchOptions {
    pub num_docs: usize,
    pub iter: usize,
    pub truncate: bool,
    pub mode: WriteMode,
}

impl BenchOptions {
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.num_docs < 1 {
            return Err(BenchError::InvalidConfiguration(
                "Number of documents must be positive".to_string(),
            ));
        }
        if self.iter < 1 {
            return Err(BenchError::InvalidConfiguration(
                "Number of iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            num_docs: 1000,
            iter: 3,
            truncate: false,
            mode: WriteMode::Insert,
        }
    }
}
