//! CSV log of AI decisions

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::ai::AiDecision;
use crate::core::error::Result;

pub struct DecisionLog {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl DecisionLog {
    /// Create `{dir}/{name}.csv`, replacing any previous file
    pub fn create(dir: &Path, name: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.csv", name));
        let writer = csv::Writer::from_path(&path)?;
        tracing::info!("Logging AI decisions to {:?}", path);
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&mut self, decision: &AiDecision) -> Result<()> {
        self.writer.serialize(decision)?;
        Ok(())
    }

    pub fn record_all(&mut self, decisions: &[AiDecision]) -> Result<()> {
        for decision in decisions {
            self.writer.serialize(decision)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
