use std::sync::Mutex;

use crate::build::{BuildRecord, BuildService};
use crate::error::Result;

/// Mock build service for testing without a build server
pub struct MockBuildService {
    record: Mutex<BuildRecord>,
    saves: Mutex<usize>,
}

impl MockBuildService {
    /// Create a mock holding `record`
    pub fn new(record: BuildRecord) -> Self {
        MockBuildService {
            record: Mutex::new(record),
            saves: Mutex::new(0),
        }
    }

    /// Current stored record
    pub fn record(&self) -> BuildRecord {
        self.record
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of times `save` was called
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockBuildService {
    fn default() -> Self {
        Self::new(BuildRecord::default())
    }
}

impl BuildService for MockBuildService {
    fn load(&self) -> Result<BuildRecord> {
        Ok(self.record())
    }

    fn save(&self, record: &BuildRecord) -> Result<()> {
        *self
            .record
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = record.clone();
        *self.saves.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_build_service_round_trip() {
        let service = MockBuildService::default();
        let record = BuildRecord {
            number: "1.0.0.0".to_string(),
            ..Default::default()
        };

        service.save(&record).unwrap();
        assert_eq!(service.load().unwrap(), record);
        assert_eq!(service.save_count(), 1);
    }
}
