//! JSON export of a run.

use ringlife_core::{GenerationStats, RunReport, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Population of one generation, flattened for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: u64,
    pub alive: u64,
    pub elapsed_sec: f64,
}

impl From<&GenerationStats> for GenerationRecord {
    fn from(stats: &GenerationStats) -> Self {
        Self {
            generation: stats.generation,
            alive: stats.alive,
            elapsed_sec: stats.elapsed.as_secs_f64(),
        }
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExport {
    /// Initial pattern name
    pub pattern: String,

    /// Seed used (random boards only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Configuration of the run
    pub config: SimulationConfig,

    /// Agreed final report
    pub report: RunReport,

    /// Mean seconds per generation
    pub avg_generation_sec: f64,

    /// Per-generation populations
    pub history: Vec<GenerationRecord>,
}

impl RunExport {
    /// Creates an export from a finished run.
    pub fn new(
        pattern: &str,
        config: &SimulationConfig,
        report: &RunReport,
        history: &[GenerationStats],
    ) -> Self {
        Self {
            pattern: pattern.to_string(),
            seed: config.seed,
            config: config.clone(),
            report: report.clone(),
            avg_generation_sec: report.avg_generation_time().as_secs_f64(),
            history: history.iter().map(GenerationRecord::from).collect(),
        }
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringlife_core::TerminationReason;
    use std::time::Duration;

    fn export() -> RunExport {
        let config = SimulationConfig::new(4, 4, 50).with_seed(9);
        let report = RunReport {
            reason: TerminationReason::SteadyState,
            generation: 2,
            final_alive: 6,
            elapsed: Duration::from_millis(10),
            ranks: 2,
            rows: 4,
            cols: 4,
        };
        let history = [
            GenerationStats {
                generation: 1,
                alive: 6,
                elapsed: Duration::from_millis(4),
            },
            GenerationStats {
                generation: 2,
                alive: 6,
                elapsed: Duration::from_millis(10),
            },
        ];
        RunExport::new("bar", &config, &report, &history)
    }

    #[test]
    fn test_json_fields() {
        let value: serde_json::Value = serde_json::from_str(&export().to_json().unwrap()).unwrap();
        assert_eq!(value["pattern"], "bar");
        assert_eq!(value["seed"], 9);
        assert_eq!(value["report"]["reason"], "steady_state");
        assert_eq!(value["report"]["final_alive"], 6);
        assert_eq!(value["history"].as_array().unwrap().len(), 2);
        assert_eq!(value["avg_generation_sec"], 0.005);
    }

    #[test]
    fn test_write_to_file() {
        let path = std::env::temp_dir().join(format!("ringlife-export-{}.json", std::process::id()));
        export().write_to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: RunExport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.report.generation, 2);
        std::fs::remove_file(&path).unwrap();
    }
}
