//! Canned runs with known outcomes.

use crate::patterns::Pattern;
use ringlife_core::{SimulationConfig, TerminationReason};

/// Scenario identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioId {
    /// Top row of a 4x4 board on 2 ranks, settles by generation 3
    Bar,

    /// Oscillator with constant population, ends on the plateau rule
    Blinker,

    /// Lone cell, dies in the first generation
    Single,

    /// 2x2 block, unchanged from the first generation
    StillLife,

    /// Glider that outlives the generation limit
    Glider,

    /// Same random board on 1 to 4 ranks, all results identical
    Decomposition,
}

/// What a scenario must end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    pub reason: TerminationReason,
    pub generation: u64,
    pub final_alive: u64,
}

/// How a scenario is run.
#[derive(Debug, Clone)]
pub struct ScenarioSetup {
    pub config: SimulationConfig,
    pub ranks: usize,
    pub pattern: Pattern,

    /// None when the outcome depends on the seed
    pub expected: Option<Expectation>,
}

impl ScenarioId {
    /// Returns a list of all scenarios.
    pub fn all() -> Vec<ScenarioId> {
        vec![
            ScenarioId::Bar,
            ScenarioId::Blinker,
            ScenarioId::Single,
            ScenarioId::StillLife,
            ScenarioId::Glider,
            ScenarioId::Decomposition,
        ]
    }

    /// Returns the scenario name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Bar => "bar",
            ScenarioId::Blinker => "blinker",
            ScenarioId::Single => "single",
            ScenarioId::StillLife => "still_life",
            ScenarioId::Glider => "glider",
            ScenarioId::Decomposition => "decomposition",
        }
    }

    /// Returns a description of the scenario.
    pub fn description(&self) -> &'static str {
        match self {
            ScenarioId::Bar => "4x4 top bar on 2 ranks: steady state at generation 3, 6 alive",
            ScenarioId::Blinker => "5x5 blinker on 2 ranks: plateau after 10 generations",
            ScenarioId::Single => "3x3 lone cell on 3 ranks: zero population at generation 1",
            ScenarioId::StillLife => "4x4 block on 2 ranks: steady state at generation 1",
            ScenarioId::Glider => "8x8 glider on 4 ranks: generation limit of 5",
            ScenarioId::Decomposition => "24x20 random board: identical result on 1 to 4 ranks",
        }
    }

    /// Returns the run setup and expected outcome.
    pub fn setup(&self) -> ScenarioSetup {
        let expect = |reason, generation, final_alive| {
            Some(Expectation {
                reason,
                generation,
                final_alive,
            })
        };

        match self {
            ScenarioId::Bar => ScenarioSetup {
                config: SimulationConfig::new(4, 4, 50),
                ranks: 2,
                pattern: Pattern::Bar,
                expected: expect(TerminationReason::SteadyState, 3, 6),
            },
            ScenarioId::Blinker => ScenarioSetup {
                config: SimulationConfig::new(5, 5, 50),
                ranks: 2,
                pattern: Pattern::Blinker,
                expected: expect(TerminationReason::PlateauReached, 10, 3),
            },
            ScenarioId::Single => ScenarioSetup {
                config: SimulationConfig::new(3, 3, 50),
                ranks: 3,
                pattern: Pattern::Single,
                expected: expect(TerminationReason::ZeroPopulation, 1, 0),
            },
            ScenarioId::StillLife => ScenarioSetup {
                config: SimulationConfig::new(4, 4, 50),
                ranks: 2,
                pattern: Pattern::Block,
                expected: expect(TerminationReason::SteadyState, 1, 4),
            },
            ScenarioId::Glider => ScenarioSetup {
                config: SimulationConfig::new(8, 8, 5),
                ranks: 4,
                pattern: Pattern::Glider,
                expected: expect(TerminationReason::GenerationLimit, 5, 5),
            },
            ScenarioId::Decomposition => ScenarioSetup {
                config: SimulationConfig::new(24, 20, 100),
                ranks: 4,
                pattern: Pattern::Random,
                expected: None,
            },
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bar" => Ok(ScenarioId::Bar),
            "blinker" => Ok(ScenarioId::Blinker),
            "single" => Ok(ScenarioId::Single),
            "still_life" | "stilllife" | "block" => Ok(ScenarioId::StillLife),
            "glider" => Ok(ScenarioId::Glider),
            "decomposition" => Ok(ScenarioId::Decomposition),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for scenario in ScenarioId::all() {
            assert_eq!(scenario.name().parse::<ScenarioId>(), Ok(scenario));
            assert_eq!(scenario.to_string(), scenario.name());
        }
        assert!("time_warp".parse::<ScenarioId>().is_err());
    }

    #[test]
    fn test_setups_are_valid() {
        for scenario in ScenarioId::all() {
            let setup = scenario.setup();
            assert_eq!(setup.config.validate(setup.ranks), Ok(()), "{scenario}");
            assert!(setup.pattern.board(setup.config.rows, setup.config.cols).is_ok());
        }
    }
}
