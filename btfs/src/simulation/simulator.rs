//! Main simulator harness for deterministic simulation testing.
//!
//! Runs generated operations against a namespace and the reference model
//! side by side, checking them against each other after every step.

// Simulation code legitimately needs cloning for test data
#![allow(clippy::disallowed_methods)]

use crate::index::{Index, MinDegree};
use crate::namespace::{Entry, EntryKind, Namespace, NsPath};

use super::model::Model;
use super::op_gen::{Op, OpGenConfig, OpGenerator};

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Minimum degree of every folder index.
    pub min_degree: MinDegree,
    /// Operation generation configuration.
    pub op_config: OpGenConfig,
    /// Check index invariants of every folder after each operation.
    pub check_every_step: bool,
}

impl SimulatorConfig {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            min_degree: MinDegree::DEFAULT,
            op_config: OpGenConfig::default(),
            check_every_step: true,
        }
    }

    #[must_use]
    pub const fn with_min_degree(mut self, min_degree: MinDegree) -> Self {
        self.min_degree = min_degree;
        self
    }

    #[must_use]
    pub const fn with_op_config(mut self, config: OpGenConfig) -> Self {
        self.op_config = config;
        self
    }

    /// Only check index invariants at the end of the run.
    #[must_use]
    pub const fn without_step_checks(mut self) -> Self {
        self.check_every_step = false;
        self
    }
}

/// An invariant violation found during simulation.
#[derive(Debug, Clone)]
pub struct Violation {
    pub description: String,
    /// Index of the operation after which it was found.
    pub operation_index: usize,
    pub context: String,
}

/// Results from a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    pub seed: u64,
    pub operations_processed: usize,
    pub successful_operations: usize,
    /// Operations both sides rejected.
    pub failed_operations: usize,
    pub violations: Vec<Violation>,
    /// Entries in the namespace at the end of the run.
    pub final_entries: usize,
}

impl SimulationResult {
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Runs a namespace and a model in lockstep.
pub struct Simulator {
    config: SimulatorConfig,
    generator: OpGenerator,
    namespace: Namespace,
    model: Model,
    violations: Vec<Violation>,
}

impl Simulator {
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            generator: OpGenerator::with_config(config.seed, config.op_config.clone()),
            namespace: Namespace::new(config.min_degree),
            model: Model::new(),
            violations: Vec::new(),
            config,
        }
    }

    /// Run `op_count` operations, then check flatten/replay equivalence.
    pub fn run(&mut self, op_count: usize) -> SimulationResult {
        let mut successful_operations = 0;
        let mut failed_operations = 0;

        for index in 0..op_count {
            let op = self.generator.next_op(&self.model);
            match self.apply(&op, index) {
                Some(true) => successful_operations += 1,
                Some(false) => failed_operations += 1,
                None => {}
            }

            self.check_contents(index);
            if self.config.check_every_step {
                self.check_indexes(index);
            }
        }

        self.check_indexes(op_count);
        self.check_replay(op_count);

        SimulationResult {
            seed: self.config.seed,
            operations_processed: op_count,
            successful_operations,
            failed_operations,
            violations: self.violations.clone(),
            final_entries: self.namespace.entry_count(),
        }
    }

    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Apply `op` to both sides.
    ///
    /// Returns whether it succeeded, or `None` if the two sides disagreed.
    fn apply(&mut self, op: &Op, index: usize) -> Option<bool> {
        let (expected, actual) = match op {
            Op::Create { name, kind, parent } => {
                let expected = self.model.create(name, *kind, parent);
                let actual = match kind {
                    EntryKind::File => self.namespace.create_file(name, parent),
                    EntryKind::Folder => self.namespace.create_folder(name, parent),
                };
                (expected, actual.is_ok())
            }
            Op::DeleteFile { name, parent } => (
                self.model.delete_file(name, parent),
                self.namespace.delete_file(name, parent).is_ok(),
            ),
            Op::DeleteFolder { name, parent } => {
                let expected = self.model.delete_folder(name, parent);
                let actual = self.namespace.delete_folder(name, parent).ok();
                if expected != actual {
                    self.violate(
                        index,
                        "recursive delete removed a different number of descendants",
                        format!("{op:?}: expected {expected:?}, got {actual:?}"),
                    );
                    return None;
                }
                (expected.is_some(), actual.is_some())
            }
            Op::Rename { old, new, parent } => (
                self.model.rename(old, new, parent),
                self.namespace.rename(old, new, parent).is_ok(),
            ),
            Op::Move {
                name,
                kind,
                source,
                dest,
            } => {
                let expected = self.model.relocate(name, *kind, source, dest);
                let actual = match kind {
                    None => self.namespace.move_entry(name, source, dest),
                    Some(EntryKind::File) => self.namespace.move_file(name, source, dest),
                    Some(EntryKind::Folder) => self.namespace.move_folder(name, source, dest),
                };
                (expected, actual.is_ok())
            }
        };

        if expected == actual {
            Some(actual)
        } else {
            self.violate(
                index,
                "namespace and model disagree on the outcome",
                format!("{op:?}: model {expected}, namespace {actual}"),
            );
            None
        }
    }

    /// The walk must list exactly the model's paths, in the same order.
    fn check_contents(&mut self, index: usize) {
        let actual: Vec<(NsPath, EntryKind)> = self
            .namespace
            .walk()
            .map(|visit| (visit.path(), visit.entry.kind()))
            .collect();
        let expected: Vec<(NsPath, EntryKind)> = self
            .model
            .entries()
            .iter()
            .map(|(path, kind)| (path.clone(), *kind))
            .collect();

        if actual != expected {
            let first_difference = actual
                .iter()
                .zip(&expected)
                .position(|(a, e)| a != e)
                .unwrap_or_else(|| actual.len().min(expected.len()));
            self.violate(
                index,
                "namespace contents differ from the model",
                format!(
                    "{} entries vs {} expected, first difference at {first_difference}",
                    actual.len(),
                    expected.len()
                ),
            );
        }
    }

    /// Every folder index, the root's included, must be a valid B-tree.
    fn check_indexes(&mut self, index: usize) {
        let mut failures = Vec::new();

        let root = self.namespace.resolve(&NsPath::root()).ok().and_then(Entry::children);
        if let Some(Err(e)) = root.map(Index::check_invariants) {
            failures.push(format!("root: {e}"));
        }
        for visit in self.namespace.walk() {
            if let Some(Err(e)) = visit.entry.children().map(Index::check_invariants) {
                failures.push(format!("{}: {e}", visit.path()));
            }
        }

        for context in failures {
            self.violate(index, "folder index invariant violated", context);
        }
    }

    /// Flattening and replaying must reproduce the namespace exactly.
    fn check_replay(&mut self, index: usize) {
        let records = self.namespace.flatten();
        let (copy, summary) = Namespace::from_records(self.config.min_degree, records.clone());

        if summary.rejected > 0 || summary.restored != records.len() {
            self.violate(
                index,
                "replay rejected records",
                format!("{summary:?} for {} records", records.len()),
            );
        }
        if copy.flatten() != records {
            self.violate(index, "replayed namespace differs", String::new());
        }
        if copy.display().to_string() != self.namespace.display().to_string() {
            self.violate(index, "replayed namespace displays differently", String::new());
        }
    }

    fn violate(&mut self, operation_index: usize, description: &str, context: String) {
        tracing::error!("simulation seed {}: {description} ({context})", self.config.seed);
        self.violations.push(Violation {
            description: description.to_string(),
            operation_index,
            context,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degree(t: usize) -> MinDegree {
        MinDegree::new(t).expect("valid degree")
    }

    #[test]
    fn test_simulator_basic() {
        let mut simulator = Simulator::new(SimulatorConfig::new(12345));
        let result = simulator.run(300);

        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.successful_operations + result.failed_operations, 300);
        assert!(result.successful_operations > 0);
        assert!(result.failed_operations > 0);
    }

    #[test]
    fn test_simulator_deterministic() {
        let mut sim1 = Simulator::new(SimulatorConfig::new(777).with_min_degree(degree(2)));
        let mut sim2 = Simulator::new(SimulatorConfig::new(777).with_min_degree(degree(2)));
        let result1 = sim1.run(200);
        let result2 = sim2.run(200);

        assert_eq!(result1.successful_operations, result2.successful_operations);
        assert_eq!(result1.failed_operations, result2.failed_operations);
        assert_eq!(sim1.namespace().flatten(), sim2.namespace().flatten());
    }

    #[test]
    fn test_simulator_small_degrees() {
        // Small degrees and a wide name pool force deep folder indexes.
        let op_config = OpGenConfig {
            name_pool_size: 64,
            create_weight: 12,
            ..OpGenConfig::default()
        };
        for t in [2, 3] {
            for seed in 0..4 {
                let config = SimulatorConfig::new(seed)
                    .with_min_degree(degree(t))
                    .with_op_config(op_config.clone());
                let result = Simulator::new(config).run(600);
                assert!(result.passed(), "t={t} seed={seed}: {:?}", result.violations);
                assert!(result.final_entries > 0);
            }
        }
    }

    #[test]
    fn test_simulator_delete_heavy() {
        let op_config = OpGenConfig {
            create_weight: 2,
            ..OpGenConfig::default()
        };
        let config = SimulatorConfig::new(99)
            .with_min_degree(degree(2))
            .with_op_config(op_config);
        let result = Simulator::new(config).run(500);
        assert!(result.passed(), "{:?}", result.violations);
    }

    #[test]
    #[ignore] // Long running test
    fn test_simulator_stress() {
        for (seed, t) in (0..50).zip((2..7).cycle()) {
            let config = SimulatorConfig::new(seed)
                .with_min_degree(degree(t))
                .without_step_checks();
            let result = Simulator::new(config).run(5000);
            assert!(result.passed(), "seed={seed}: {:?}", result.violations);
        }
    }
}
