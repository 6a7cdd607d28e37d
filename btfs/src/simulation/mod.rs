//! Deterministic simulation testing of the namespace.
//!
//! A seeded generator produces namespace operations, biased towards paths
//! that exist so most of them do real work. Each operation runs against both
//! the real [`Namespace`](crate::namespace::Namespace) and a flat model that
//! keeps every full path in a sorted map. After each step the simulator
//! checks:
//! - both sides agree on whether the operation succeeded
//! - the namespace's pre-order walk lists exactly the model's paths
//! - every folder index passes its structural invariant check
//!
//! At the end of a run, the namespace is flattened and replayed into a fresh
//! namespace, which must come out identical.
//!
//! Given the same seed, a run is identical.
//!
//! # Usage
//!
//! ```ignore
//! use simulation::{Simulator, SimulatorConfig};
//!
//! let mut sim = Simulator::new(SimulatorConfig::new(12345).with_min_degree(2));
//! let result = sim.run(1000);
//!
//! assert!(result.passed(), "{:?}", result.violations);
//! ```

mod model;
mod simulator;

pub use model::Model;
pub use op_gen::{Op, OpGenConfig, OpGenerator};
pub use simulator::{SimulationResult, Simulator, SimulatorConfig, Violation};
