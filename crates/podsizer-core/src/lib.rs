//! Podsizer Core - resource aggregation for multi-role workload documents
//!
//! This crate answers "how much cpu / memory / storage does this
//! workload consume, in total and per role" for a workload described
//! by a semi-structured custom-resource document:
//! - `quantity`: Kubernetes quantity parsing and canonical rendering
//! - `resources`: resource-list arithmetic with zero-omission
//! - `document`: typed field extraction over `serde_json::Value`
//! - `calculator`: the per-kind topology contract and the derived
//!   query surface
//! - `registry`: kind-to-calculator lookup
//!
//! Topology plugins for concrete workload kinds live in
//! `podsizer-catalog`.

pub mod calculator;
pub mod document;
pub mod error;
pub mod quantity;
pub mod registry;
pub mod resources;
pub mod role;

pub use calculator::{Calculator, ResourceCalculator, WorkloadTopology};
pub use error::{CoreError, Result};
pub use quantity::{Format, ResourceAmount};
pub use registry::{GroupVersionKind, Registry};
pub use resources::{ResourceList, ResourceRequirements, ResourceSelector, RoleResourceList};
pub use role::{PodRole, ReplicaList};
