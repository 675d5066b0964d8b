//! Podsizer Catalog - topology plugins for the supported workload kinds
//!
//! Each module implements the `WorkloadTopology` contract for one
//! workload kind and registers it under its `(group, version, kind)`
//! triple. Callers either construct their own registry with
//! [`default_registry`] (preferred: independent registries compose
//! freely, e.g. in tests) or use the process-wide [`shared`] instance.

pub mod mongodb;
pub mod redis;

use once_cell::sync::Lazy;
use podsizer_core::Registry;

/// Workload modes reported by the calculators in this catalog
pub const MODE_STANDALONE: &str = "Standalone";
pub const MODE_REPLICA_SET: &str = "ReplicaSet";
pub const MODE_SHARDED: &str = "Sharded";
pub const MODE_CLUSTER: &str = "Cluster";
pub const MODE_SENTINEL: &str = "Sentinel";

/// Register every kind in this catalog
pub fn register_all(registry: &mut Registry) {
    mongodb::register(registry);
    redis::register(registry);
}

/// A fresh registry with the whole catalog installed
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    register_all(&mut registry);
    registry
}

/// The shared process-wide registry
///
/// Fully populated inside the initializer, so it satisfies the
/// registry's write-once-then-read-many discipline by construction.
pub fn shared() -> &'static Registry {
    static SHARED: Lazy<Registry> = Lazy::new(default_registry);
    &SHARED
}
