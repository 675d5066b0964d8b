//! Pod roles and per-role replica counts

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A named class of pods within a workload
///
/// Roles are workload-kind-specific labels; a topology plugin is free
/// to introduce its own with [`PodRole::new`]. Two roles are reserved
/// across all kinds: [`INIT`] (resources consumed only while pods
/// initialize, never concurrently with steady-state roles) and
/// [`EXPORTER`] (an optional metrics sidecar, counted in runtime
/// aggregates but not in app aggregates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PodRole(&'static str);

impl PodRole {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for PodRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The primary pods of a single-group workload
pub const DEFAULT: PodRole = PodRole::new("default");
/// Metrics sidecar, runtime-only (never part of app aggregates)
pub const EXPORTER: PodRole = PodRole::new("exporter");
/// Init containers; mutually exclusive in time with runtime roles
pub const INIT: PodRole = PodRole::new("init");
/// Number of shard groups in a sharded workload
pub const SHARD: PodRole = PodRole::new("shard");
/// Replicas within one shard group
pub const PER_SHARD: PodRole = PodRole::new("perShard");
/// All shard pods across every shard group
pub const TOTAL_SHARD: PodRole = PodRole::new("totalShard");
/// Topology metadata servers of a sharded workload
pub const CONFIG_SERVER: PodRole = PodRole::new("configServer");
/// Query routers of a sharded workload
pub const ROUTER: PodRole = PodRole::new("router");

/// Replica count per pod role; a role absent from the map counts as zero
pub type ReplicaList = BTreeMap<PodRole, i64>;
