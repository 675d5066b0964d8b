//! The calculator contract
//!
//! A topology plugin implements [`WorkloadTopology`]: the per-kind
//! extraction rules that turn a workload document into a per-role
//! replica and resource breakdown. [`Calculator`] wraps any topology
//! and derives the full [`ResourceCalculator`] query surface from
//! those primitives, so the aggregation arithmetic lives in exactly
//! one place.

use std::fmt;

use serde_json::Value;

use crate::error::Result;
use crate::resources::{self, ResourceList, RoleResourceList};
use crate::role::{self, PodRole, ReplicaList};

/// Per-kind extraction rules implemented by a topology plugin
///
/// The replica map and the resource maps are consumed independently:
/// a role that appears in one with a nonzero count implied should
/// appear in the other as well. The adapter does not validate this
/// cross-consistency; it is the plugin author's obligation.
pub trait WorkloadTopology: Send + Sync {
    /// Roles belonging to the primary workload (excludes exporter and init)
    fn app_roles(&self) -> &'static [PodRole];

    /// App roles plus always-co-scheduled sidecars, excluding init
    fn runtime_roles(&self) -> &'static [PodRole];

    /// Replica count per role
    fn role_replicas(&self, doc: &Value) -> Result<ReplicaList>;

    /// Operating mode of the workload, e.g. `"Standalone"` or
    /// `"Sharded"`; kinds with no notion of mode keep the default
    fn mode(&self, _doc: &Value) -> Result<String> {
        Ok(String::new())
    }

    /// Resource limits per role
    fn role_resource_limits(&self, doc: &Value) -> Result<RoleResourceList>;

    /// Resource requests per role
    fn role_resource_requests(&self, doc: &Value) -> Result<RoleResourceList>;
}

/// The query surface served for a registered workload kind
pub trait ResourceCalculator: Send + Sync {
    /// Total replica count over app roles
    fn replicas(&self, doc: &Value) -> Result<i64>;

    /// Replica count per role
    fn role_replicas(&self, doc: &Value) -> Result<ReplicaList>;

    /// Operating mode of the workload
    fn mode(&self, doc: &Value) -> Result<String>;

    /// Peak resource limits across the pod lifecycle
    fn total_resource_limits(&self, doc: &Value) -> Result<ResourceList>;

    /// Peak resource requests across the pod lifecycle
    fn total_resource_requests(&self, doc: &Value) -> Result<ResourceList>;

    /// Resource limits of the primary workload only
    fn app_resource_limits(&self, doc: &Value) -> Result<ResourceList>;

    /// Resource requests of the primary workload only
    fn app_resource_requests(&self, doc: &Value) -> Result<ResourceList>;

    /// Resource limits per role
    fn role_resource_limits(&self, doc: &Value) -> Result<RoleResourceList>;

    /// Resource requests per role
    fn role_resource_requests(&self, doc: &Value) -> Result<RoleResourceList>;
}

impl fmt::Debug for dyn ResourceCalculator + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResourceCalculator")
    }
}

/// Adapter deriving the full query surface from a topology's primitives
///
/// Totals are `max(sum over runtime roles, sum over the init role)`:
/// init containers run sequentially before the runtime containers, so
/// peak consumption is the larger of the two phases, not their sum.
pub struct Calculator<T> {
    topology: T,
}

impl<T: WorkloadTopology> Calculator<T> {
    pub fn new(topology: T) -> Self {
        Self { topology }
    }

    fn total(&self, breakdown: &RoleResourceList) -> ResourceList {
        resources::max(
            &resources::sum_for_roles(breakdown, self.topology.runtime_roles()),
            &resources::sum_for_roles(breakdown, &[role::INIT]),
        )
    }
}

impl<T: WorkloadTopology> ResourceCalculator for Calculator<T> {
    fn replicas(&self, doc: &Value) -> Result<i64> {
        let replicas = self.topology.role_replicas(doc)?;
        Ok(self
            .topology
            .app_roles()
            .iter()
            .map(|r| replicas.get(r).copied().unwrap_or(0))
            .sum())
    }

    fn role_replicas(&self, doc: &Value) -> Result<ReplicaList> {
        self.topology.role_replicas(doc)
    }

    fn mode(&self, doc: &Value) -> Result<String> {
        self.topology.mode(doc)
    }

    fn total_resource_limits(&self, doc: &Value) -> Result<ResourceList> {
        Ok(self.total(&self.topology.role_resource_limits(doc)?))
    }

    fn total_resource_requests(&self, doc: &Value) -> Result<ResourceList> {
        Ok(self.total(&self.topology.role_resource_requests(doc)?))
    }

    fn app_resource_limits(&self, doc: &Value) -> Result<ResourceList> {
        let breakdown = self.topology.role_resource_limits(doc)?;
        Ok(resources::sum_for_roles(&breakdown, self.topology.app_roles()))
    }

    fn app_resource_requests(&self, doc: &Value) -> Result<ResourceList> {
        let breakdown = self.topology.role_resource_requests(doc)?;
        Ok(resources::sum_for_roles(&breakdown, self.topology.app_roles()))
    }

    fn role_resource_limits(&self, doc: &Value) -> Result<RoleResourceList> {
        self.topology.role_resource_limits(doc)
    }

    fn role_resource_requests(&self, doc: &Value) -> Result<RoleResourceList> {
        self.topology.role_resource_requests(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{app_node_resources, container_list_resources, nested_i64};
    use crate::resources::{limits, requests, ResourceSelector, CPU, MEMORY};
    use serde_json::json;

    /// Single-group topology with optional init containers, used to
    /// exercise the adapter arithmetic
    struct SingleGroup;

    impl SingleGroup {
        fn breakdown(&self, doc: &Value, select: ResourceSelector) -> Result<RoleResourceList> {
            let (pod, replicas) = app_node_resources(doc, select, &["spec"])?;
            let init = container_list_resources(doc, select, &["spec", "initContainers"])?;
            Ok([
                (role::DEFAULT, resources::mul(&pod, replicas)),
                (role::INIT, resources::mul(&init, replicas)),
            ]
            .into_iter()
            .collect())
        }
    }

    impl WorkloadTopology for SingleGroup {
        fn app_roles(&self) -> &'static [PodRole] {
            &[role::DEFAULT]
        }

        fn runtime_roles(&self) -> &'static [PodRole] {
            &[role::DEFAULT, role::EXPORTER]
        }

        fn role_replicas(&self, doc: &Value) -> Result<ReplicaList> {
            let replicas = nested_i64(doc, &["spec", "replicas"])?.unwrap_or(1);
            Ok([(role::DEFAULT, replicas)].into_iter().collect())
        }

        fn role_resource_limits(&self, doc: &Value) -> Result<RoleResourceList> {
            self.breakdown(doc, limits)
        }

        fn role_resource_requests(&self, doc: &Value) -> Result<RoleResourceList> {
            self.breakdown(doc, requests)
        }
    }

    #[test]
    fn test_single_replica_unscaled() {
        // spec.replicas absent: one pod, aggregates equal the pod itself
        let doc = json!({
            "spec": {
                "podTemplate": {
                    "spec": {"resources": {"requests": {"cpu": "500m", "memory": "1Gi"}}}
                }
            }
        });
        let calc = Calculator::new(SingleGroup);
        assert_eq!(calc.replicas(&doc).unwrap(), 1);
        let app = calc.app_resource_requests(&doc).unwrap();
        assert_eq!(app[CPU].to_string(), "500m");
        assert_eq!(app[MEMORY].to_string(), "1Gi");
    }

    #[test]
    fn test_replicas_scale_the_aggregate() {
        let doc = json!({
            "spec": {
                "replicas": 3,
                "podTemplate": {
                    "spec": {"resources": {"requests": {"cpu": "500m", "memory": "1Gi"}}}
                }
            }
        });
        let calc = Calculator::new(SingleGroup);
        assert_eq!(calc.replicas(&doc).unwrap(), 3);

        let app = calc.app_resource_requests(&doc).unwrap();
        assert_eq!(app[CPU].to_string(), "1500m");
        assert_eq!(app[MEMORY].to_string(), "3Gi");

        // No init resources: the total is the runtime sum
        assert_eq!(calc.total_resource_requests(&doc).unwrap(), app);
    }

    #[test]
    fn test_init_phase_dominates_when_larger() {
        let doc = json!({
            "spec": {
                "replicas": 2,
                "podTemplate": {
                    "spec": {"resources": {"limits": {"cpu": "200m"}}}
                },
                "initContainers": [
                    {"resources": {"limits": {"cpu": "1", "memory": "1Gi"}}}
                ]
            }
        });
        let calc = Calculator::new(SingleGroup);
        let total = calc.total_resource_limits(&doc).unwrap();
        // init: 2 cores / 2Gi vs runtime: 400m -> init wins per kind
        assert_eq!(total[CPU].to_string(), "2");
        assert_eq!(total[MEMORY].to_string(), "2Gi");

        // the app aggregate never includes the init role
        let app = calc.app_resource_limits(&doc).unwrap();
        assert_eq!(app[CPU].to_string(), "400m");
        assert!(app.get(MEMORY).is_none());
    }

    #[test]
    fn test_mode_defaults_to_empty() {
        let calc = Calculator::new(SingleGroup);
        assert_eq!(calc.mode(&json!({})).unwrap(), "");
    }

    #[test]
    fn test_decode_errors_abort_the_aggregate() {
        let doc = json!({
            "spec": {
                "replicas": 2,
                "podTemplate": {
                    "spec": {"resources": {"requests": {"cpu": "fast"}}}
                }
            }
        });
        let calc = Calculator::new(SingleGroup);
        assert!(calc.total_resource_requests(&doc).is_err());
        assert!(calc.app_resource_requests(&doc).is_err());
    }
}
