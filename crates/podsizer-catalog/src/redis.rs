//! Redis workload topology
//!
//! `spec.mode` selects Standalone, Sentinel or Cluster. Standalone
//! and Sentinel size a single pod group by `spec.replicas`; Cluster
//! sizes `spec.cluster.master` shard groups of `spec.cluster.replicas`
//! pods each, all running the same pod template under `spec`.

use serde_json::Value;

use podsizer_core::document::{app_node_resources, container_resources, nested_i64, nested_str};
use podsizer_core::resources::{self, ResourceSelector, RoleResourceList};
use podsizer_core::role::{self, PodRole, ReplicaList};
use podsizer_core::{Calculator, GroupVersionKind, Registry, Result, WorkloadTopology};

use crate::{MODE_CLUSTER, MODE_STANDALONE};

/// Kind identifier served by this module
pub fn gvk() -> GroupVersionKind {
    GroupVersionKind::new("dbs.podsizer.dev", "v1alpha1", "Redis")
}

/// Install the Redis calculator into a registry
pub fn register(registry: &mut Registry) {
    registry.register(gvk(), Calculator::new(Redis));
}

const APP_ROLES: &[PodRole] = &[role::DEFAULT];
const RUNTIME_ROLES: &[PodRole] = &[role::DEFAULT, role::EXPORTER];

pub(crate) struct Redis;

impl Redis {
    fn breakdown(&self, doc: &Value, select: ResourceSelector) -> Result<RoleResourceList> {
        let exporter = container_resources(doc, select, &["spec", "monitor", "prometheus"])?;
        let (pod, mut replicas) = app_node_resources(doc, select, &["spec"])?;

        if cluster_mode(doc)? {
            replicas = cluster_pods(doc)?;
        }

        Ok([
            (role::DEFAULT, resources::mul(&pod, replicas)),
            (role::EXPORTER, resources::mul(&exporter, replicas)),
        ]
        .into_iter()
        .collect())
    }
}

impl WorkloadTopology for Redis {
    fn app_roles(&self) -> &'static [PodRole] {
        APP_ROLES
    }

    fn runtime_roles(&self) -> &'static [PodRole] {
        RUNTIME_ROLES
    }

    fn role_replicas(&self, doc: &Value) -> Result<ReplicaList> {
        if cluster_mode(doc)? {
            let masters = nested_i64(doc, &["spec", "cluster", "master"])?.unwrap_or(0);
            let per_master = nested_i64(doc, &["spec", "cluster", "replicas"])?.unwrap_or(0);
            return Ok([
                (role::DEFAULT, masters * per_master),
                (role::TOTAL_SHARD, masters * per_master),
                (role::SHARD, masters),
                (role::PER_SHARD, per_master),
            ]
            .into_iter()
            .collect());
        }

        let replicas = nested_i64(doc, &["spec", "replicas"])?.unwrap_or(1);
        Ok([(role::DEFAULT, replicas)].into_iter().collect())
    }

    fn mode(&self, doc: &Value) -> Result<String> {
        Ok(nested_str(doc, &["spec", "mode"])?
            .unwrap_or(MODE_STANDALONE)
            .to_string())
    }

    fn role_resource_limits(&self, doc: &Value) -> Result<RoleResourceList> {
        self.breakdown(doc, resources::limits)
    }

    fn role_resource_requests(&self, doc: &Value) -> Result<RoleResourceList> {
        self.breakdown(doc, resources::requests)
    }
}

fn cluster_mode(doc: &Value) -> Result<bool> {
    Ok(nested_str(doc, &["spec", "mode"])? == Some(MODE_CLUSTER))
}

fn cluster_pods(doc: &Value) -> Result<i64> {
    let masters = nested_i64(doc, &["spec", "cluster", "master"])?.unwrap_or(0);
    let per_master = nested_i64(doc, &["spec", "cluster", "replicas"])?.unwrap_or(0);
    Ok(masters * per_master)
}
