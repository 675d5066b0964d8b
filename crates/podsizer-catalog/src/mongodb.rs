//! MongoDB workload topology
//!
//! A MongoDB document runs in one of three modes. Standalone and
//! ReplicaSet keep a single pod group under `spec` (sized by
//! `spec.replicas`); Sharded moves the groups under
//! `spec.shardTopology` with separate shard, config-server and
//! `mongos` router sections. The exporter sidecar, when configured
//! under `spec.monitor.prometheus`, rides along with every pod.

use serde_json::Value;

use podsizer_core::document::{app_node_resources, container_resources, get_field, nested_i64};
use podsizer_core::resources::{self, ResourceSelector, RoleResourceList};
use podsizer_core::role::{self, PodRole, ReplicaList};
use podsizer_core::{Calculator, GroupVersionKind, Registry, Result, WorkloadTopology};

use crate::{MODE_REPLICA_SET, MODE_SHARDED, MODE_STANDALONE};

/// Kind identifier served by this module
pub fn gvk() -> GroupVersionKind {
    GroupVersionKind::new("dbs.podsizer.dev", "v1alpha1", "MongoDB")
}

/// Install the MongoDB calculator into a registry
pub fn register(registry: &mut Registry) {
    registry.register(gvk(), Calculator::new(MongoDb));
}

const APP_ROLES: &[PodRole] = &[
    role::DEFAULT,
    role::TOTAL_SHARD,
    role::CONFIG_SERVER,
    role::ROUTER,
];

const RUNTIME_ROLES: &[PodRole] = &[
    role::DEFAULT,
    role::TOTAL_SHARD,
    role::CONFIG_SERVER,
    role::ROUTER,
    role::EXPORTER,
];

pub(crate) struct MongoDb;

impl MongoDb {
    fn breakdown(&self, doc: &Value, select: ResourceSelector) -> Result<RoleResourceList> {
        let exporter = container_resources(doc, select, &["spec", "monitor", "prometheus"])?;

        if let Some(topology) = shard_topology(doc)? {
            let shards = nested_i64(topology, &["shard", "shards"])?.unwrap_or(0);
            let (shard, shard_replicas) = app_node_resources(topology, select, &["shard"])?;
            let (config, config_replicas) =
                app_node_resources(topology, select, &["configServer"])?;
            let (router, router_replicas) = app_node_resources(topology, select, &["mongos"])?;

            // one exporter per pod, across every group
            let pods = shards * shard_replicas + config_replicas + router_replicas;
            return Ok([
                (role::TOTAL_SHARD, resources::mul(&shard, shards * shard_replicas)),
                (role::CONFIG_SERVER, resources::mul(&config, config_replicas)),
                (role::ROUTER, resources::mul(&router, router_replicas)),
                (role::EXPORTER, resources::mul(&exporter, pods)),
            ]
            .into_iter()
            .collect());
        }

        let (pod, replicas) = app_node_resources(doc, select, &["spec"])?;
        Ok([
            (role::DEFAULT, resources::mul(&pod, replicas)),
            (role::EXPORTER, resources::mul(&exporter, replicas)),
        ]
        .into_iter()
        .collect())
    }
}

impl WorkloadTopology for MongoDb {
    fn app_roles(&self) -> &'static [PodRole] {
        APP_ROLES
    }

    fn runtime_roles(&self) -> &'static [PodRole] {
        RUNTIME_ROLES
    }

    fn role_replicas(&self, doc: &Value) -> Result<ReplicaList> {
        if let Some(topology) = shard_topology(doc)? {
            let shards = nested_i64(topology, &["shard", "shards"])?.unwrap_or(0);
            let shard_replicas = nested_i64(topology, &["shard", "replicas"])?.unwrap_or(0);
            let config_replicas = nested_i64(topology, &["configServer", "replicas"])?.unwrap_or(0);
            let router_replicas = nested_i64(topology, &["mongos", "replicas"])?.unwrap_or(0);
            return Ok([
                (role::TOTAL_SHARD, shards * shard_replicas),
                (role::SHARD, shards),
                (role::PER_SHARD, shard_replicas),
                (role::CONFIG_SERVER, config_replicas),
                (role::ROUTER, router_replicas),
            ]
            .into_iter()
            .collect());
        }

        let replicas = nested_i64(doc, &["spec", "replicas"])?.unwrap_or(1);
        Ok([(role::DEFAULT, replicas)].into_iter().collect())
    }

    fn mode(&self, doc: &Value) -> Result<String> {
        if shard_topology(doc)?.is_some() {
            return Ok(MODE_SHARDED.to_string());
        }
        match get_field(doc, &["spec", "replicaSet"])? {
            Some(v) if !v.is_null() => Ok(MODE_REPLICA_SET.to_string()),
            _ => Ok(MODE_STANDALONE.to_string()),
        }
    }

    fn role_resource_limits(&self, doc: &Value) -> Result<RoleResourceList> {
        self.breakdown(doc, resources::limits)
    }

    fn role_resource_requests(&self, doc: &Value) -> Result<RoleResourceList> {
        self.breakdown(doc, resources::requests)
    }
}

/// The sharding section, treating an explicit null as unset
fn shard_topology(doc: &Value) -> Result<Option<&Value>> {
    match get_field(doc, &["spec", "shardTopology"])? {
        Some(v) if !v.is_null() => Ok(Some(v)),
        _ => Ok(None),
    }
}
