//! End-to-end sizing through the registry

use podsizer_catalog::{default_registry, mongodb, redis, shared};
use podsizer_core::resources::{CPU, MEMORY, STORAGE};
use podsizer_core::role;
use podsizer_core::{CoreError, GroupVersionKind};
use serde_json::Value;

fn doc(yaml: &str) -> Value {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn unknown_kind_is_reported() {
    let registry = default_registry();
    let gvk = GroupVersionKind::new("dbs.podsizer.dev", "v1alpha1", "Cassandra");
    let err = registry.get(&gvk).unwrap_err();
    assert!(matches!(err, CoreError::UnknownKind { ref kind, .. } if kind == "Cassandra"));
}

#[test]
fn shared_registry_serves_every_catalog_kind() {
    assert!(shared().contains(&mongodb::gvk()));
    assert!(shared().contains(&redis::gvk()));
    assert_eq!(shared().kinds().count(), 2);
}

#[test]
fn sizes_a_sharded_mongodb_document() {
    let doc = doc(
        r#"
apiVersion: dbs.podsizer.dev/v1alpha1
kind: MongoDB
metadata:
  name: orders
spec:
  shardTopology:
    shard:
      shards: 2
      replicas: 3
      podTemplate:
        spec:
          resources:
            requests:
              cpu: 200m
              memory: 512Mi
            limits:
              cpu: 400m
              memory: 1Gi
      storage:
        resources:
          requests:
            storage: 10Gi
    configServer:
      replicas: 3
      podTemplate:
        spec:
          resources:
            requests:
              cpu: 100m
              memory: 256Mi
      storage:
        resources:
          requests:
            storage: 2Gi
    mongos:
      replicas: 2
      podTemplate:
        spec:
          resources:
            requests:
              cpu: 100m
              memory: 128Mi
  monitor:
    prometheus:
      resources:
        requests:
          cpu: 25m
          memory: 32Mi
"#,
    );

    let calculator = shared().get(&mongodb::gvk()).unwrap();
    assert_eq!(calculator.mode(&doc).unwrap(), "Sharded");
    assert_eq!(calculator.replicas(&doc).unwrap(), 11);

    let requests = calculator.total_resource_requests(&doc).unwrap();
    assert_eq!(requests[CPU].to_string(), "1975m");
    assert_eq!(requests[MEMORY].to_string(), "4448Mi");
    assert_eq!(requests[STORAGE].to_string(), "66Gi");

    // limits are only set on the shard pods, and the storage claim
    // declares no limits side
    let limits = calculator.total_resource_limits(&doc).unwrap();
    assert_eq!(limits[CPU].to_string(), "2400m");
    assert_eq!(limits[MEMORY].to_string(), "6Gi");
    assert!(limits.get(STORAGE).is_none());

    let by_role = calculator.role_resource_requests(&doc).unwrap();
    assert_eq!(by_role[&role::TOTAL_SHARD][STORAGE].to_string(), "60Gi");
    assert_eq!(by_role[&role::CONFIG_SERVER][CPU].to_string(), "300m");
    assert_eq!(by_role[&role::ROUTER][MEMORY].to_string(), "256Mi");
    assert_eq!(by_role[&role::EXPORTER][CPU].to_string(), "275m");
}

#[test]
fn sizes_a_redis_cluster_document() {
    let doc = doc(
        r#"
apiVersion: dbs.podsizer.dev/v1alpha1
kind: Redis
metadata:
  name: cache
spec:
  mode: Cluster
  cluster:
    master: 3
    replicas: 2
  podTemplate:
    spec:
      resources:
        requests:
          cpu: 250m
          memory: 1Gi
  storage:
    resources:
      requests:
        storage: 5Gi
"#,
    );

    let calculator = shared().get(&redis::gvk()).unwrap();
    assert_eq!(calculator.mode(&doc).unwrap(), "Cluster");
    assert_eq!(calculator.replicas(&doc).unwrap(), 6);

    let requests = calculator.total_resource_requests(&doc).unwrap();
    assert_eq!(requests[CPU].to_string(), "1500m");
    assert_eq!(requests[MEMORY].to_string(), "6Gi");
    assert_eq!(requests[STORAGE].to_string(), "30Gi");
}

#[test]
fn a_decode_failure_aborts_the_whole_aggregate() {
    let doc = doc(
        r#"
spec:
  replicas: 3
  podTemplate:
    spec:
      resources:
        requests:
          cpu: lots
"#,
    );
    let calculator = shared().get(&mongodb::gvk()).unwrap();
    let err = calculator.total_resource_requests(&doc).unwrap_err();
    assert!(matches!(err, CoreError::InvalidQuantity { ref value, .. } if value == "lots"));
}
