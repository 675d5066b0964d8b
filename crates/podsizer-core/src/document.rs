//! Field extraction over semi-structured workload documents
//!
//! A workload document is an arbitrary `serde_json::Value` tree owned
//! by the caller. The accessors here keep three outcomes distinct:
//! `Ok(Some(..))` for a present field, `Ok(None)` for an absent path
//! (never an error; callers apply the documented default), and an
//! error for a present value of the wrong shape. A malformed
//! sub-document is never silently replaced by a default.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use k8s_openapi::api::core::v1::ResourceRequirements as WireResourceRequirements;

use crate::error::{CoreError, Result};
use crate::resources::{self, ResourceList, ResourceRequirements, ResourceSelector, STORAGE};

/// Walk nested objects by successive keys
///
/// Returns `Ok(None)` if any key along the path is absent, and a
/// [`CoreError::ShapeMismatch`] if an intermediate value is not an
/// object.
pub fn get_field<'a>(doc: &'a Value, path: &[&str]) -> Result<Option<&'a Value>> {
    let mut current = doc;
    for (depth, key) in path.iter().enumerate() {
        let map = current
            .as_object()
            .ok_or_else(|| shape_mismatch(&path[..depth], "object", current))?;
        match map.get(*key) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Integer leaf at `path`; present non-integers are a shape mismatch
pub fn nested_i64(doc: &Value, path: &[&str]) -> Result<Option<i64>> {
    match get_field(doc, path)? {
        None => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| shape_mismatch(path, "integer", v)),
    }
}

/// String leaf at `path`
pub fn nested_str<'a>(doc: &'a Value, path: &[&str]) -> Result<Option<&'a str>> {
    match get_field(doc, path)? {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| shape_mismatch(path, "string", v)),
    }
}

/// Object at `path`
pub fn nested_object<'a>(
    doc: &'a Value,
    path: &[&str],
) -> Result<Option<&'a serde_json::Map<String, Value>>> {
    match get_field(doc, path)? {
        None => Ok(None),
        Some(v) => v
            .as_object()
            .map(Some)
            .ok_or_else(|| shape_mismatch(path, "object", v)),
    }
}

/// A container-like sub-document: anything with a `resources` field
#[derive(Debug, Default, Deserialize)]
struct Container {
    #[serde(default)]
    resources: WireResourceRequirements,
}

/// A storage-claim sub-document (persistent-volume-claim shaped)
#[derive(Debug, Default, Deserialize)]
struct StorageClaim {
    #[serde(default)]
    resources: WireResourceRequirements,
}

/// One homogeneous group of pods: replica count, pod template, storage claim
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppNode {
    #[serde(default)]
    replicas: Option<i64>,
    #[serde(default)]
    pod_template: PodTemplate,
    #[serde(default)]
    storage: StorageClaim,
}

#[derive(Debug, Default, Deserialize)]
struct PodTemplate {
    #[serde(default)]
    spec: PodTemplateSpec,
}

#[derive(Debug, Default, Deserialize)]
struct PodTemplateSpec {
    #[serde(default)]
    resources: WireResourceRequirements,
}

/// Select resources of the single container-like sub-document at `path`
///
/// An absent sub-document contributes an empty list.
pub fn container_resources(
    doc: &Value,
    select: ResourceSelector,
    path: &[&str],
) -> Result<ResourceList> {
    let Some(value) = get_field(doc, path)? else {
        return Ok(ResourceList::new());
    };
    let container: Container = decode(value, path)?;
    let rr = ResourceRequirements::try_from(&container.resources)?;
    Ok(select(&rr))
}

/// Sum selected resources over an array of container-like sub-documents
///
/// Entries that are not objects are skipped; container arrays are
/// allowed to be heterogeneous. Object entries that fail to decode are
/// an error.
pub fn container_list_resources(
    doc: &Value,
    select: ResourceSelector,
    path: &[&str],
) -> Result<ResourceList> {
    let Some(value) = get_field(doc, path)? else {
        return Ok(ResourceList::new());
    };
    let entries = value
        .as_array()
        .ok_or_else(|| shape_mismatch(path, "array", value))?;

    let mut total = ResourceList::new();
    for (index, entry) in entries.iter().enumerate() {
        if !entry.is_object() {
            continue;
        }
        let container: Container =
            serde_json::from_value(entry.clone()).map_err(|source| CoreError::Decode {
                path: format!("{}[{index}]", dotted(path)),
                source,
            })?;
        let rr = ResourceRequirements::try_from(&container.resources)?;
        total = resources::add(&total, &select(&rr));
    }
    Ok(total)
}

/// Select resources of the storage-claim sub-document at `path`
pub fn storage_resources(
    doc: &Value,
    select: ResourceSelector,
    path: &[&str],
) -> Result<ResourceList> {
    let Some(value) = get_field(doc, path)? else {
        return Ok(ResourceList::new());
    };
    let claim: StorageClaim = decode(value, path)?;
    let rr = ResourceRequirements::try_from(&claim.resources)?;
    Ok(select(&rr))
}

/// Decode the app node at `path`: selected pod resources with the
/// storage claim's storage overlaid, plus the replica count
///
/// `replicas` defaults to 1 when the field is absent or null. The
/// claim is authoritative for storage: a pod-level storage entry is
/// replaced by the claim's value, not summed with it. An absent node
/// yields `(empty, 0)`.
pub fn app_node_resources(
    doc: &Value,
    select: ResourceSelector,
    path: &[&str],
) -> Result<(ResourceList, i64)> {
    let Some(value) = get_field(doc, path)? else {
        return Ok((ResourceList::new(), 0));
    };
    let node: AppNode = decode(value, path)?;
    let replicas = node.replicas.unwrap_or(1);

    let pod_rr = ResourceRequirements::try_from(&node.pod_template.spec.resources)?;
    let claim_rr = ResourceRequirements::try_from(&node.storage.resources)?;
    let mut rl = select(&pod_rr);
    let claim = select(&claim_rr);

    rl.remove(STORAGE);
    if let Some(amount) = claim.get(STORAGE) {
        rl.insert(STORAGE, *amount);
    }
    Ok((rl, replicas))
}

fn decode<T: DeserializeOwned>(value: &Value, path: &[&str]) -> Result<T> {
    if !value.is_object() {
        return Err(shape_mismatch(path, "object", value));
    }
    serde_json::from_value(value.clone()).map_err(|source| CoreError::Decode {
        path: dotted(path),
        source,
    })
}

fn shape_mismatch(path: &[&str], expected: &'static str, found: &Value) -> CoreError {
    CoreError::ShapeMismatch {
        path: dotted(path),
        expected,
        found: type_name(found).to_string(),
    }
}

fn dotted(path: &[&str]) -> String {
    if path.is_empty() {
        "document root".to_string()
    } else {
        path.join(".")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
