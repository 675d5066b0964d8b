//! Resource-list arithmetic
//!
//! A [`ResourceList`] maps the closed set of resource kinds (cpu,
//! memory, storage) to parsed amounts. All operations follow the
//! zero-omission convention: a kind whose result is zero is left out
//! of the map entirely, so two lists compare equal without special
//! handling for explicit zeros.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ResourceRequirements as WireResourceRequirements;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::error::Result;
use crate::quantity::{Format, ResourceAmount};
use crate::role::PodRole;

pub const CPU: &str = "cpu";
pub const MEMORY: &str = "memory";
pub const STORAGE: &str = "storage";

/// The closed kind set with the canonical rendering format of sums:
/// cpu is decimal SI, memory and storage are binary SI
const KINDS: [(&str, Format); 3] = [
    (CPU, Format::DecimalSi),
    (MEMORY, Format::BinarySi),
    (STORAGE, Format::BinarySi),
];

/// Resource kind to amount; zero entries are never materialized
pub type ResourceList = BTreeMap<&'static str, ResourceAmount>;

/// Per-role resource breakdown, produced separately for limits and requests
pub type RoleResourceList = BTreeMap<PodRole, ResourceList>;

/// A decoded limits/requests pair with every quantity already parsed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRequirements {
    pub limits: ResourceList,
    pub requests: ResourceList,
}

/// Picks limits or requests out of a decoded pair
pub type ResourceSelector = fn(&ResourceRequirements) -> ResourceList;

/// Selector for the limits side
pub fn limits(rr: &ResourceRequirements) -> ResourceList {
    rr.limits.clone()
}

/// Selector for the requests side
pub fn requests(rr: &ResourceRequirements) -> ResourceList {
    rr.requests.clone()
}

/// Per-kind sum of two lists
pub fn add(x: &ResourceList, y: &ResourceList) -> ResourceList {
    let mut out = ResourceList::new();
    for (kind, format) in KINDS {
        let sum = milli_of(x, kind).saturating_add(milli_of(y, kind));
        if sum != 0 {
            out.insert(kind, ResourceAmount::from_milli(sum, format));
        }
    }
    out
}

/// Scale every amount in `x` by `n`, preserving each amount's format
pub fn mul(x: &ResourceList, n: i64) -> ResourceList {
    let mut out = ResourceList::new();
    for (kind, _) in KINDS {
        if let Some(amount) = x.get(kind) {
            let product = amount.milli().saturating_mul(n);
            if product != 0 {
                out.insert(kind, ResourceAmount::from_milli(product, amount.format()));
            }
        }
    }
    out
}

/// Per-kind maximum; `x` wins ties and the winning amount is carried
/// through unchanged
pub fn max(x: &ResourceList, y: &ResourceList) -> ResourceList {
    let mut out = ResourceList::new();
    for (kind, _) in KINDS {
        let xa = x.get(kind).copied().unwrap_or(ResourceAmount::zero());
        let ya = y.get(kind).copied().unwrap_or(ResourceAmount::zero());
        let winner = if xa.milli() >= ya.milli() { xa } else { ya };
        if !winner.is_zero() {
            out.insert(kind, winner);
        }
    }
    out
}

/// Sum the resource lists of the named roles
///
/// Roles missing from the breakdown contribute zero. The result does
/// not depend on the order of `roles`.
pub fn sum_for_roles(rr: &RoleResourceList, roles: &[PodRole]) -> ResourceList {
    let mut totals = [0i64; KINDS.len()];
    for role in roles {
        if let Some(rl) = rr.get(role) {
            for (i, (kind, _)) in KINDS.iter().enumerate() {
                totals[i] = totals[i].saturating_add(milli_of(rl, kind));
            }
        }
    }

    let mut out = ResourceList::new();
    for (i, (kind, format)) in KINDS.iter().enumerate() {
        if totals[i] != 0 {
            out.insert(kind, ResourceAmount::from_milli(totals[i], *format));
        }
    }
    out
}

fn milli_of(rl: &ResourceList, kind: &str) -> i64 {
    rl.get(kind).map_or(0, ResourceAmount::milli)
}

impl TryFrom<&WireResourceRequirements> for ResourceRequirements {
    type Error = crate::error::CoreError;

    fn try_from(wire: &WireResourceRequirements) -> Result<Self> {
        Ok(Self {
            limits: parse_wire_list(wire.limits.as_ref())?,
            requests: parse_wire_list(wire.requests.as_ref())?,
        })
    }
}

/// Parse a wire-level quantity map
///
/// Every entry is validated, including kinds outside the closed set;
/// only cpu/memory/storage are retained, and zero amounts are dropped.
fn parse_wire_list(wire: Option<&BTreeMap<String, Quantity>>) -> Result<ResourceList> {
    let mut out = ResourceList::new();
    let Some(wire) = wire else {
        return Ok(out);
    };
    for (name, quantity) in wire {
        let amount = ResourceAmount::try_from(quantity)?;
        let Some(kind) = canonical_kind(name) else {
            continue;
        };
        if !amount.is_zero() {
            out.insert(kind, amount);
        }
    }
    Ok(out)
}

fn canonical_kind(name: &str) -> Option<&'static str> {
    match name {
        CPU => Some(CPU),
        MEMORY => Some(MEMORY),
        STORAGE => Some(STORAGE),
        _ => None,
    }
}
