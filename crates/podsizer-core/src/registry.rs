//! Workload-kind registry
//!
//! Maps a `(group, version, kind)` triple to the calculator that
//! understands its document schema. The intended lifecycle is
//! write-once-then-read-many: populate the registry fully (usually at
//! process start), then serve lookups. Lookups are safe to share
//! across threads; the registry provides no internal locking, so
//! interleaving registration with concurrent lookups requires
//! external synchronization by the caller.
//!
//! Registries are plain values: construct one per process, or several
//! independent ones (tests, multi-tenant callers) and pass them where
//! they are needed.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::calculator::ResourceCalculator;
use crate::error::{CoreError, Result};

/// Identity of a workload kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
    }
}

/// Kind-to-calculator lookup table
#[derive(Default)]
pub struct Registry {
    calculators: HashMap<GroupVersionKind, Box<dyn ResourceCalculator>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the calculator for a kind (last writer wins)
    pub fn register<C>(&mut self, gvk: GroupVersionKind, calculator: C)
    where
        C: ResourceCalculator + 'static,
    {
        let replaced = self
            .calculators
            .insert(gvk.clone(), Box::new(calculator))
            .is_some();
        debug!(%gvk, replaced, "registered calculator");
    }

    /// Look up the calculator for a kind
    pub fn get(&self, gvk: &GroupVersionKind) -> Result<&dyn ResourceCalculator> {
        match self.calculators.get(gvk) {
            Some(calculator) => Ok(calculator.as_ref()),
            None => {
                debug!(%gvk, "no calculator registered");
                Err(CoreError::UnknownKind {
                    group: gvk.group.clone(),
                    version: gvk.version.clone(),
                    kind: gvk.kind.clone(),
                })
            }
        }
    }

    pub fn contains(&self, gvk: &GroupVersionKind) -> bool {
        self.calculators.contains_key(gvk)
    }

    /// Registered kinds, in no particular order
    pub fn kinds(&self) -> impl Iterator<Item = &GroupVersionKind> {
        self.calculators.keys()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.calculators.keys().collect::<Vec<_>>())
            .finish()
    }
}
