//! Resource bundle lookup.
//!
//! A strongly typed resource class `Namespace.Strings` reads its values from the
//! embedded resource `Namespace.Strings.resources`. Looking a value up means
//! finding that manifest entry, parsing it as a string table and reading one key.
//!
//! [`lookup_resource_string`] does this without keeping anything. Within an
//! analysis pass the same table is typically hit once per `Dispose(bool)` method,
//! so [`ResourceCache`] keeps parsed tables keyed by assembly and resource name
//! for the lifetime of the pass. The cache is safe to share between the worker
//! threads of a parallel run.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use dashmap::DashMap;

use crate::{
    analysis::AnalysisConfig,
    metadata::{resources::StringTable, CilAssembly},
};

/// Suffix appended to a resource class name to get its backing manifest resource.
pub const RESOURCE_TABLE_SUFFIX: &str = ".resources";

/// The name of the manifest resource backing the resource class `declaring_type`.
#[must_use]
pub fn resource_table_name(declaring_type: &str) -> String {
    format!("{declaring_type}{RESOURCE_TABLE_SUFFIX}")
}

/// Look up `key` in the resource table backing `declaring_type`.
///
/// Returns `None` if the assembly embeds no such resource, if the blob cannot be
/// parsed, or if the key is absent. Resource names and keys match exactly and
/// case-sensitively. The parsed table is dropped before returning.
#[must_use]
pub fn lookup_resource_string(
    declaring_type: &str,
    key: &str,
    assembly: &CilAssembly,
) -> Option<String> {
    let table = load_table(assembly, &resource_table_name(declaring_type))?;
    table.get(key).map(str::to_string)
}

fn load_table(assembly: &CilAssembly, resource: &str) -> Option<StringTable> {
    let Some(blob) = assembly.resource(resource) else {
        log::debug!("{}: no embedded resource {}", assembly.name(), resource);
        return None;
    };

    match StringTable::from_blob(blob) {
        Ok(table) => Some(table),
        Err(error) => {
            log::warn!(
                "{}: embedded resource {} is not a valid resource table: {}",
                assembly.name(),
                resource,
                error
            );
            None
        }
    }
}

/// Per-pass cache of parsed resource tables.
///
/// Entries are keyed by `(assembly name, resource name)` and hold `None` for
/// resources that are absent or malformed, so neither is looked at twice. An
/// existing entry is never replaced; two threads racing on the same missing entry
/// may both parse the blob, and the first insert wins.
#[derive(Debug, Default)]
pub struct ResourceCache {
    tables: DashMap<(String, String), Option<Arc<StringTable>>>,
    loads: AtomicUsize,
}

impl ResourceCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The parsed table of `resource` in `assembly`, loading it on first use.
    #[must_use]
    pub fn table(&self, assembly: &CilAssembly, resource: &str) -> Option<Arc<StringTable>> {
        let key = (assembly.name().to_string(), resource.to_string());
        if let Some(entry) = self.tables.get(&key) {
            return entry.value().clone();
        }

        self.loads.fetch_add(1, Ordering::Relaxed);
        let loaded = load_table(assembly, resource).map(Arc::new);

        self.tables.entry(key).or_insert(loaded).value().clone()
    }

    /// [`lookup_resource_string`] through the cache.
    #[must_use]
    pub fn lookup(&self, assembly: &CilAssembly, declaring_type: &str, key: &str) -> Option<String> {
        self.table(assembly, &resource_table_name(declaring_type))?
            .get(key)
            .map(str::to_string)
    }

    /// Returns true if an entry for `resource` of `assembly` exists, loaded or not.
    #[must_use]
    pub fn contains(&self, assembly: &str, resource: &str) -> bool {
        self.tables
            .contains_key(&(assembly.to_string(), resource.to_string()))
    }

    /// Number of cached entries, negative ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Number of times a blob was read and parsed.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

/// Everything one analysis pass over an assembly shares.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    /// The assembly the analysed bodies belong to
    pub assembly: &'a CilAssembly,
    /// Ceilings and switches
    pub config: &'a AnalysisConfig,
    /// Resource tables parsed so far in this pass
    pub cache: &'a ResourceCache,
}

impl<'a> AnalysisContext<'a> {
    /// Bundle the pass state.
    #[must_use]
    pub fn new(
        assembly: &'a CilAssembly,
        config: &'a AnalysisConfig,
        cache: &'a ResourceCache,
    ) -> Self {
        AnalysisContext {
            assembly,
            config,
            cache,
        }
    }

    /// Look up a resource string, through the cache unless caching is disabled.
    #[must_use]
    pub fn lookup_resource(&self, declaring_type: &str, key: &str) -> Option<String> {
        if self.config.cache_resources {
            self.cache.lookup(self.assembly, declaring_type, key)
        } else {
            lookup_resource_string(declaring_type, key, self.assembly)
        }
    }
}
