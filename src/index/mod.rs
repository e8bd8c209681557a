// src/index/mod.rs

//! In-memory package index for Packman
//!
//! This module holds the authoritative mapping from package name to its
//! record and enforces referential integrity on every mutation:
//! - Indexing requires every dependency to already be indexed
//! - Removal is refused while another package depends on the target
//! - Queries never insert
//!
//! There is no reverse-dependency map. Indexing stays a handful of lookups
//! and removal scans every stored record.

pub mod models;
pub mod traits;

pub use models::Package;
pub use traits::Indexer;

use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

/// HashMap-backed implementation of `Indexer`
#[derive(Debug, Default)]
pub struct PackageIndex {
    packages: HashMap<String, Package>,
}

impl PackageIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index pre-populated with the given packages
    ///
    /// Seeded records are stored as-is without dependency checks, so callers
    /// can build arbitrary starting states.
    pub fn with_packages<I>(packages: I) -> Self
    where
        I: IntoIterator<Item = Package>,
    {
        Self {
            packages: packages
                .into_iter()
                .map(|pkg| (pkg.name.clone(), pkg))
                .collect(),
        }
    }

    /// Whether a package with this name is indexed
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Names of indexed packages that depend on `name`, sorted
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        let mut dependents: Vec<&str> = self
            .packages
            .values()
            .filter(|pkg| pkg.name != name && pkg.depends_on(name))
            .map(|pkg| pkg.name.as_str())
            .collect();
        dependents.sort_unstable();
        dependents
    }
}

impl Indexer for PackageIndex {
    fn index(&mut self, package: Package) -> Result<()> {
        if let Some(missing) = package
            .dependencies
            .iter()
            .find(|dep| !self.packages.contains_key(dep.as_str()))
        {
            return Err(Error::UnknownDependency {
                package: package.name.clone(),
                dependency: missing.clone(),
            });
        }

        debug!("Indexing {}", package);
        self.packages.insert(package.name.clone(), package);
        Ok(())
    }

    fn remove(&mut self, name: &str) -> Result<()> {
        let dependents = self.dependents_of(name);
        if !dependents.is_empty() {
            debug!("Refusing to remove {}: required by {}", name, dependents.join(", "));
            return Err(Error::HasDependents {
                package: name.to_string(),
            });
        }

        if self.packages.remove(name).is_some() {
            debug!("Removed {}", name);
        }
        Ok(())
    }

    fn query(&self, name: &str) -> Result<&Package> {
        self.packages.get(name).ok_or_else(|| Error::NotFound {
            package: name.to_string(),
        })
    }

    fn len(&self) -> usize {
        self.packages.len()
    }
}
