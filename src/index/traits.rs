// src/index/traits.rs

//! Common interface for package indexes

use super::models::Package;
use crate::error::Result;

/// Operations every package index must support.
///
/// Implementations enforce referential integrity: a package is only admitted
/// when all its dependencies are known, and only removed when nothing else
/// depends on it. A failed operation leaves the index unchanged.
pub trait Indexer {
    /// Insert or overwrite a package
    ///
    /// Fails with `UnknownDependency` if any dependency is not indexed.
    fn index(&mut self, package: Package) -> Result<()>;

    /// Remove a package by name
    ///
    /// Fails with `HasDependents` if another package depends on it.
    /// Removing an absent package succeeds.
    fn remove(&mut self, name: &str) -> Result<()>;

    /// Look up a package by name without inserting anything
    fn query(&self, name: &str) -> Result<&Package>;

    /// Number of indexed packages
    fn len(&self) -> usize;

    /// Whether the index holds no packages
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
