// src/index/models.rs

//! Data models for indexed packages

use std::fmt;

/// A package tracked by the index, with its direct dependencies
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Package {
    pub name: String,
    pub dependencies: Vec<String>,
}

impl Package {
    /// Create a package with no dependencies
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
        }
    }

    /// Create a package with the given dependencies
    pub fn with_dependencies<I, S>(name: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this package lists `name` among its dependencies
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == name)
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.dependencies.is_empty() {
            write!(f, " -> [{}]", self.dependencies.join(", "))?;
        }
        Ok(())
    }
}
