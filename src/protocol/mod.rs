// src/protocol/mod.rs

//! Line protocol for Packman
//!
//! Every request is one line of the form `VERB|NAME|DEP1,DEP2,...` and every
//! reply is one of the tokens in [`Outcome`]. This module turns a raw line
//! into a [`Command`]; it never touches the index.

pub mod outcome;

pub use outcome::Outcome;

use crate::error::{Error, Result};
use crate::index::Package;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Field separator within a line
pub const FIELD_DELIMITER: char = '|';

/// Separator within the dependency list
pub const DEPENDENCY_DELIMITER: char = ',';

/// Command verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Index,
    Remove,
    Query,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Index => "INDEX",
            Verb::Remove => "REMOVE",
            Verb::Query => "QUERY",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "INDEX" => Ok(Verb::Index),
            "REMOVE" => Ok(Verb::Remove),
            "QUERY" => Ok(Verb::Query),
            _ => Err(format!("Invalid verb: {}", s)),
        }
    }
}

/// A decoded request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    /// For QUERY and REMOVE only the name is meaningful
    pub package: Package,
}

impl Command {
    pub fn new(verb: Verb, package: Package) -> Self {
        Self { verb, package }
    }

    /// Decode one line (without its terminator) into a command
    ///
    /// The line must split on `|` into exactly three fields: a verb, a
    /// non-empty package name and a possibly empty dependency list. Empty
    /// dependency tokens, repeats, and references to the package itself are
    /// dropped; the remaining order is kept.
    pub fn decode(line: &str) -> Result<Self> {
        let malformed = || Error::MalformedCommand {
            line: line.to_string(),
        };

        let mut fields = line.split(FIELD_DELIMITER);
        let (verb, name, deps) = match (fields.next(), fields.next(), fields.next(), fields.next())
        {
            (Some(verb), Some(name), Some(deps), None) => (verb, name, deps),
            _ => return Err(malformed()),
        };

        let verb: Verb = verb.parse().map_err(|_| malformed())?;
        if name.is_empty() {
            return Err(malformed());
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let dependencies: Vec<String> = deps
            .split(DEPENDENCY_DELIMITER)
            .filter(|dep| !dep.is_empty() && *dep != name && seen.insert(*dep))
            .map(str::to_string)
            .collect();

        Ok(Self::new(
            verb,
            Package {
                name: name.to_string(),
                dependencies,
            },
        ))
    }

    /// Encode back into wire form, without the terminator
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}{}{}",
            self.verb,
            FIELD_DELIMITER,
            self.package.name,
            FIELD_DELIMITER,
            self.package.dependencies.join(",")
        )
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Command::decode(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
