// src/processor.rs

//! Command processing for Packman
//!
//! The processor is the only path to the index. It holds one lock for the
//! entire duration of a command, so commands from every connection are
//! applied one at a time and no caller ever observes a half-applied change.
//! It is also the only place where errors are turned into wire outcomes.

use crate::error::{Error, Result};
use crate::index::{Indexer, Package, PackageIndex};
use crate::protocol::{Command, Outcome, Verb};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, warn};

/// Serializes all commands against a shared index
#[derive(Debug, Default)]
pub struct CommandProcessor<I = PackageIndex> {
    index: Mutex<I>,
}

impl<I: Indexer> CommandProcessor<I> {
    /// Wrap an index for shared use
    pub fn new(index: I) -> Self {
        Self {
            index: Mutex::new(index),
        }
    }

    /// Apply one decoded command
    ///
    /// Returns the stored record for QUERY and `None` for the other verbs.
    /// A panic raised while the command runs is reported as
    /// `Error::Internal`, never as success.
    pub fn process(&self, command: Command) -> Result<Option<Package>> {
        let mut index = self.lock();

        let verb = command.verb;
        let result = panic::catch_unwind(AssertUnwindSafe(|| dispatch(&mut *index, command)));

        match result {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("Recovered from fault while processing {}: {}", verb, message);
                Err(Error::Internal(message))
            }
        }
    }

    /// Decode, process and translate a raw line into its reply
    pub fn handle_line(&self, line: &str) -> Outcome {
        let result = Command::decode(line).and_then(|command| self.process(command));
        let outcome = Outcome::from(&result);

        match &result {
            Err(err) if !err.is_rule_violation() && outcome == Outcome::Fail => {
                warn!(request = line, %outcome, "{}", err)
            }
            Err(err) => debug!(request = line, %outcome, "{}", err),
            Ok(_) => debug!(request = line, %outcome),
        }

        outcome
    }

    /// Number of packages currently indexed
    pub fn snapshot_len(&self) -> usize {
        self.lock().len()
    }

    /// Run a read-only closure against the index under the lock
    pub fn with_index<T>(&self, f: impl FnOnce(&I) -> T) -> T {
        let index = self.lock();
        f(&*index)
    }

    fn lock(&self) -> MutexGuard<'_, I> {
        // Every mutation is a single map operation after its checks, so a
        // poisoned index is still consistent.
        self.index.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!("Index lock was poisoned; continuing with recovered state");
            poisoned.into_inner()
        })
    }
}

fn dispatch<I: Indexer>(index: &mut I, command: Command) -> Result<Option<Package>> {
    match command.verb {
        Verb::Index => index.index(command.package).map(|_| None),
        Verb::Remove => index.remove(&command.package.name).map(|_| None),
        Verb::Query => index.query(&command.package.name).map(|pkg| Some(pkg.clone())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    /// Index that panics on every mutation
    #[derive(Default)]
    struct FaultyIndex {
        inner: PackageIndex,
    }

    impl Indexer for FaultyIndex {
        fn index(&mut self, _package: Package) -> Result<()> {
            panic!("index exploded");
        }

        fn remove(&mut self, _name: &str) -> Result<()> {
            panic!("{}", String::from("remove exploded"));
        }

        fn query(&self, name: &str) -> Result<&Package> {
            self.inner.query(name)
        }

        fn len(&self) -> usize {
            self.inner.len()
        }
    }

    fn command(line: &str) -> Command {
        Command::decode(line).unwrap()
    }

    #[test]
    fn test_process_index_and_query() {
        let processor = CommandProcessor::new(PackageIndex::with_packages([Package::new("x")]));

        assert_eq!(processor.process(command("INDEX|p|x")).unwrap(), None);

        let found = processor.process(command("QUERY|p|")).unwrap();
        assert_eq!(found, Some(Package::with_dependencies("p", ["x"])));
    }

    #[test]
    fn test_process_remove() {
        let processor = CommandProcessor::new(PackageIndex::with_packages([Package::new("x")]));
        assert_eq!(processor.process(command("REMOVE|x|")).unwrap(), None);
        assert_eq!(processor.snapshot_len(), 0);
    }

    #[test]
    fn test_process_propagates_rule_violations() {
        let processor = CommandProcessor::new(PackageIndex::new());
        assert!(matches!(
            processor.process(command("INDEX|p|x")),
            Err(Error::UnknownDependency { .. })
        ));
        assert!(matches!(
            processor.process(command("QUERY|p|")),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_handle_line_outcomes() {
        let processor = CommandProcessor::new(PackageIndex::new());
        assert_eq!(processor.handle_line("INDEX|a|"), Outcome::Ok);
        assert_eq!(processor.handle_line("INDEX|b|a"), Outcome::Ok);
        assert_eq!(processor.handle_line("REMOVE|a|"), Outcome::Fail);
        assert_eq!(processor.handle_line("QUERY|zzz|"), Outcome::Fail);
        assert_eq!(processor.handle_line("query|a|"), Outcome::Error);
        assert_eq!(processor.handle_line("INDEX|c"), Outcome::Error);
    }

    #[test]
    fn test_malformed_line_leaves_index_untouched() {
        let processor = CommandProcessor::new(PackageIndex::new());
        assert_eq!(processor.handle_line("INDEX||"), Outcome::Error);
        assert_eq!(processor.snapshot_len(), 0);
    }

    #[test]
    fn test_fault_is_reported_not_ok() {
        let processor = CommandProcessor::new(FaultyIndex::default());

        match processor.process(command("INDEX|p|")) {
            Err(Error::Internal(msg)) => assert_eq!(msg, "index exploded"),
            other => panic!("expected internal error, got {:?}", other),
        }
        assert_eq!(processor.handle_line("REMOVE|p|"), Outcome::Fail);
    }

    #[test]
    fn test_processor_usable_after_fault() {
        let processor = CommandProcessor::new(FaultyIndex::default());
        assert_eq!(processor.handle_line("INDEX|p|"), Outcome::Fail);

        // The lock must have been released and not left poisoned
        assert_eq!(processor.handle_line("QUERY|p|"), Outcome::Fail);
        assert_eq!(processor.snapshot_len(), 0);
    }

    #[test]
    fn test_concurrent_commands_are_serialized() {
        let processor = Arc::new(CommandProcessor::new(PackageIndex::new()));
        processor.process(command("INDEX|base|")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let processor = Arc::clone(&processor);
                thread::spawn(move || {
                    for i in 0..50 {
                        let name = format!("pkg-{}-{}", t, i);
                        assert_eq!(
                            processor.handle_line(&format!("INDEX|{}|base", name)),
                            Outcome::Ok
                        );
                        assert_eq!(processor.handle_line("REMOVE|base|"), Outcome::Fail);
                        if i % 2 == 0 {
                            assert_eq!(
                                processor.handle_line(&format!("REMOVE|{}|", name)),
                                Outcome::Ok
                            );
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(processor.snapshot_len(), 1 + 8 * 25);
        processor.with_index(|index| {
            assert_eq!(index.dependents_of("base").len(), 8 * 25);
        });
    }
}
