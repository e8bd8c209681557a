// src/protocol/outcome.rs

//! Single-word replies sent back for every command

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Result of one command as seen on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Command succeeded
    Ok,
    /// Command decoded but violated an index rule (or faulted)
    Fail,
    /// Line could not be decoded
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::Fail => "FAIL",
            Outcome::Error => "ERROR",
        }
    }

    /// Wire form including the line terminator
    pub fn as_line(&self) -> &'static [u8] {
        match self {
            Outcome::Ok => b"OK\n",
            Outcome::Fail => b"FAIL\n",
            Outcome::Error => b"ERROR\n",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "OK" => Ok(Outcome::Ok),
            "FAIL" => Ok(Outcome::Fail),
            "ERROR" => Ok(Outcome::Error),
            _ => Err(Error::Protocol(format!("Unknown reply: {:?}", s))),
        }
    }
}

impl<T> From<&crate::error::Result<T>> for Outcome {
    fn from(result: &crate::error::Result<T>) -> Self {
        match result {
            Ok(_) => Outcome::Ok,
            Err(err) => err.outcome(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tokens() {
        assert_eq!(Outcome::Ok.as_line(), b"OK\n");
        assert_eq!(Outcome::Fail.as_line(), b"FAIL\n");
        assert_eq!(Outcome::Error.as_line(), b"ERROR\n");
    }

    #[test]
    fn test_parse_reply() {
        assert_eq!("OK".parse::<Outcome>().unwrap(), Outcome::Ok);
        assert_eq!("FAIL".parse::<Outcome>().unwrap(), Outcome::Fail);
        assert_eq!("ERROR".parse::<Outcome>().unwrap(), Outcome::Error);
        assert!(matches!("ok".parse::<Outcome>(), Err(Error::Protocol(_))));
    }

    #[test]
    fn test_from_result() {
        let ok: crate::error::Result<()> = Ok(());
        assert_eq!(Outcome::from(&ok), Outcome::Ok);

        let fail: crate::error::Result<()> = Err(Error::NotFound {
            package: "p".to_string(),
        });
        assert_eq!(Outcome::from(&fail), Outcome::Fail);
    }
}
