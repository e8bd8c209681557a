// src/client.rs

//! Blocking line client for a Packman server

use crate::error::{Error, Result};
use crate::protocol::Outcome;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpStream, ToSocketAddrs};
use tracing::debug;

/// One connection to a Packman server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let writer = TcpStream::connect(addr)?;
        let reader = BufReader::new(writer.try_clone()?);
        Ok(Self { reader, writer })
    }

    /// Send one raw line and wait for its outcome
    ///
    /// The line must not contain a newline; one is appended.
    pub fn send(&mut self, line: &str) -> Result<Outcome> {
        if line.contains('\n') {
            return Err(Error::Protocol(format!(
                "Request must be a single line: {:?}",
                line
            )));
        }

        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;

        let mut reply = String::new();
        if self.reader.read_line(&mut reply)? == 0 {
            return Err(Error::Protocol("Server closed the connection".to_string()));
        }

        let outcome = reply.trim_end_matches(['\r', '\n']).parse()?;
        debug!("{} -> {}", line, outcome);
        Ok(outcome)
    }
}
