// src/server.rs

//! TCP front end for Packman
//!
//! One thread per accepted connection. Each session reads newline-terminated
//! commands, hands them to the shared [`CommandProcessor`], and writes back
//! one outcome line per command until the peer disconnects.

use crate::config::ServerConfig;
use crate::error::Result;
use crate::index::PackageIndex;
use crate::processor::CommandProcessor;
use crate::protocol::Outcome;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, info_span, warn};

/// A bound listener plus the processor shared by all its sessions
pub struct Server {
    listener: TcpListener,
    processor: Arc<CommandProcessor>,
    max_line_bytes: usize,
}

impl Server {
    /// Bind to the configured address with an empty index
    pub fn bind(config: &ServerConfig) -> Result<Self> {
        Self::with_processor(config, Arc::new(CommandProcessor::new(PackageIndex::new())))
    }

    /// Bind using an existing processor
    pub fn with_processor(config: &ServerConfig, processor: Arc<CommandProcessor>) -> Result<Self> {
        let listener = TcpListener::bind(config.listen)?;
        info!("Listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            processor,
            max_line_bytes: config.max_line_bytes,
        })
    }

    /// Address actually bound (useful when the configured port is 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Processor shared by every session
    pub fn processor(&self) -> Arc<CommandProcessor> {
        Arc::clone(&self.processor)
    }

    /// Accept connections forever
    pub fn run(self) -> Result<()> {
        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let peer = match stream.peer_addr() {
                Ok(peer) => peer.to_string(),
                Err(_) => "unknown".to_string(),
            };

            let processor = Arc::clone(&self.processor);
            let max_line_bytes = self.max_line_bytes;
            let spawned = thread::Builder::new()
                .name(format!("session-{}", peer))
                .spawn(move || handle_connection(stream, &processor, &peer, max_line_bytes));
            if let Err(e) = spawned {
                warn!("Failed to spawn session thread: {}", e);
            }
        }
        Ok(())
    }
}

fn handle_connection(
    stream: TcpStream,
    processor: &CommandProcessor,
    peer: &str,
    max_line_bytes: usize,
) {
    let span = info_span!("session", peer = %peer);
    let _enter = span.enter();
    debug!("Connection opened");

    let reader = match stream.try_clone() {
        Ok(read_half) => BufReader::new(read_half),
        Err(e) => {
            warn!("Failed to clone stream: {}", e);
            return;
        }
    };

    match serve_connection(reader, stream, processor, max_line_bytes) {
        Ok(count) => debug!(commands = count, "Connection closed"),
        Err(e) => debug!("Connection ended: {}", e),
    }
}

/// Run the request/reply loop over one byte stream
///
/// Returns the number of commands handled once the reader reaches EOF.
/// A trailing fragment without a newline is discarded. Lines that are not
/// valid UTF-8, or longer than `max_line_bytes` including the terminator,
/// are answered with `ERROR`. Only `\n` and an immediately preceding `\r`
/// are stripped; any other whitespace stays part of the command.
pub fn serve_connection<R, W>(
    mut reader: R,
    mut writer: W,
    processor: &CommandProcessor,
    max_line_bytes: usize,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut buf = Vec::new();
    let mut handled = 0;

    loop {
        buf.clear();
        let read = reader
            .by_ref()
            .take(max_line_bytes as u64)
            .read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(handled);
        }

        let outcome = if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }

            match std::str::from_utf8(&buf) {
                Ok(line) => processor.handle_line(line),
                Err(_) => {
                    debug!("Rejecting non UTF-8 line");
                    Outcome::Error
                }
            }
        } else if read < max_line_bytes {
            // EOF in the middle of a line
            return Ok(handled);
        } else {
            warn!(limit = max_line_bytes, "Rejecting oversized line");
            if !skip_line(&mut reader)? {
                writer.write_all(Outcome::Error.as_line())?;
                writer.flush()?;
                return Ok(handled + 1);
            }
            Outcome::Error
        };

        writer.write_all(outcome.as_line())?;
        writer.flush()?;
        handled += 1;
    }
}

/// Discard input up to and including the next newline
///
/// Returns `false` if EOF came first.
fn skip_line<R: BufRead>(reader: &mut R) -> Result<bool> {
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(false);
        }
        if let Some(pos) = available.iter().position(|b| *b == b'\n') {
            reader.consume(pos + 1);
            return Ok(true);
        }
        let len = available.len();
        reader.consume(len);
    }
}
