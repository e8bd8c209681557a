// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use packman::client::Client;
use packman::config::{DEFAULT_LISTEN, DEFAULT_MAX_LINE_BYTES, ServerConfig};
use packman::protocol::Command;
use packman::server::Server;
use std::io::{self, BufRead};
use tracing::info;

#[derive(Parser)]
#[command(name = "packman")]
#[command(author, version, about = "Networked package index with dependency-aware registration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the package index server
    Serve {
        /// Address to listen on
        #[arg(short, long, env = "PACKMAN_LISTEN", default_value = DEFAULT_LISTEN)]
        listen: String,
        /// Longest accepted request line in bytes, newline included
        #[arg(long, env = "PACKMAN_MAX_LINE_BYTES", default_value_t = DEFAULT_MAX_LINE_BYTES)]
        max_line_bytes: usize,
    },
    /// Send commands to a running server and print each outcome
    Send {
        /// Server address
        #[arg(short, long, env = "PACKMAN_SERVER", default_value = "127.0.0.1:8080")]
        server: String,
        /// Command lines such as "INDEX|cloog|gmp,isl" (reads stdin when omitted)
        lines: Vec<String>,
    },
    /// Decode a command line without contacting a server
    Check {
        /// Command line to decode
        line: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        shell: Shell,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve {
            listen,
            max_line_bytes,
        }) => {
            let config = ServerConfig::from_listen(&listen)?.with_max_line_bytes(max_line_bytes)?;
            info!("Starting server...");
            Server::bind(&config)?.run()?;
            Ok(())
        }
        Some(Commands::Send { server, lines }) => {
            let mut client = Client::connect(server.as_str())?;

            if lines.is_empty() {
                for line in io::stdin().lock().lines() {
                    let line = line?;
                    println!("{}", client.send(line.trim_end_matches('\r'))?);
                }
            } else {
                for line in &lines {
                    println!("{}", client.send(line)?);
                }
            }

            Ok(())
        }
        Some(Commands::Check { line }) => {
            let command = Command::decode(&line)?;
            println!("Verb: {}", command.verb);
            println!("Package: {}", command.package.name);
            if command.package.dependencies.is_empty() {
                println!("Dependencies: none");
            } else {
                println!("Dependencies:");
                for dep in &command.package.dependencies {
                    println!("  - {}", dep);
                }
            }
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "packman", &mut io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("Packman Package Index v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'packman --help' for usage information");
            Ok(())
        }
    }
}
