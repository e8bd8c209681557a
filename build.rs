// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("packman")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Packman Contributors")
        .about("Networked package index with dependency-aware registration")
        .subcommand_required(false)
        .subcommand(
            Command::new("serve")
                .about("Run the package index server")
                .arg(
                    Arg::new("listen")
                        .short('l')
                        .long("listen")
                        .value_name("ADDR")
                        .env("PACKMAN_LISTEN")
                        .default_value("0.0.0.0:8080")
                        .help("Address to listen on"),
                )
                .arg(
                    Arg::new("max_line_bytes")
                        .long("max-line-bytes")
                        .value_name("BYTES")
                        .env("PACKMAN_MAX_LINE_BYTES")
                        .default_value("1048576")
                        .help("Longest accepted request line in bytes, newline included"),
                ),
        )
        .subcommand(
            Command::new("send")
                .about("Send commands to a running server and print each outcome")
                .arg(
                    Arg::new("server")
                        .short('s')
                        .long("server")
                        .value_name("ADDR")
                        .env("PACKMAN_SERVER")
                        .default_value("127.0.0.1:8080")
                        .help("Server address"),
                )
                .arg(
                    Arg::new("lines")
                        .num_args(0..)
                        .help("Command lines such as \"INDEX|cloog|gmp,isl\" (reads stdin when omitted)"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Decode a command line without contacting a server")
                .arg(Arg::new("line").required(true).help("Command line to decode")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    // Generate main man page
    let cmd = build_cli();
    let man = Man::new(cmd);
    let mut buffer = Vec::new();
    man.render(&mut buffer)
        .expect("Failed to render man page");

    let man_path = man_dir.join("packman.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
