//! GOMN command-line tool for querying, validating, and transcoding GOMN documents.
//!
//! Usage: gomn [OPTIONS] [KEY...]
//!
//! Options:
//!   -f, --file <FILE>      Input file (reads stdin when omitted or "-")
//!   -F, --from <FORMAT>    Input format (gomn, cbor) [default: gomn]
//!   -t, --to <FORMAT>      Output format (gomn, yaml, toml, cbor, diag) [default: gomn]
//!   -o, --output <FILE>    Write output to specified file
//!   --check                Check if input is valid (exit 0 if valid, 1 if invalid)
//!   -v, --verbose          Debug logging on stderr
//!   -h, --help             Print help
//!   -V, --version          Print version

use libgomn::{binary, parse, parse_key, Document, Value};
use std::fs;
use std::io::{self, Read, Write};
use std::process;
use tracing::debug;

mod transcode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Gomn,
    Yaml,
    Toml,
    Cbor,
    CborDiag,
}

fn parse_format(s: &str) -> Option<Format> {
    match s {
        "gomn" => Some(Format::Gomn),
        "yaml" | "yml" => Some(Format::Yaml),
        "toml" => Some(Format::Toml),
        "cbor" => Some(Format::Cbor),
        "diag" => Some(Format::CborDiag),
        _ => None,
    }
}

fn format_arg(args: &[String], i: usize, flag: &str) -> Format {
    let Some(name) = args.get(i) else {
        eprintln!("Error: {} requires a format argument", flag);
        process::exit(1);
    };
    match parse_format(name) {
        Some(format) => format,
        None => {
            eprintln!("Error: Unknown format: {}", name);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut from_format = Format::Gomn;
    let mut to_format = Format::Gomn;
    let mut input_path: Option<&str> = None;
    let mut output_file: Option<&str> = None;
    let mut check_only = false;
    let mut verbose = false;
    let mut keys: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-V" | "--version" => {
                println!("gomn {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "-f" | "--file" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --file requires an argument");
                    process::exit(1);
                }
                if input_path.is_some() {
                    eprintln!("Error: Multiple input files not supported");
                    process::exit(1);
                }
                input_path = Some(&args[i]);
            }
            "-F" | "--from" => {
                i += 1;
                from_format = format_arg(&args, i, "--from");
                if !matches!(from_format, Format::Gomn | Format::Cbor) {
                    eprintln!("Error: Unsupported input format: {}", args[i]);
                    process::exit(1);
                }
            }
            "-t" | "--to" => {
                i += 1;
                to_format = format_arg(&args, i, "--to");
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires an argument");
                    process::exit(1);
                }
                output_file = Some(&args[i]);
            }
            "--check" => {
                check_only = true;
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "--" => {
                // Everything after `--` is a key, even when it starts with '-'.
                keys.extend(args[i + 1..].iter().cloned());
                break;
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                process::exit(1);
            }
            key => keys.push(key.to_string()),
        }
        i += 1;
    }

    init_logging(verbose);

    let raw_bytes = read_input(input_path);
    let doc = match load_document(&raw_bytes, from_format) {
        Ok(doc) => doc,
        Err(e) => {
            match input_path {
                Some(path) if path != "-" => eprintln!("{}: {}", path, e),
                _ => eprintln!("Parse error: {}", e),
            }
            process::exit(1);
        }
    };
    debug!(entries = doc.len(), "document loaded");

    if check_only {
        match input_path {
            Some(path) if path != "-" => println!("{}: ok", path),
            _ => println!("ok"),
        }
        return;
    }

    let value = if keys.is_empty() {
        Value::Document(doc)
    } else {
        match lookup(&doc, &keys) {
            Some(v) => v.clone(),
            None => {
                debug!(path = ?keys, "key not found");
                process::exit(1);
            }
        }
    };

    process::exit(output_value(&value, to_format, output_file));
}

fn read_input(input_path: Option<&str>) -> Vec<u8> {
    match input_path {
        Some(path) if path != "-" => match fs::read(path) {
            Ok(bytes) => {
                debug!(path, bytes = bytes.len(), "read input file");
                bytes
            }
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                process::exit(1);
            }
        },
        _ => {
            let mut buffer = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            debug!(bytes = buffer.len(), "read stdin");
            buffer
        }
    }
}

fn load_document(raw_bytes: &[u8], from_format: Format) -> Result<Document, String> {
    match from_format {
        Format::Cbor => binary::from_bytes(raw_bytes).map_err(|e| e.to_string()),
        _ => {
            let input = std::str::from_utf8(raw_bytes)
                .map_err(|e| format!("input is not valid UTF-8: {}", e))?;
            parse(input).map_err(|e| e.to_string())
        }
    }
}

/// Resolve one command-line key against a document.
///
/// The argument is read with the key grammar, so `42` is an integer key and
/// `"a b"` a string key. A bare word that is not bound as an identifier is
/// retried as a string, and an argument that is not a valid key at all is
/// looked up as a string verbatim.
fn resolve_key<'a>(doc: &'a Document, raw: &str) -> Option<&'a Value> {
    let key = match parse_key(raw) {
        Ok(key) => key,
        Err(e) => {
            debug!(key = raw, error = %e, "not a key literal; using it as a string");
            return doc.get(&Value::String(raw.to_string()));
        }
    };
    if let Some(value) = doc.get(&key) {
        return Some(value);
    }
    match key {
        Value::Identifier(name) => doc.get(&Value::String(name)),
        _ => None,
    }
}

/// Follow command-line keys through nested documents.
fn lookup<'a>(doc: &'a Document, path: &[String]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = doc;
    for raw in parents {
        current = resolve_key(current, raw)?.as_document()?;
    }
    resolve_key(current, last)
}

/// Encoding a lone value to CBOR needs a document around it.
fn require_document<'a>(value: &'a Value, format: &str) -> Result<&'a Document, String> {
    value.as_document().ok_or_else(|| {
        format!(
            "{} output requires a document, but the selected value is a {}",
            format,
            value.type_name()
        )
    })
}

fn output_value(value: &Value, output_format: Format, output_file: Option<&str>) -> i32 {
    let result = match output_format {
        Format::Gomn => Ok(format!("{:#?}", value)),
        Format::Yaml => transcode::yaml::encode(value).map_err(|e| format!("Cannot convert to YAML: {}", e)),
        Format::Toml => require_document(value, "TOML")
            .and_then(transcode::toml::encode)
            .map_err(|e| format!("Cannot convert to TOML: {}", e)),
        Format::Cbor => {
            return match require_document(value, "CBOR") {
                Ok(doc) => {
                    write_binary_output(&binary::to_bytes(doc), output_file);
                    0
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    1
                }
            };
        }
        Format::CborDiag => require_document(value, "CBOR")
            .and_then(|doc| binary::diagnostic(&binary::to_bytes(doc)).map_err(|e| e.to_string())),
    };

    match result {
        Ok(output) => {
            write_text_output(&output, output_file);
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn write_text_output(output: &str, output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
        debug!(path, bytes = output.len(), "wrote output file");
    } else {
        print!("{}", output);
        // Ensure output ends with newline
        if !output.ends_with('\n') {
            println!();
        }
    }
}

fn write_binary_output(output: &[u8], output_file: Option<&str>) {
    if let Some(path) = output_file {
        if let Err(e) = fs::write(path, output) {
            eprintln!("Error writing {}: {}", path, e);
            process::exit(1);
        }
        debug!(path, bytes = output.len(), "wrote output file");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        if let Err(e) = handle.write_all(output).and_then(|_| handle.flush()) {
            eprintln!("Error writing stdout: {}", e);
            process::exit(1);
        }
    }
}

fn print_help() {
    println!(
        "gomn - GOMN command-line tool

USAGE:
    gomn [OPTIONS] [KEY...]

ARGS:
    [KEY...]    Path of keys to look up, one per nested document
                Each key uses the bracket-key syntax: 42, name, \"a b\", {{1, 2}}
                A bare word that is not bound is retried as a string

OPTIONS:
    -f, --file <FILE>      Input file (reads from stdin if not provided or \"-\")

    -F, --from <FORMAT>    Input format [default: gomn]
                           Supported: gomn, cbor

    -t, --to <FORMAT>      Output format [default: gomn]
                           Supported: gomn, yaml, toml, cbor, diag

    -o, --output <FILE>    Write output to specified file

    --check                Check if input is valid (exit 0 if valid, 1 if invalid)

    -v, --verbose          Print debug logging to stderr

    --                     Treat every following argument as a key

    -h, --help             Print help

    -V, --version          Print version

EXAMPLES:
    # Print a document in debug notation
    gomn -f config.gomn

    # Validate a file
    gomn --check -f config.gomn

    # Look up [server] then [port] inside it
    gomn -f config.gomn server port

    # Look up a negative integer key
    gomn -f config.gomn -- -1

    # Convert to YAML
    gomn -f config.gomn -t yaml

    # Store as CBOR, then read it back
    gomn -f config.gomn -t cbor -o config.cbor
    gomn -F cbor -f config.cbor

    # Inspect the CBOR encoding
    gomn -f config.gomn -t diag"
    );
}
