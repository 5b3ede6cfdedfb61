//! Chachabox CLI - ChaCha20-Poly1305 file encryption with caller-held nonces
//!
//! Keys and nonces are passed as unpadded base64url text. The nonce is not
//! stored in the output file; keep it next to the ciphertext yourself.

use clap::{Parser, Subcommand};
use std::error::Error as StdError;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use chachabox::error::{ErrorKind, Result};
use chachabox::keys::{FileKeyReader, KeyReader, ReaderKeyReader, TerminalKeyReader};
use chachabox::{ChachaboxError, Variant, encoding, file_ops};

#[derive(Parser)]
#[command(name = "chachabox")]
#[command(version)]
#[command(about = "ChaCha20-Poly1305 file encryption.", long_about = None)]
struct Cli {
    /// Nonce variant: "extended" (24-byte XChaCha20) or "standard" (12-byte)
    #[arg(long, global = true, default_value_t = Variant::Extended)]
    variant: Variant,

    /// Read the base64url key from stdin instead of from terminal
    #[arg(long, global = true, conflicts_with = "key_file")]
    key_stdin: bool,

    /// Read the base64url key from a file instead of from terminal
    #[arg(long, global = true, value_name = "FILE")]
    key_file: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a fresh random nonce
    #[command(alias = "n")]
    Nonce,

    /// Encrypt a file
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the ciphertext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Base64url nonce; when omitted a fresh one is generated and printed
        #[arg(short, long)]
        nonce: Option<String>,
    },

    /// Decrypt a file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the plaintext to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Base64url nonce used at encryption time
        #[arg(short, long)]
        nonce: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", error_chain(&e));
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let variant = cli.variant;
    match cli.command {
        Commands::Nonce => {
            let nonce = variant.generate_nonce()?;
            println!("{}", encoding::encode(&nonce));
        }
        Commands::Encrypt {
            input,
            output,
            nonce,
        } => {
            let (nonce, generated) = match nonce {
                Some(text) => (parse_nonce(&text, variant)?, false),
                None => (variant.generate_nonce()?, true),
            };
            let mut reader = get_key_reader(cli.key_stdin, cli.key_file);
            file_ops::encrypt_file(&input, &output, &nonce, variant, &mut *reader)?;
            if generated {
                println!("{}", encoding::encode(&nonce));
            }
        }
        Commands::Decrypt {
            input,
            output,
            nonce,
        } => {
            let nonce = parse_nonce(&nonce, variant)?;
            let mut reader = get_key_reader(cli.key_stdin, cli.key_file);
            file_ops::decrypt_file(&input, &output, &nonce, variant, &mut *reader)?;
        }
    }
    Ok(())
}

fn parse_nonce(text: &str, variant: Variant) -> Result<Vec<u8>> {
    encoding::decode_exact(
        text,
        variant.nonce_len(),
        "nonce",
        ErrorKind::InvalidNonceLength,
    )
}

fn get_key_reader(use_stdin: bool, key_file: Option<PathBuf>) -> Box<dyn KeyReader> {
    match key_file {
        Some(path) => Box::new(FileKeyReader::new(path)),
        None if use_stdin => Box::new(ReaderKeyReader::new(Box::new(std::io::stdin()))),
        None => Box::new(TerminalKeyReader),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn error_chain(err: &ChachaboxError) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
