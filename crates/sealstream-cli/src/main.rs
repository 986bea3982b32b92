//! sealstream: seal/open chunked containers and wrap/unwrap key envelopes
//!
//! Commands:
//!   keygen                  - generate an X25519 key pair
//!   seal <in> <out>         - seal a file into a container
//!   open <in> <out>         - open a container back into plaintext
//!   wrap                    - seal a symmetric key into an envelope
//!   unwrap                  - recover a symmetric key from an envelope

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sealstream::{public_key_from_hex, Envelope, KeyPair, SymmetricKey};

#[derive(Parser, Debug)]
#[command(
    name = "sealstream",
    version,
    about = "Streaming authenticated encryption with addressed key envelopes"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an X25519 key pair and print both halves as hex
    Keygen,

    /// Seal a file into a chunked container
    Seal {
        /// Plaintext input file
        input: PathBuf,
        /// Container output file
        output: PathBuf,
        /// Symmetric key as 64 hex digits (random when omitted; the
        /// generated key is printed so it can be wrapped afterwards)
        #[arg(long, env = "SEALSTREAM_KEY")]
        key: Option<String>,
    },

    /// Open a chunked container back into plaintext
    Open {
        /// Container input file
        input: PathBuf,
        /// Plaintext output file
        output: PathBuf,
        /// Symmetric key as 64 hex digits
        #[arg(long, env = "SEALSTREAM_KEY")]
        key: String,
    },

    /// Seal a symmetric key into an envelope for one recipient
    Wrap {
        /// Own private key as hex
        #[arg(long, env = "SEALSTREAM_PRIVATE_KEY")]
        private: String,
        /// Recipient public key as hex (own public key when omitted)
        #[arg(long)]
        recipient: Option<String>,
        /// Symmetric key to wrap, as 64 hex digits
        #[arg(long)]
        key: String,
    },

    /// Recover a symmetric key from an envelope
    Unwrap {
        /// Own private key as hex
        #[arg(long, env = "SEALSTREAM_PRIVATE_KEY")]
        private: String,
        /// Envelope JSON file (stdin when omitted)
        #[arg(long)]
        envelope: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Seal { input, output, key } => seal(&input, &output, key.as_deref()),
        Commands::Open { input, output, key } => open(&input, &output, &key),
        Commands::Wrap {
            private,
            recipient,
            key,
        } => wrap(&private, recipient.as_deref(), &key),
        Commands::Unwrap { private, envelope } => unwrap(&private, envelope.as_deref()),
    }
}

fn keygen() -> Result<()> {
    let pair = KeyPair::generate();
    println!("private: {}", pair.private_hex());
    println!("public:  {}", pair.public_hex());
    Ok(())
}

fn seal(input: &PathBuf, output: &PathBuf, key_hex: Option<&str>) -> Result<()> {
    let key = match key_hex {
        Some(hexstring) => SymmetricKey::from_hex(hexstring)?,
        None => {
            let key = SymmetricKey::generate();
            println!("key: {}", key.to_hex());
            key
        }
    };

    let reader = BufReader::new(
        File::open(input).with_context(|| format!("opening {}", input.display()))?,
    );
    let writer = BufWriter::new(
        File::create(output).with_context(|| format!("creating {}", output.display()))?,
    );

    let written = sealstream::seal(reader, writer, &key)?;
    debug!(bytes = written, "container written");
    Ok(())
}

fn open(input: &PathBuf, output: &PathBuf, key_hex: &str) -> Result<()> {
    let key = SymmetricKey::from_hex(key_hex)?;

    let reader = BufReader::new(
        File::open(input).with_context(|| format!("opening {}", input.display()))?,
    );
    let writer = BufWriter::new(
        File::create(output).with_context(|| format!("creating {}", output.display()))?,
    );

    let written = sealstream::open(reader, writer, &key)?;
    debug!(bytes = written, "plaintext written");
    Ok(())
}

fn wrap(private_hex: &str, recipient_hex: Option<&str>, key_hex: &str) -> Result<()> {
    let pair = KeyPair::from_private_hex(private_hex)?;
    let recipient = match recipient_hex {
        Some(hexstring) => public_key_from_hex(hexstring)?,
        None => pair.public().clone(),
    };
    let key = SymmetricKey::from_hex(key_hex)?;

    let envelope = pair.seal_key(&recipient, &key)?;
    println!("{}", envelope.to_json()?);
    Ok(())
}

fn unwrap(private_hex: &str, envelope_path: Option<&std::path::Path>) -> Result<()> {
    let pair = KeyPair::from_private_hex(private_hex)?;

    let json = match envelope_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading envelope from stdin")?;
            buf
        }
    };

    let envelope = Envelope::from_json(json.trim())?;
    let key = pair.open_key(&envelope)?;
    println!("{}", key.to_hex());
    Ok(())
}
