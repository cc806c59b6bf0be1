//! Natrium CLI
//!
//! libsodium-compatible keys, hashes, sealed boxes and signatures from the
//! command line.

mod input;

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use natrium_compat::{BackendPreference, CompatConfig, Sodium};
use natrium_crypto::{box_, generichash, pwhash, sign};

use input::{CHUNK_SIZE, decode_hex, decode_secret_hex, open_input, read_input, write_output};

/// Natrium - pure-Rust libsodium-compatible cryptography
#[derive(Parser)]
#[command(name = "natrium")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path (defaults to $NATRIUM_CONFIG, then the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend override: auto, pure or native
    #[arg(long)]
    backend: Option<BackendPreference>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key or keypair
    Keygen {
        /// What to generate
        #[arg(value_enum)]
        kind: KeyKind,
    },

    /// BLAKE2b digest of a file
    Hash {
        /// Hex-encoded key (up to 64 bytes)
        #[arg(long)]
        key: Option<String>,

        /// Digest length in bytes (1-64)
        #[arg(long, default_value_t = generichash::BYTES)]
        len: usize,

        /// File to hash, or - for stdin
        file: PathBuf,
    },

    /// Hash a password into an Argon2id string
    Pwhash {
        /// Password to hash
        password: String,
    },

    /// Check a password against an Argon2 or scrypt hash string
    PwhashVerify {
        /// Password to check
        password: String,

        /// Encoded hash string
        hash: String,
    },

    /// Seal a file to a box public key
    Seal {
        /// Recipient public key (hex)
        pubkey: String,

        /// File to seal, or - for stdin
        file: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Open a sealed file with a box keypair
    Open {
        /// Recipient keypair, secret then public (hex, 64 bytes)
        keypair: String,

        /// Sealed file, or - for stdin
        file: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Produce a detached Ed25519 signature of a file
    Sign {
        /// Signing secret key (hex, 64 bytes)
        secret: String,

        /// File to sign, or - for stdin
        file: PathBuf,
    },

    /// Verify a detached Ed25519 signature of a file
    Verify {
        /// Signer public key (hex)
        public: String,

        /// Signature (hex)
        signature: String,

        /// Signed file, or - for stdin
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KeyKind {
    /// X25519 keypair for seal/open
    Box,
    /// Ed25519 keypair for sign/verify
    Sign,
    /// 32-byte secretbox key
    Secretbox,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = CompatConfig::from_env(cli.config.as_deref())?;
    if let Some(preference) = cli.backend {
        config.backend.preference = preference;
    }
    config.validate()?;

    // Initialize logging
    let level = if cli.verbose {
        "debug".to_string()
    } else {
        config.logging.level.to_lowercase()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let backend = natrium_compat::install(&config)?;
    tracing::debug!(backend = backend.name(), "backend ready");
    let sodium = Sodium::with_backend(backend);

    match cli.command {
        Commands::Keygen { kind } => keygen(&sodium, kind)?,
        Commands::Hash { key, len, file } => hash_file(&sodium, key.as_deref(), len, &file)?,
        Commands::Pwhash { password } => hash_password(&sodium, &password, &config)?,
        Commands::PwhashVerify { password, hash } => verify_password(&sodium, &password, &hash)?,
        Commands::Seal {
            pubkey,
            file,
            output,
        } => seal_file(&sodium, &pubkey, &file, output.as_deref())?,
        Commands::Open {
            keypair,
            file,
            output,
        } => open_file(&sodium, &keypair, &file, output.as_deref())?,
        Commands::Sign { secret, file } => sign_file(&sodium, &secret, &file)?,
        Commands::Verify {
            public,
            signature,
            file,
        } => verify_file(&sodium, &public, &signature, &file)?,
    }

    Ok(())
}

/// Generate a key or keypair and print it as hex
fn keygen(sodium: &Sodium, kind: KeyKind) -> anyhow::Result<()> {
    match kind {
        KeyKind::Box => {
            let keypair = sodium.crypto_box_keypair()?;
            let public = sodium.crypto_box_publickey(&keypair[..])?;
            println!("Public key: {}", hex::encode(public));
            println!("Keypair:    {}", hex::encode(&keypair[..]));
        }
        KeyKind::Sign => {
            let keypair = sodium.crypto_sign_keypair()?;
            let public = sodium.crypto_sign_publickey(&keypair[..])?;
            let secret = sodium.crypto_sign_secretkey(&keypair[..])?;
            println!("Public key: {}", hex::encode(public));
            println!("Secret key: {}", hex::encode(&secret[..]));
        }
        KeyKind::Secretbox => {
            let key = zeroize::Zeroizing::new(sodium.crypto_secretbox_keygen()?);
            println!("Key: {}", hex::encode(&key[..]));
        }
    }
    eprintln!("\nKeep secret material out of shell history and logs.");
    Ok(())
}

/// Hash a file through the streaming context, one chunk at a time
fn hash_file(sodium: &Sodium, key: Option<&str>, len: usize, file: &Path) -> anyhow::Result<()> {
    let key = match key {
        Some(hex_key) => zeroize::Zeroizing::new(
            hex::decode(hex_key.trim()).map_err(|e| anyhow::anyhow!("key is not valid hex: {}", e))?,
        ),
        None => zeroize::Zeroizing::new(Vec::new()),
    };

    let mut ctx = sodium.crypto_generichash_init(&key, len)?;
    let mut reader = open_input(file)?;
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        sodium.crypto_generichash_update(&mut ctx, &buf[..n])?;
        total += n as u64;
    }
    let digest = sodium.crypto_generichash_final(&mut ctx, len)?;
    tracing::debug!(bytes = total, len, "hashed input");

    println!("{}  {}", hex::encode(digest), file.display());
    Ok(())
}

/// Hash a password with the configured Argon2id limits
fn hash_password(sodium: &Sodium, password: &str, config: &CompatConfig) -> anyhow::Result<()> {
    tracing::info!(
        opslimit = config.pwhash.opslimit,
        memlimit = config.pwhash.memlimit,
        "hashing password"
    );
    let hash = sodium.crypto_pwhash_str(
        password.as_bytes(),
        config.pwhash.opslimit,
        config.pwhash.memlimit,
    )?;
    println!("{}", hash);
    Ok(())
}

/// Verify a password against an Argon2 (`$argon2…`) or scrypt (`$7$`) string
fn verify_password(sodium: &Sodium, password: &str, hash: &str) -> anyhow::Result<()> {
    let valid = if hash.starts_with(pwhash::scrypt::STR_PREFIX) {
        sodium.crypto_pwhash_scryptsalsa208sha256_str_verify(hash, password.as_bytes())
    } else {
        sodium.crypto_pwhash_str_verify(hash, password.as_bytes())
    };

    if !valid {
        anyhow::bail!("password does not match");
    }
    println!("Password OK");
    Ok(())
}

/// Seal a file to a recipient public key
fn seal_file(
    sodium: &Sodium,
    pubkey: &str,
    file: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let public = decode_hex("public key", pubkey, box_::PUBLIC_KEY_SIZE)?;
    let message = read_input(file)?;
    let sealed = sodium.crypto_box_seal(&message, &public)?;
    tracing::info!(
        plaintext = message.len(),
        sealed = sealed.len(),
        "sealed input"
    );
    write_output(output, &sealed)
}

/// Open a sealed file with the recipient keypair
fn open_file(
    sodium: &Sodium,
    keypair: &str,
    file: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let keypair = decode_secret_hex("keypair", keypair, box_::KEYPAIR_SIZE)?;
    let sealed = read_input(file)?;
    let Some(message) = sodium.crypto_box_seal_open(&sealed, &keypair) else {
        anyhow::bail!("cannot open {}: wrong key or corrupted data", file.display());
    };
    let message = zeroize::Zeroizing::new(message);
    write_output(output, &message)
}

/// Print a detached signature of a file
fn sign_file(sodium: &Sodium, secret: &str, file: &Path) -> anyhow::Result<()> {
    let secret = decode_secret_hex("secret key", secret, sign::SECRET_KEY_SIZE)?;
    let message = read_input(file)?;
    let signature = sodium.crypto_sign_detached(&message, &secret)?;
    println!("{}", hex::encode(signature));
    Ok(())
}

/// Verify a detached signature of a file
fn verify_file(sodium: &Sodium, public: &str, signature: &str, file: &Path) -> anyhow::Result<()> {
    let public = decode_hex("public key", public, sign::PUBLIC_KEY_SIZE)?;
    let signature = decode_hex("signature", signature, sign::SIGNATURE_SIZE)?;
    let message = read_input(file)?;

    if !sodium.crypto_sign_verify_detached(&signature, &message, &public) {
        anyhow::bail!("signature verification failed for {}", file.display());
    }
    println!("Signature OK");
    Ok(())
}
