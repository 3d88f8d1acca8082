use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use rand::RngCore;
use tigerkdf::{hash_password, hash_password_encoded, update_password_hash, verify, Params};

#[derive(Parser)]
#[command(author, version, about = "Memory-hard password hashing with garlic cost escalation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a key from a password
    Hash {
        /// Password to hash
        password: String,

        /// Derived key length in bytes
        #[arg(long, default_value_t = 32)]
        hash_size: usize,

        /// Cost-doubling exponent
        #[arg(long, default_value_t = 0)]
        garlic: u8,

        /// Hex-encoded salt; random 16 bytes if omitted
        #[arg(long)]
        salt: Option<String>,

        /// Secret associated data folded into the salt
        #[arg(long)]
        data: Option<String>,

        /// Print a self-describing encoded hash string instead of raw hex
        #[arg(long)]
        encoded: bool,

        #[command(flatten)]
        params: Params,
    },

    /// Check a password against an encoded hash string
    Verify {
        password: String,
        /// Encoded hash string produced by `hash --encoded`
        hash: String,
    },

    /// Escalate the garlic of an existing raw hash without the password
    Update {
        /// Hex-encoded hash to escalate
        hash: String,

        #[arg(long)]
        old_garlic: u8,

        #[arg(long)]
        new_garlic: u8,

        #[command(flatten)]
        params: Params,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    match cli.command {
        Commands::Hash {
            password,
            hash_size,
            garlic,
            salt,
            data,
            encoded,
            params,
        } => {
            let start = Instant::now();
            if encoded {
                let salt = salt.as_deref().map(decode_hex_salt).transpose()?;
                let hash = hash_password_encoded(&password, salt.as_deref(), garlic, &params)
                    .map_err(|e| e.to_string())?;
                eprintln!("derived in {:.2?}", start.elapsed());
                println!("{hash}");
            } else {
                let salt = match salt.as_deref() {
                    Some(hex_str) => decode_hex_salt(hex_str)?,
                    None => generate_salt(),
                };
                let hash = hash_password(
                    hash_size,
                    password.as_bytes(),
                    &salt,
                    garlic,
                    data.as_deref().map(str::as_bytes),
                    &params,
                )
                .map_err(|e| e.to_string())?;
                eprintln!("derived in {:.2?}", start.elapsed());
                println!("{}", hex::encode(hash));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Verify { password, hash } => {
            let start = Instant::now();
            if verify(&password, &hash) {
                eprintln!("ok ({:.2?})", start.elapsed());
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("verification failed");
                Ok(ExitCode::FAILURE)
            }
        }

        Commands::Update {
            hash,
            old_garlic,
            new_garlic,
            params,
        } => {
            let mut hash = hex::decode(&hash).map_err(|e| format!("invalid hex hash: {e}"))?;
            update_password_hash(&mut hash, old_garlic, new_garlic, &params)
                .map_err(|e| e.to_string())?;
            println!("{}", hex::encode(hash));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn decode_hex_salt(hex_str: &str) -> Result<Vec<u8>, String> {
    let salt = hex::decode(hex_str).map_err(|e| format!("invalid hex salt: {e}"))?;
    if salt.len() < 4 {
        return Err("salt must be at least 4 bytes (8 hex digits)".into());
    }
    Ok(salt)
}

fn generate_salt() -> Vec<u8> {
    let mut salt = vec![0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    eprintln!("salt: {}", hex::encode(&salt));
    salt
}
