// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `gen-secret` command.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use tracing::info;

use levelup_config::schema::MIN_SECRET_BYTES;

use crate::cli::{Cli, GenSecretArgs};
use crate::error::{BinError, BinResult};

/// Prints or writes a new base64 token signing secret.
pub fn gen_secret(_cli: &Cli, args: GenSecretArgs) -> BinResult<()> {
    let secret = generate_secret(args.bytes)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", secret))
                .map_err(|e| BinError::write(&path, e))?;
            info!("Secret written to {}", path.display());
        }
        None => println!("{}", secret),
    }

    Ok(())
}

/// Generates `bytes` random bytes, base64 encoded.
pub fn generate_secret(bytes: usize) -> BinResult<String> {
    if bytes < MIN_SECRET_BYTES {
        return Err(BinError::config(format!(
            "Secret must be at least {} bytes",
            MIN_SECRET_BYTES
        )));
    }

    let mut key = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut key);
    Ok(STANDARD.encode(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_generate_secret_length() {
        let secret = generate_secret(64).unwrap();
        assert_eq!(STANDARD.decode(&secret).unwrap().len(), 64);
        assert_ne!(secret, generate_secret(64).unwrap());
    }

    #[test]
    fn test_generate_secret_too_short() {
        assert!(generate_secret(MIN_SECRET_BYTES - 1).is_err());
    }

    #[test]
    fn test_generated_secret_passes_config_validation() {
        let secret = generate_secret(MIN_SECRET_BYTES).unwrap();
        let yaml = format!("security:\n  jwt:\n    secret: \"{}\"\n", secret);
        assert!(levelup_config::load_config_str(&yaml, levelup_config::ConfigFormat::Yaml).is_ok());
    }

    #[test]
    fn test_gen_secret_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jwt.key");
        let cli = Cli::parse_from(["levelup"]);
        let args = GenSecretArgs {
            bytes: 48,
            output: Some(path.clone()),
        };

        gen_secret(&cli, args).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(STANDARD.decode(written.trim()).unwrap().len(), 48);
    }
}
