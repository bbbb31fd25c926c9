// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::BufRead;

use levelup_api::auth::{BcryptHasher, PasswordHasher};

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Prints the bcrypt hash of a password.
pub async fn hash_password(_cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = if args.stdin {
        read_line_from_stdin()?
    } else {
        args.password
            .ok_or_else(|| BinError::config("No password provided"))?
    };

    println!("{}", hash_with_cost(&password, args.cost).await?);
    Ok(())
}

/// Hashes a password at the given cost.
pub(crate) async fn hash_with_cost(password: &str, cost: u32) -> BinResult<String> {
    if !(4..=31).contains(&cost) {
        return Err(BinError::config("bcrypt cost must be between 4 and 31"));
    }
    if password.is_empty() {
        return Err(BinError::config("Password cannot be empty"));
    }

    BcryptHasher::new(cost)
        .hash(password)
        .await
        .map_err(|e| BinError::runtime(format!("Hashing failed: {}", e)))
}

fn read_line_from_stdin() -> BinResult<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_verifies() {
        let hash = hash_with_cost("user12345", 4).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(BcryptHasher::new(4).verify("user12345", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        assert!(hash_with_cost("user12345", 3).await.is_err());
        assert!(hash_with_cost("user12345", 32).await.is_err());
        assert!(hash_with_cost("", 4).await.is_err());
    }
}
