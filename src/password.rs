//! Profile password hashing.
//!
//! Every imported profile gets the bcrypt hash of its user name as password.
//! The salt is derived from the generation seed and the user name, so a
//! rerun with the same seed yields byte-identical output.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use recipe_import_core::emit::PasswordHasher;

#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
    seed: u64,
}

impl BcryptHasher {
    pub fn new(cost: u32, seed: u64) -> Self {
        Self { cost, seed }
    }

    fn salt(&self, username: &str) -> [u8; 16] {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(username.as_bytes());
        let digest = hasher.finalize();
        let mut salt = [0u8; 16];
        salt.copy_from_slice(&digest[..16]);
        salt
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash_password(&self, username: &str) -> Result<String> {
        let parts = bcrypt::hash_with_salt(username, self.cost, self.salt(username))
            .with_context(|| format!("Failed to hash password for '{}'", username))?;
        Ok(parts.format_for_version(bcrypt::Version::TwoB))
    }
}
