//! # Credential Store
//!
//! Validates `(user, password)` pairs against a static table loaded from a
//! colon-separated record file. The server only ever calls `validate`; the
//! loading path exists because a runnable binary needs one, not because the
//! on-disk format is part of the tested core contract.
//!
//! ## Design Principles
//!
//! 1. **One Accepted Hash Format**: only `{SHA}<base64(SHA1(password))>`
//!    specs are honored; anything else is logged once and ignored.
//! 2. **Case-Sensitive Users**: user names compare byte-for-byte.

use std::collections::HashMap;
use std::path::Path;

use base64::Engine;
use hkv_common::{HkvError, HkvResult};
use sha1::{Digest, Sha1};
use tracing::warn;

const SHA_PREFIX: &str = "{SHA}";

/// A loaded table of user -> accepted `{SHA}...` password spec.
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    /// Loads a credential file: one `user:spec` record per line, `#`
    /// comments, leading whitespace trimmed. Lines whose spec is not a
    /// `{SHA}` hash are skipped and logged once.
    pub fn load_from_path(path: &Path) -> HkvResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| HkvError::Internal(format!("failed to read credential file: {e}")))?;
        Ok(Self::parse(&contents))
    }

    /// Builds a store directly from `user:spec` record text, bypassing the
    /// filesystem. Exposed for tests and embedders that already hold the
    /// records in memory.
    pub fn parse(contents: &str) -> Self {
        let mut users = HashMap::new();
        for raw_line in contents.lines() {
            let line = raw_line.trim_start();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((user, spec)) = line.split_once(':') else {
                warn!(line = raw_line, "credential line missing ':' separator, skipping");
                continue;
            };
            if !spec.starts_with(SHA_PREFIX) {
                warn!(user, "credential spec is not a {{SHA}} hash, skipping");
                continue;
            }
            users.insert(user.to_string(), spec.to_string());
        }
        CredentialStore { users }
    }

    /// Returns true iff `user` exists and `password` hashes to its stored
    /// spec, compared byte-for-byte.
    pub fn validate(&self, user: &str, password: &str) -> bool {
        match self.users.get(user) {
            Some(expected) => expected.as_str() == hash_password(password),
            None => false,
        }
    }
}

/// Computes the `{SHA}<base64(SHA1(password))>` spec for a plaintext
/// password, for building credential files and records.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    format!("{SHA_PREFIX}{}", base64::engine::general_purpose::STANDARD.encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_matching_password() {
        let expected = hash_password("secret");
        let store = CredentialStore::parse(&format!("alice:{expected}\n"));
        assert!(store.validate("alice", "secret"));
        assert!(!store.validate("alice", "wrong"));
    }

    #[test]
    fn unknown_user_never_matches() {
        let store = CredentialStore::parse("alice:{SHA}abc\n");
        assert!(!store.validate("bob", "anything"));
    }

    #[test]
    fn skips_comments_and_non_sha_specs() {
        let store = CredentialStore::parse("# comment\nbob:plaintextpassword\n  alice:{SHA}abc\n");
        assert!(!store.validate("bob", "plaintextpassword"));
        assert!(store.users.contains_key("alice"));
    }

    #[test]
    fn user_names_are_case_sensitive() {
        let expected = hash_password("secret");
        let store = CredentialStore::parse(&format!("Alice:{expected}\n"));
        assert!(!store.validate("alice", "secret"));
        assert!(store.validate("Alice", "secret"));
    }
}
