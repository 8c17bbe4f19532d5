//! Password Hashing and Verification
//!
//! Credential hashing with:
//! - Argon2id hashing with a tunable cost
//! - Random 128-bit salt per call, embedded in the PHC string
//! - Zeroization of cleartext passwords
//! - Unicode NFKC normalization before hashing and verifying
//! - Verification of legacy bcrypt hashes, so old accounts can be rehashed
//!
//! ## Security Features
//! - Memory-hard hashing bounds brute-force speed
//! - Verification never panics or errors: malformed hashes simply fail
//! - Zeroization prevents memory inspection attacks

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants
// ============================================================================

/// Version prefixes of bcrypt modular-crypt strings
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Minimum password length accepted on registration / change
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters")]
    TooLong { max: usize, actual: usize },

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one number")]
    MissingDigit,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// The configured cost is outside what Argon2 accepts
    #[error("Invalid hash cost: {0}")]
    InvalidCost(String),
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// ## Security
/// - Implements `Zeroize` and `ZeroizeOnDrop`
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
///
/// ## Examples
/// ```rust
/// use platform::password::ClearTextPassword;
///
/// let password = ClearTextPassword::new("Abcdef1".to_string()).unwrap();
/// assert!(ClearTextPassword::new("abcdef".to_string()).is_err());
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new password that must satisfy the policy
    ///
    /// - At least [`MIN_PASSWORD_LENGTH`], at most [`MAX_PASSWORD_LENGTH`] characters
    /// - At least one lowercase letter, one uppercase letter and one digit
    /// - No control characters, not whitespace only
    ///
    /// Unicode is normalized using NFKC before validation.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let candidate = Self::unchecked(raw);
        candidate.check_policy()?;
        Ok(candidate)
    }

    /// Create without policy checks
    ///
    /// Used for passwords that are only compared against a stored hash
    /// (login, "current password"), where the policy may have changed since
    /// the hash was written.
    pub fn unchecked(raw: String) -> Self {
        let mut raw = raw;
        let normalized: String = raw.nfkc().collect();
        raw.zeroize();
        Self(normalized)
    }

    /// Whether the password is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn check_policy(&self) -> Result<(), PasswordPolicyError> {
        if self.is_blank() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Count Unicode code points (not bytes)
        let char_count = self.0.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        // Control characters (except tab and newline)
        if self
            .0
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if !self.0.chars().any(|ch| ch.is_lowercase()) {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if !self.0.chars().any(|ch| ch.is_uppercase()) {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if !self.0.chars().any(|ch| ch.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }

        Ok(())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string is self-describing: algorithm, version, cost parameters,
/// salt and digest. Stored strings are not validated on load, so a legacy or
/// corrupted value only fails at verification time.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Wrap a stored hash string
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self { hash: s.into() }
    }

    /// Get the PHC string for storage
    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Written by the older bcrypt scheme and due for an Argon2id rehash
    pub fn is_legacy(&self) -> bool {
        BCRYPT_PREFIXES.iter().any(|p| self.hash.starts_with(p))
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Credential Hasher
// ============================================================================

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashCost {
    /// OWASP recommended Argon2id parameters: m=19456 (19 MiB), t=2, p=1
    ///
    /// Comparable to bcrypt with 10 rounds: tens of milliseconds per hash.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashCost {
    /// Smallest cost Argon2 accepts. Only suitable for tests.
    pub const MINIMUM: Self = Self {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
}

/// One-way salted password hashing
///
/// ## Examples
/// ```rust
/// use platform::password::{ClearTextPassword, CredentialHasher, HashCost};
///
/// let hasher = CredentialHasher::new(HashCost::MINIMUM).unwrap();
/// let password = ClearTextPassword::new("Abcdef1".to_string()).unwrap();
/// let hashed = hasher.hash(&password).unwrap();
///
/// assert!(hasher.verify(&password, &hashed));
/// ```
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    cost: HashCost,
}

impl CredentialHasher {
    pub fn new(cost: HashCost) -> Result<Self, PasswordHashError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|e| PasswordHashError::InvalidCost(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost,
        })
    }

    pub fn cost(&self) -> HashCost {
        self.cost
    }

    /// Hash the password with a fresh random salt
    ///
    /// Two calls with the same password produce different strings.
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        // Generate random salt (128 bits = 16 bytes)
        let salt = SaltString::generate(OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    /// Verify a password against a stored hash
    ///
    /// Recomputes with the salt and parameters embedded in `hashed`, so hashes
    /// written under an older cost keep verifying. Legacy bcrypt hashes are
    /// checked with bcrypt. Returns `false` for malformed hashes.
    pub fn verify(&self, password: &ClearTextPassword, hashed: &HashedPassword) -> bool {
        if hashed.is_legacy() {
            return bcrypt::verify(password.as_bytes(), &hashed.hash).unwrap_or(false);
        }

        let parsed_hash = match PasswordHash::new(&hashed.hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        // Argon2 uses constant-time comparison internally
        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("cost", &self.cost)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
