use log::warn;
use pbkdf2::pbkdf2;
use rand::Rng;
use subtle::ConstantTimeEq;

use crate::modules::error::HashError;
use crate::HmacSha256;

/// Scheme tag written in front of every encoded hash
pub const HASH_SCHEME: &str = "pbkdf2-sha256";

/// Round counts below this still work but are logged as weak
pub const MIN_RECOMMENDED_ROUNDS: u32 = 10_000;

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Function to generate a random salt for PBKDF2
pub fn generate_random_salt() -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..SALT_LEN).map(|_| rng.gen()).collect()
}

/// Function to derive a 32-byte key from the password using PBKDF2
pub fn derive_key(password: &str, salt: &[u8], rounds: u32) -> Vec<u8> {
    let mut key = vec![0u8; KEY_LEN];
    pbkdf2::<HmacSha256>(password.as_bytes(), salt, rounds, &mut key);
    key
}

/// Hash a password with a fresh salt.
///
/// The result is `pbkdf2-sha256$<rounds>$<salt-hex>$<hash-hex>`, so the cost
/// factor travels with the hash and can be raised later without breaking
/// existing credentials. A round count of zero is bumped to one.
pub fn hash_password(password: &str, rounds: u32) -> String {
    let rounds = rounds.max(1);
    if rounds < MIN_RECOMMENDED_ROUNDS {
        warn!(
            "Hashing with {} rounds, below the recommended minimum of {}",
            rounds, MIN_RECOMMENDED_ROUNDS
        );
    }

    let salt = generate_random_salt();
    let key = derive_key(password, &salt, rounds);

    format!(
        "{}${}${}${}",
        HASH_SCHEME,
        rounds,
        hex::encode(&salt),
        hex::encode(key)
    )
}

/// Check a password against an encoded hash in constant time
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, HashError> {
    let parsed = ParsedHash::parse(encoded)?;
    let candidate = derive_key(password, &parsed.salt, parsed.rounds);
    Ok(candidate.as_slice().ct_eq(parsed.key.as_slice()).into())
}

/// Round count recorded in an encoded hash
pub fn hash_rounds(encoded: &str) -> Result<u32, HashError> {
    ParsedHash::parse(encoded).map(|parsed| parsed.rounds)
}

/// Components of an encoded hash
struct ParsedHash {
    rounds: u32,
    salt: Vec<u8>,
    key: Vec<u8>,
}

impl ParsedHash {
    fn parse(encoded: &str) -> Result<Self, HashError> {
        let parts: Vec<&str> = encoded.split('$').collect();
        if parts.len() != 4 {
            return Err(HashError::Malformed);
        }
        if parts[0] != HASH_SCHEME {
            return Err(HashError::UnsupportedScheme(parts[0].to_string()));
        }

        let rounds = match parts[1].parse::<u32>() {
            Ok(rounds) if rounds > 0 => rounds,
            _ => return Err(HashError::InvalidRounds(parts[1].to_string())),
        };

        let salt = hex::decode(parts[2]).map_err(|_| HashError::Malformed)?;
        let key = hex::decode(parts[3]).map_err(|_| HashError::Malformed)?;
        if salt.is_empty() || key.len() != KEY_LEN {
            return Err(HashError::Malformed);
        }

        Ok(Self { rounds, salt, key })
    }
}
