// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LAND DAO - CRYPTOGRAPHY MODULE
//
// Ed25519 signing for the local sale chain.
// - Key generation (random and deterministic from a BIP39 mnemonic)
// - Message signing and verification
// - LND address derivation (Base58Check with BLAKE2b-160)
// - Indexed dev-account derivation (the HD-wallet-provider analog)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use bip39::{Language, Mnemonic};
use blake2::Blake2b512;
use digest::Digest;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

/// Ed25519 secret keys are 32-byte seeds
pub const SECRET_KEY_LEN: usize = 32;
/// Ed25519 public keys are 32 bytes
pub const PUBLIC_KEY_LEN: usize = 32;
/// Ed25519 signatures are 64 bytes
pub const SIGNATURE_LEN: usize = 64;

#[derive(Debug)]
pub enum CryptoError {
    InvalidKey,
    InvalidMnemonic(String),
    VerificationFailed,
}

impl std::fmt::Display for CryptoError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CryptoError::InvalidKey => write!(f, "Invalid key format"),
            CryptoError::InvalidMnemonic(msg) => write!(f, "Invalid mnemonic: {}", msg),
            CryptoError::VerificationFailed => write!(f, "Signature verification failed"),
        }
    }
}

impl std::error::Error for CryptoError {}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct KeyPair {
    pub public_key: Vec<u8>,
    pub secret_key: Vec<u8>,
}

/// SECURITY: Zeroize secret key from memory on drop to prevent
/// recovery via memory dump, swap file, or core dump.
impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

/// Generate a new random Ed25519 key pair
pub fn generate_keypair() -> KeyPair {
    let mut seed = [0u8; SECRET_KEY_LEN];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut seed);
    let signing = SigningKey::from_bytes(&seed);
    seed.zeroize();
    KeyPair {
        public_key: signing.verifying_key().to_bytes().to_vec(),
        secret_key: signing.to_bytes().to_vec(),
    }
}

/// Generate a DETERMINISTIC Ed25519 keypair from a BIP39 seed and account index.
///
/// Same seed and index ALWAYS produce the same keypair and address, so the
/// dev chain and any client derive identical accounts from one mnemonic.
///
/// Domain separation:
///   salt    = SHA-256("land-ed25519-keygen-v1")
///   derived = SHA-256(salt || bip39_seed || index_le) → 32-byte Ed25519 seed
///
/// # Panics
/// If the seed is shorter than 32 bytes.
pub fn keypair_from_seed(bip39_seed: &[u8], index: u32) -> KeyPair {
    assert!(
        bip39_seed.len() >= 32,
        "BIP39 seed must be at least 32 bytes"
    );

    let salt = Sha256::digest(b"land-ed25519-keygen-v1");
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(bip39_seed);
    hasher.update(index.to_le_bytes());
    let mut derived: [u8; 32] = hasher.finalize().into();

    let signing = SigningKey::from_bytes(&derived);
    derived.zeroize();

    KeyPair {
        public_key: signing.verifying_key().to_bytes().to_vec(),
        secret_key: signing.to_bytes().to_vec(),
    }
}

/// Derive the first `count` dev accounts from a BIP39 mnemonic phrase.
///
/// The local chain seeds its genesis balances from these accounts and any
/// client deriving from the same phrase controls them (account index order
/// is stable, like the original HD wallet provider).
pub fn derive_dev_accounts(mnemonic_phrase: &str, count: u32) -> Result<Vec<KeyPair>, CryptoError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, mnemonic_phrase)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
    let seed = mnemonic.to_seed("");
    Ok((0..count).map(|i| keypair_from_seed(&seed, i)).collect())
}

/// Reconstruct a KeyPair from an existing 32-byte Ed25519 secret key.
pub fn keypair_from_secret(secret_bytes: &[u8]) -> Result<KeyPair, CryptoError> {
    let seed: [u8; SECRET_KEY_LEN] = secret_bytes.try_into().map_err(|_| CryptoError::InvalidKey)?;
    let signing = SigningKey::from_bytes(&seed);
    Ok(KeyPair {
        public_key: signing.verifying_key().to_bytes().to_vec(),
        secret_key: signing.to_bytes().to_vec(),
    })
}

/// Sign a message with an Ed25519 secret key
pub fn sign_message(message: &[u8], secret_key_bytes: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let seed: [u8; SECRET_KEY_LEN] = secret_key_bytes
        .try_into()
        .map_err(|_| CryptoError::InvalidKey)?;
    let signing = SigningKey::from_bytes(&seed);
    Ok(signing.sign(message).to_bytes().to_vec())
}

/// Verify an Ed25519 signature. Returns false on any malformed input.
pub fn verify_signature(message: &[u8], signature_bytes: &[u8], public_key_bytes: &[u8]) -> bool {
    let pk_array: [u8; PUBLIC_KEY_LEN] = match public_key_bytes.try_into() {
        Ok(a) => a,
        Err(_) => return false,
    };
    let vk = match VerifyingKey::from_bytes(&pk_array) {
        Ok(k) => k,
        Err(_) => return false,
    };
    let sig_array: [u8; SIGNATURE_LEN] = match signature_bytes.try_into() {
        Ok(a) => a,
        Err(_) => return false,
    };
    let sig = Signature::from_bytes(&sig_array);
    vk.verify(message, &sig).is_ok()
}

/// Derive an LND address from an Ed25519 public key (Base58Check format)
///
/// Format: Base58(version_byte + BLAKE2b160(pubkey) + checksum)
/// - Version: 0x35
/// - Hash: BLAKE2b-160 (20 bytes)
/// - Checksum: First 4 bytes of SHA256(SHA256(version + hash))
/// - Result: "LND" prefix + Base58 encoded payload
pub fn public_key_to_address(public_key_bytes: &[u8]) -> String {
    const VERSION_BYTE: u8 = 0x35;

    // 1. Hash public key with BLAKE2b-512, take first 20 bytes (160-bit)
    let mut hasher = Blake2b512::new();
    hasher.update(public_key_bytes);
    let hash_result = hasher.finalize();
    let pubkey_hash = &hash_result[..20];

    // 2. Construct payload: version + hash
    let mut payload = vec![VERSION_BYTE];
    payload.extend_from_slice(pubkey_hash);

    // 3. Calculate checksum: SHA256(SHA256(payload))
    let checksum_full = {
        let hash1 = Sha256::digest(&payload);
        Sha256::digest(hash1)
    };
    let checksum = &checksum_full[..4];

    // 4. Combine: version + hash + checksum
    let mut address_bytes = payload;
    address_bytes.extend_from_slice(checksum);

    // 5. Base58 encode with a readable prefix
    format!("LND{}", bs58::encode(&address_bytes).into_string())
}

/// Validate LND address format and checksum
///
/// Checks:
/// 1. Starts with "LND" prefix
/// 2. Valid Base58 encoding
/// 3. Correct length (25 bytes decoded)
/// 4. Valid checksum
pub fn validate_address(address: &str) -> bool {
    if !address.starts_with("LND") {
        return false;
    }

    let base58_part = &address[3..];
    let decoded = match bs58::decode(base58_part).into_vec() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    // Must be 25 bytes: 1 (version) + 20 (hash) + 4 (checksum)
    if decoded.len() != 25 {
        return false;
    }

    let payload = &decoded[..21];
    let checksum = &decoded[21..];

    let expected_checksum = {
        let hash1 = Sha256::digest(payload);
        Sha256::digest(hash1)
    };

    checksum == &expected_checksum[..4]
}

/// Extract the public key hash from an address.
///
/// Cannot reverse to the original public key (one-way hash).
/// Returns Some(hash) if the address is valid, None otherwise.
pub fn address_to_pubkey_hash(address: &str) -> Option<Vec<u8>> {
    if !validate_address(address) {
        return None;
    }

    let base58_part = &address[3..];
    let decoded = bs58::decode(base58_part).into_vec().ok()?;

    Some(decoded[1..21].to_vec())
}
