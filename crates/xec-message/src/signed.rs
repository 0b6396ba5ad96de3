//! Bitcoin-style signed messages.
//!
//! A message is hashed together with a network prefix, signed with a
//! recoverable ECDSA signature, and encoded as 65 base64 bytes: a header
//! byte carrying the recovery ID followed by the compact signature.
//! Verification recovers the public key and compares its HASH160 against the
//! expected public key hash.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use xec_primitives::ecc::Ecc;
use xec_primitives::hash::{sha256d, sha_rmd160};
use xec_primitives::ser::{BytesWriter, Writer};

use crate::MessageError;

/// Default message prefix, including its own length byte.
pub const ECASH_MSG_PREFIX: &[u8] = b"\x16eCash Signed Message:\n";

/// Header byte base for compressed-key recoverable signatures.
const SIG_HEADER_BASE: u8 = 27 + 4;

/// The hash committed to by a signed message.
///
/// sha256d of prefix, VarInt message length, message.
pub fn magic_hash(msg: &[u8], prefix: &[u8]) -> [u8; 32] {
    let mut writer = BytesWriter::with_capacity(prefix.len() + 9 + msg.len());
    writer.put_bytes(prefix);
    writer.put_varint(msg.len() as u64);
    writer.put_bytes(msg);
    sha256d(writer.as_bytes())
}

/// Sign a message, returning the base64-encoded 65-byte signature.
pub fn sign_msg(
    ecc: &dyn Ecc,
    seckey: &[u8; 32],
    msg: &[u8],
    prefix: &[u8],
) -> Result<String, MessageError> {
    let hash = magic_hash(msg, prefix);
    let (sig, recovery_id) = ecc.sign_recoverable(seckey, &hash)?;
    let mut encoded = Vec::with_capacity(65);
    encoded.push(SIG_HEADER_BASE + recovery_id);
    encoded.extend_from_slice(&sig);
    Ok(BASE64.encode(encoded))
}

/// Verify a base64 message signature against a public key hash.
///
/// Never errors; every failure cause is logged at debug level and reported
/// as `false`.
pub fn verify_msg(
    ecc: &dyn Ecc,
    msg: &[u8],
    sig_b64: &str,
    pkh: &[u8; 20],
    prefix: &[u8],
) -> bool {
    let sig_bytes = match BASE64.decode(sig_b64) {
        Ok(sig_bytes) => sig_bytes,
        Err(err) => {
            log::debug!("Invalid signature base64: {err}");
            return false;
        }
    };
    if sig_bytes.len() != 65 {
        log::debug!("Invalid signature length: {}", sig_bytes.len());
        return false;
    }
    let header = sig_bytes[0];
    let recovery_id = match header.checked_sub(SIG_HEADER_BASE) {
        Some(recovery_id) if recovery_id <= 3 => recovery_id,
        _ => {
            log::debug!("Invalid signature header byte: {header:#04x}");
            return false;
        }
    };
    let mut sig = [0u8; 64];
    sig.copy_from_slice(&sig_bytes[1..]);
    let hash = magic_hash(msg, prefix);
    let pubkey = match ecc.recover_sig(&sig, recovery_id, &hash) {
        Ok(pubkey) => pubkey,
        Err(err) => {
            log::debug!("Signature recovery failed: {err}");
            return false;
        }
    };
    if &sha_rmd160(&pubkey) != pkh {
        log::debug!("Recovered public key does not match the public key hash");
        return false;
    }
    true
}
