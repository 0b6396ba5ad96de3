//! Mnemonic phrases (BIP39-style) and PBKDF2 key stretching.
//!
//! Word lists are supplied by the caller; the SDK ships no language data.
//! Entropy maps to words via 11-bit indices over `entropy || checksum`, where
//! the checksum is the leading `len * 8 / 32` bits of SHA-256(entropy).

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha512;

use crate::hash::sha256;
use crate::PrimitivesError;

/// Number of words a mnemonic word list must contain (2^11).
pub const WORD_LIST_LEN: usize = 2048;

/// Iteration count for mnemonic seed stretching.
pub const MNEMONIC_PBKDF2_ROUNDS: u32 = 2048;

/// A mnemonic word list plus the separator joining words in a phrase.
///
/// `words` must contain exactly [`WORD_LIST_LEN`] entries.
#[derive(Debug, Clone, Copy)]
pub struct WordList<'a> {
    pub separator: &'a str,
    pub words: &'a [&'a str],
}

impl WordList<'_> {
    fn check(&self) -> Result<(), PrimitivesError> {
        if self.words.len() != WORD_LIST_LEN {
            return Err(PrimitivesError::InvalidWordListLength {
                expected: WORD_LIST_LEN,
                got: self.words.len(),
            });
        }
        Ok(())
    }

    fn index_of(&self, word: &str) -> Result<u16, PrimitivesError> {
        self.words
            .iter()
            .position(|w| *w == word)
            .map(|i| i as u16)
            .ok_or_else(|| PrimitivesError::UnknownWord(word.to_string()))
    }
}

fn checksum_bits(entropy_len: usize) -> usize {
    entropy_len * 8 / 32
}

/// Read 11 bits starting at `bit_pos`, MSB first.
fn read_bits11(data: &[u8], bit_pos: usize) -> u16 {
    let mut value = 0u16;
    for i in 0..11 {
        let pos = bit_pos + i;
        let bit = (data[pos / 8] >> (7 - pos % 8)) & 1;
        value = (value << 1) | bit as u16;
    }
    value
}

/// Write the low 11 bits of `value` starting at `bit_pos`, MSB first.
fn write_bits11(data: &mut [u8], bit_pos: usize, value: u16) {
    for i in 0..11 {
        let pos = bit_pos + i;
        let bit = ((value >> (10 - i)) & 1) as u8;
        data[pos / 8] |= bit << (7 - pos % 8);
    }
}

/// Encode entropy as a mnemonic phrase.
///
/// # Arguments
/// * `entropy` - 16, 20, 24, 28 or 32 bytes of entropy.
/// * `word_list` - The 2048-entry word list to encode with.
///
/// # Returns
/// The phrase of 12/15/18/21/24 words joined by the list's separator.
pub fn entropy_to_mnemonic(
    entropy: &[u8],
    word_list: &WordList,
) -> Result<String, PrimitivesError> {
    word_list.check()?;
    if !matches!(entropy.len(), 16 | 20 | 24 | 28 | 32) {
        return Err(PrimitivesError::InvalidEntropyLength(entropy.len()));
    }
    let num_checksum_bits = checksum_bits(entropy.len());
    let num_words = (entropy.len() * 8 + num_checksum_bits) / 11;

    // At most 8 checksum bits, so a single appended digest byte suffices.
    let mut data = entropy.to_vec();
    data.push(sha256(entropy)[0]);

    let words: Vec<&str> = (0..num_words)
        .map(|i| word_list.words[read_bits11(&data, i * 11) as usize])
        .collect();
    Ok(words.join(word_list.separator))
}

/// Decode a mnemonic phrase back to its entropy, verifying the checksum.
///
/// # Arguments
/// * `mnemonic` - The phrase, words joined by the list's separator.
/// * `word_list` - The 2048-entry word list the phrase was encoded with.
///
/// # Returns
/// The original entropy bytes, or an error naming the unknown word or the
/// expected vs. actual checksum.
pub fn mnemonic_to_entropy(
    mnemonic: &str,
    word_list: &WordList,
) -> Result<Vec<u8>, PrimitivesError> {
    word_list.check()?;
    let words: Vec<&str> = mnemonic.split(word_list.separator).collect();
    if !matches!(words.len(), 12 | 15 | 18 | 21 | 24) {
        return Err(PrimitivesError::InvalidWordCount(words.len()));
    }
    let entropy_len = words.len() * 11 * 32 / 33 / 8;
    let num_checksum_bits = checksum_bits(entropy_len);

    let mut data = vec![0u8; entropy_len + 1];
    for (i, word) in words.iter().enumerate() {
        let index = word_list.index_of(word)?;
        write_bits11(&mut data, i * 11, index);
    }

    let entropy = data[..entropy_len].to_vec();
    let actual = data[entropy_len] >> (8 - num_checksum_bits);
    let expected = sha256(&entropy)[0] >> (8 - num_checksum_bits);
    if actual != expected {
        return Err(PrimitivesError::MnemonicChecksumMismatch {
            expected: format!("{expected:02x}"),
            actual: format!("{actual:02x}"),
        });
    }
    Ok(entropy)
}

/// Generate fresh entropy for a new mnemonic from the OS RNG.
///
/// # Arguments
/// * `len` - Entropy length in bytes: 16, 20, 24, 28 or 32.
pub fn generate_entropy(len: usize) -> Result<Vec<u8>, PrimitivesError> {
    if !matches!(len, 16 | 20 | 24 | 28 | 32) {
        return Err(PrimitivesError::InvalidEntropyLength(len));
    }
    let mut entropy = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    Ok(entropy)
}

/// PBKDF2 with an arbitrary HMAC pseudo-random function.
///
/// The PRF is a MAC instance already keyed with the password; it is cloned
/// for every invocation. Standard RFC 2898 construction: each derived-key
/// block is `U1 xor U2 xor ... xor Uc`.
///
/// # Arguments
/// * `prf` - Password-keyed MAC instance.
/// * `salt` - Salt bytes.
/// * `iterations` - Iteration count `c`, at least 1.
/// * `dk_len` - Desired derived key length in bytes.
pub fn pbkdf2<M: Mac + Clone>(prf: &M, salt: &[u8], iterations: u32, dk_len: usize) -> Vec<u8> {
    let mut derived_key = Vec::with_capacity(dk_len);
    let mut block_index: u32 = 1;
    while derived_key.len() < dk_len {
        let mut mac = prf.clone();
        mac.update(salt);
        mac.update(&block_index.to_be_bytes());
        let mut u = mac.finalize().into_bytes();
        let mut block = u.clone();
        for _ in 1..iterations {
            let mut mac = prf.clone();
            mac.update(&u);
            u = mac.finalize().into_bytes();
            for (out, byte) in block.iter_mut().zip(u.iter()) {
                *out ^= byte;
            }
        }
        let take = (dk_len - derived_key.len()).min(block.len());
        derived_key.extend_from_slice(&block[..take]);
        block_index += 1;
    }
    derived_key
}

/// Stretch a mnemonic phrase into a 64-byte wallet seed.
///
/// PBKDF2-HMAC-SHA512 with 2048 iterations and salt `"mnemonic" || passphrase`.
/// The phrase is not validated here; any string stretches to a seed.
pub fn mnemonic_to_seed(mnemonic: &str, passphrase: &str) -> [u8; 64] {
    let prf = Hmac::<Sha512>::new_from_slice(mnemonic.as_bytes())
        .expect("HMAC accepts any key length");
    let salt = format!("mnemonic{passphrase}");
    let derived = pbkdf2(&prf, salt.as_bytes(), MNEMONIC_PBKDF2_ROUNDS, 64);
    let mut seed = [0u8; 64];
    seed.copy_from_slice(&derived);
    seed
}
