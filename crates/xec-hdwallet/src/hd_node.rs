//! BIP32 HD nodes.
//!
//! An `HdNode` is one node of a derivation tree. Nodes without a private key
//! are watch-only: they can still derive non-hardened children and encode as
//! an xpub, but cannot derive hardened children.

use xec_primitives::base58;
use xec_primitives::ecc::{Ecc, EccError};
use xec_primitives::hash::{sha512_hmac, sha_rmd160};
use xec_primitives::ser::{BytesReader, BytesWriter, Writer};

use crate::HdWalletError;

/// First hardened derivation index.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// xpub version marker for mainnet.
pub const XPUB_VERSION_MAINNET: u32 = 0x0488_b21e;
/// xpub version marker for testnet.
pub const XPUB_VERSION_TESTNET: u32 = 0x0435_87cf;

const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";
const XPUB_PAYLOAD_LEN: usize = 78;

/// One node of a BIP32 derivation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HdNode {
    seckey: Option<[u8; 32]>,
    pubkey: [u8; 33],
    chain_code: [u8; 32],
    depth: u8,
    index: u32,
    parent_fingerprint: u32,
}

impl HdNode {
    /// Build the master node from a seed.
    ///
    /// # Arguments
    /// * `ecc` - Elliptic curve implementation.
    /// * `seed` - 16 to 64 bytes of seed material, e.g. from
    ///   `mnemonic_to_seed`.
    pub fn from_seed(ecc: &dyn Ecc, seed: &[u8]) -> Result<HdNode, HdWalletError> {
        if seed.len() < 16 || seed.len() > 64 {
            return Err(HdWalletError::InvalidSeedLength(seed.len()));
        }
        let hmac = sha512_hmac(MASTER_HMAC_KEY, seed);
        let mut seckey = [0u8; 32];
        seckey.copy_from_slice(&hmac[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&hmac[32..]);
        let pubkey = ecc.derive_pubkey(&seckey)?;
        Ok(HdNode {
            seckey: Some(seckey),
            pubkey,
            chain_code,
            depth: 0,
            index: 0,
            parent_fingerprint: 0,
        })
    }

    pub fn seckey(&self) -> Option<&[u8; 32]> {
        self.seckey.as_ref()
    }

    pub fn pubkey(&self) -> &[u8; 33] {
        &self.pubkey
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn parent_fingerprint(&self) -> u32 {
        self.parent_fingerprint
    }

    /// First 4 bytes of HASH160 of the public key, as a big-endian u32.
    pub fn fingerprint(&self) -> u32 {
        let hash = sha_rmd160(&self.pubkey);
        u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
    }

    /// Drop the private key, leaving a watch-only node.
    pub fn to_watch_only(&self) -> HdNode {
        HdNode { seckey: None, ..self.clone() }
    }

    /// Derive the child at `index`; hardened iff `index >= 0x80000000`.
    ///
    /// An invalid derived scalar or an identity-point sum retries at
    /// `index + 1`, as the standard specifies.
    pub fn derive(&self, ecc: &dyn Ecc, index: u32) -> Result<HdNode, HdWalletError> {
        let mut index = index;
        loop {
            if let Some(node) = self.derive_once(ecc, index)? {
                return Ok(node);
            }
            index = index
                .checked_add(1)
                .ok_or(HdWalletError::DerivationIndexOverflow)?;
        }
    }

    /// Derive the hardened child at `index`, which must be below the
    /// hardened offset.
    pub fn derive_hardened(&self, ecc: &dyn Ecc, index: u32) -> Result<HdNode, HdWalletError> {
        if index >= HARDENED_OFFSET {
            return Err(HdWalletError::InvalidHardenedIndex(index));
        }
        self.derive(ecc, index + HARDENED_OFFSET)
    }

    /// Derive along a path like `m/0'/1/2'`.
    ///
    /// A leading `m` segment requires this node to be the master.
    pub fn derive_path(&self, ecc: &dyn Ecc, path: &str) -> Result<HdNode, HdWalletError> {
        let mut node = self.clone();
        for (segment_idx, segment) in path.split('/').enumerate() {
            if segment_idx == 0 && segment == "m" {
                if self.parent_fingerprint != 0 {
                    return Err(HdWalletError::ExpectedMaster);
                }
                continue;
            }
            let (number, hardened) = match segment.strip_suffix('\'') {
                Some(number) => (number, true),
                None => (segment, false),
            };
            let index: u32 = number
                .parse()
                .map_err(|_| HdWalletError::InvalidPathSegment(segment.to_string()))?;
            node = if hardened {
                node.derive_hardened(ecc, index)?
            } else {
                node.derive(ecc, index)?
            };
        }
        Ok(node)
    }

    /// One derivation attempt; `Ok(None)` means retry at the next index.
    fn derive_once(&self, ecc: &dyn Ecc, index: u32) -> Result<Option<HdNode>, HdWalletError> {
        let mut data = Vec::with_capacity(37);
        if index >= HARDENED_OFFSET {
            let seckey = self.seckey.as_ref().ok_or(HdWalletError::MissingSeckey)?;
            data.push(0x00);
            data.extend_from_slice(seckey);
        } else {
            data.extend_from_slice(&self.pubkey);
        }
        data.extend_from_slice(&index.to_be_bytes());
        let hmac = sha512_hmac(&self.chain_code, &data);
        let mut tweak = [0u8; 32];
        tweak.copy_from_slice(&hmac[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&hmac[32..]);
        if !ecc.is_valid_seckey(&tweak) {
            return Ok(None);
        }

        let (seckey, pubkey) = if let Some(seckey) = &self.seckey {
            match ecc.seckey_add(seckey, &tweak) {
                Ok(child_seckey) => {
                    let pubkey = ecc.derive_pubkey(&child_seckey)?;
                    (Some(child_seckey), pubkey)
                }
                Err(EccError::InvalidResult) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
        } else {
            match ecc.pubkey_add(&self.pubkey, &tweak) {
                Ok(pubkey) => (None, pubkey),
                Err(EccError::InvalidResult) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
        };

        Ok(Some(HdNode {
            seckey,
            pubkey,
            chain_code,
            depth: self.depth + 1,
            index,
            parent_fingerprint: self.fingerprint(),
        }))
    }

    /// Encode the public part of this node as a base58check xpub string.
    pub fn xpub(&self, version: u32) -> Result<String, HdWalletError> {
        if self.pubkey[0] != 0x02 && self.pubkey[0] != 0x03 {
            return Err(HdWalletError::NotCompressed(self.pubkey[0]));
        }
        let mut writer = BytesWriter::with_capacity(XPUB_PAYLOAD_LEN);
        writer.put_u32_be(version);
        writer.put_u8(self.depth);
        writer.put_u32_be(self.parent_fingerprint);
        writer.put_u32_be(self.index);
        writer.put_bytes(&self.chain_code);
        writer.put_bytes(&self.pubkey);
        Ok(base58::check_encode(writer.as_bytes()))
    }

    /// Decode an xpub string into a watch-only node.
    pub fn from_xpub(xpub: &str) -> Result<HdNode, HdWalletError> {
        let payload = base58::check_decode(xpub)?;
        if payload.len() != XPUB_PAYLOAD_LEN {
            return Err(HdWalletError::InvalidXpubLength(payload.len()));
        }
        let mut reader = BytesReader::new(&payload);
        let version = reader.read_u32_be()?;
        if version != XPUB_VERSION_MAINNET && version != XPUB_VERSION_TESTNET {
            return Err(HdWalletError::UnknownXpubVersion(version));
        }
        let depth = reader.read_u8()?;
        let parent_fingerprint = reader.read_u32_be()?;
        let index = reader.read_u32_be()?;
        let chain_code = reader.read_array::<32>()?;
        let pubkey = reader.read_array::<33>()?;
        if pubkey[0] != 0x02 && pubkey[0] != 0x03 {
            return Err(HdWalletError::NotCompressed(pubkey[0]));
        }
        Ok(HdNode {
            seckey: None,
            pubkey,
            chain_code,
            depth,
            index,
            parent_fingerprint,
        })
    }
}
