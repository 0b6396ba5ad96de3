//! Legacy Base58Check addresses.
//!
//! An address is a version byte plus a 20-byte hash: the public key hash for
//! P2PKH, the script hash for P2SH. Two networks are recognized.

use std::fmt;
use std::str::FromStr;

use xec_primitives::base58;
use xec_primitives::hash::sha_rmd160;

use crate::script::{p2pkh_bytecode, p2sh_bytecode};
use crate::{Script, ScriptError};

/// Which chain an address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Mainnet,
    Testnet,
}

/// What the 20-byte payload hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    P2pkh,
    P2sh,
}

/// A parsed legacy address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    network: Network,
    addr_type: AddressType,
    hash: [u8; 20],
}

fn version_byte(network: Network, addr_type: AddressType) -> u8 {
    match (network, addr_type) {
        (Network::Mainnet, AddressType::P2pkh) => 0x00,
        (Network::Mainnet, AddressType::P2sh) => 0x05,
        (Network::Testnet, AddressType::P2pkh) => 0x6f,
        (Network::Testnet, AddressType::P2sh) => 0xc4,
    }
}

impl Address {
    /// Create an address from its parts.
    pub fn new(network: Network, addr_type: AddressType, hash: [u8; 20]) -> Self {
        Address { network, addr_type, hash }
    }

    /// The P2PKH address of a public key.
    ///
    /// # Arguments
    /// * `pubkey` - SEC1-encoded public key bytes (hashed as-is).
    /// * `network` - Target network.
    pub fn p2pkh_from_pubkey(pubkey: &[u8], network: Network) -> Self {
        Address::new(network, AddressType::P2pkh, sha_rmd160(pubkey))
    }

    /// The P2SH address of a redeem script.
    pub fn p2sh_from_script(redeem_script: &Script, network: Network) -> Self {
        Address::new(network, AddressType::P2sh, sha_rmd160(redeem_script.as_bytes()))
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn addr_type(&self) -> AddressType {
        self.addr_type
    }

    /// The 20-byte hash payload.
    pub fn hash(&self) -> &[u8; 20] {
        &self.hash
    }

    /// The output script this address pays to.
    pub fn to_script(&self) -> Script {
        match self.addr_type {
            AddressType::P2pkh => Script::new(p2pkh_bytecode(&self.hash)),
            AddressType::P2sh => Script::new(p2sh_bytecode(&self.hash)),
        }
    }
}

impl FromStr for Address {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let payload = base58::check_decode(s)?;
        if payload.len() != 21 {
            return Err(ScriptError::InvalidAddressPayload(payload.len()));
        }
        let (network, addr_type) = match payload[0] {
            0x00 => (Network::Mainnet, AddressType::P2pkh),
            0x05 => (Network::Mainnet, AddressType::P2sh),
            0x6f => (Network::Testnet, AddressType::P2pkh),
            0xc4 => (Network::Testnet, AddressType::P2sh),
            version => return Err(ScriptError::UnsupportedAddressVersion(version)),
        };
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Ok(Address { network, addr_type, hash })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut payload = [0u8; 21];
        payload[0] = version_byte(self.network, self.addr_type);
        payload[1..].copy_from_slice(&self.hash);
        f.write_str(&base58::check_encode(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_p2pkh_address() {
        let address: Address = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".parse().unwrap();
        assert_eq!(address.network(), Network::Mainnet);
        assert_eq!(address.addr_type(), AddressType::P2pkh);
        assert_eq!(
            hex::encode(address.hash()),
            "62e907b15cbf27d5425399ebf6f0fb50ebb88f18"
        );
        assert_eq!(address.to_string(), "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa");
    }

    #[test]
    fn test_parse_known_p2sh_address() {
        let address: Address = "3P14159f73E4gFr7JterCCQh9QjiTjiZrG".parse().unwrap();
        assert_eq!(address.network(), Network::Mainnet);
        assert_eq!(address.addr_type(), AddressType::P2sh);
        assert!(address.to_script().is_p2sh());
    }

    #[test]
    fn test_testnet_roundtrip() {
        let address = Address::new(Network::Testnet, AddressType::P2pkh, [0x17; 20]);
        let parsed: Address = address.to_string().parse().unwrap();
        assert_eq!(parsed, address);
    }

    #[test]
    fn test_to_script_matches_template() {
        let address: Address = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".parse().unwrap();
        let script = address.to_script();
        assert!(script.is_p2pkh());
        assert_eq!(
            Script::from_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa").unwrap(),
            script
        );
    }

    #[test]
    fn test_unsupported_version_byte() {
        // Version 0x80 payload, 21 bytes.
        let mut payload = [0u8; 21];
        payload[0] = 0x80;
        let encoded = base58::check_encode(&payload);
        assert!(matches!(
            encoded.parse::<Address>(),
            Err(ScriptError::UnsupportedAddressVersion(0x80))
        ));
    }

    #[test]
    fn test_bad_checksum_rejected() {
        assert!("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb".parse::<Address>().is_err());
    }
}
