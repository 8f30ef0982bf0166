// ********* Keys and derived addresses ***********

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use snafu::prelude::*;

use crate::config::{BALLOT_SEED, ELECTION_SEED, IDENTITY_SEED, PDA_MARKER, PROGRAM_ID};

pub const PUBKEY_BYTES: usize = 32;

/// A 32-byte account key.
///
/// Voter and authority identities and derived storage addresses share this type,
/// the same way a ledger treats wallets and program accounts alike.
/// The textual form is 64 lowercase hex characters.
#[derive(Eq, PartialEq, Clone, Copy, Hash, Ord, PartialOrd, Default)]
pub struct Pubkey([u8; PUBKEY_BYTES]);

#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
pub enum ParsePubkeyError {
    #[snafu(display("expected {expected} hex characters, found {found}"))]
    WrongLength { expected: usize, found: usize },
    #[snafu(display("invalid hex digit {digit:?} at position {position}"))]
    InvalidDigit { digit: char, position: usize },
}

impl Pubkey {
    pub const fn new_from_array(bytes: [u8; PUBKEY_BYTES]) -> Pubkey {
        Pubkey(bytes)
    }

    pub fn to_bytes(self) -> [u8; PUBKEY_BYTES] {
        self.0
    }

    /// Derives a key from a human-readable label.
    ///
    /// This stands in for a wallet: the same label always maps to the same identity.
    pub fn from_label(label: &str) -> Pubkey {
        hash_seeds(&[IDENTITY_SEED, label.as_bytes()])
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self)
    }
}

impl FromStr for Pubkey {
    type Err = ParsePubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: Vec<char> = s.chars().collect();
        ensure!(
            digits.len() == PUBKEY_BYTES * 2,
            WrongLengthSnafu {
                expected: PUBKEY_BYTES * 2,
                found: digits.len()
            }
        );
        let mut bytes = [0u8; PUBKEY_BYTES];
        for (idx, pair) in digits.chunks(2).enumerate() {
            let hi = hex_value(pair[0], 2 * idx)?;
            let lo = hex_value(pair[1], 2 * idx + 1)?;
            bytes[idx] = (hi << 4) | lo;
        }
        Ok(Pubkey(bytes))
    }
}

fn hex_value(digit: char, position: usize) -> Result<u8, ParsePubkeyError> {
    digit
        .to_digit(16)
        .map(|d| d as u8)
        .context(InvalidDigitSnafu { digit, position })
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<Pubkey>().map_err(de::Error::custom)
    }
}

fn hash_seeds(seeds: &[&[u8]]) -> Pubkey {
    let mut data: Vec<u8> = Vec::new();
    for s in seeds {
        data.extend_from_slice(s);
    }
    let digest = sha256::digest(data);
    let mut bytes = [0u8; PUBKEY_BYTES];
    // sha256::digest yields exactly 64 lowercase hex characters, so every digit parses
    // and the fallback below is never taken.
    for (idx, pair) in digest.as_bytes().chunks(2).take(PUBKEY_BYTES).enumerate() {
        let hi = (pair[0] as char).to_digit(16).unwrap_or(0) as u8;
        let lo = (pair[1] as char).to_digit(16).unwrap_or(0) as u8;
        bytes[idx] = (hi << 4) | lo;
    }
    Pubkey(bytes)
}

/// Computes a program-owned address from a list of seeds.
///
/// The seeds are hashed together with the program id and a fixed marker, so the result
/// cannot be produced by hashing the seeds of another program.
pub fn derive_program_address(seeds: &[&[u8]]) -> Pubkey {
    let program_id = PROGRAM_ID;
    let mut all: Vec<&[u8]> = seeds.to_vec();
    all.push(program_id.as_ref());
    all.push(PDA_MARKER);
    hash_seeds(&all)
}

/// The address of the election created by `authority` with the given `index`.
///
/// The index is encoded as 8 little-endian bytes. Clients can compute this address
/// before the election exists.
pub fn derive_election_address(authority: &Pubkey, index: u64) -> Pubkey {
    derive_program_address(&[ELECTION_SEED, authority.as_ref(), &index.to_le_bytes()])
}

/// The address of the ballot of `voter` in `election`.
pub fn derive_ballot_address(election: &Pubkey, voter: &Pubkey) -> Pubkey {
    derive_program_address(&[BALLOT_SEED, election.as_ref(), voter.as_ref()])
}
