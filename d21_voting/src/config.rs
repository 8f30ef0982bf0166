// ********* Program constants ***********

use serde::{Deserialize, Serialize};

use crate::address::Pubkey;

/// The id of the program that owns every election and ballot account.
/// It is mixed into every derived address.
pub const PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0xb6, 0xbe, 0x57, 0x96, 0x51, 0xc3, 0xe1, 0x69, 0x6d, 0x47, 0x90, 0x50, 0x78, 0x1e, 0x70, 0x11,
    0xca, 0x18, 0x00, 0x85, 0x6a, 0x87, 0x04, 0x08, 0xca, 0xe1, 0xfd, 0x4f, 0x29, 0xfc, 0x48, 0x6c,
]);

pub const ELECTION_SEED: &[u8] = b"election";
pub const BALLOT_SEED: &[u8] = b"voter_ballot";
pub const IDENTITY_SEED: &[u8] = b"identity";
pub const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

pub const MAX_TITLE_LEN: usize = 200;
pub const MIN_CANDIDATES: usize = 2;
pub const MAX_CANDIDATES: usize = 20;
pub const MAX_CANDIDATE_NAME_LEN: usize = 50;

/// How many times a transaction is replayed after losing a write race.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

// ********* Account data structures ***********

/// One entry of the candidate list of an election.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    #[serde(rename = "positiveVotes")]
    pub positive_votes: u64,
    #[serde(rename = "negativeVotes")]
    pub negative_votes: u64,
}

impl Candidate {
    pub fn new(name: &str) -> Candidate {
        Candidate {
            name: name.to_string(),
            positive_votes: 0,
            negative_votes: 0,
        }
    }

    /// positive - negative, the number used for ranking.
    pub fn score(&self) -> i128 {
        self.positive_votes as i128 - self.negative_votes as i128
    }
}

/// The election record, stored at the address derived from (authority, index).
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Election {
    pub authority: Pubkey,
    pub index: u64,
    pub title: String,
    pub candidates: Vec<Candidate>,
    #[serde(rename = "positiveVotesPerVoter")]
    pub positive_votes_per_voter: u8,
    #[serde(rename = "negativeVotesPerVoter")]
    pub negative_votes_per_voter: u8,
    #[serde(rename = "totalVoters")]
    pub total_voters: u64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

/// The proof that a voter took part in an election.
///
/// It is written once when the vote is accepted and never modified.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VoterBallot {
    pub election: Pubkey,
    pub voter: Pubkey,
    #[serde(rename = "positiveChoices")]
    pub positive_choices: Vec<u8>,
    #[serde(rename = "negativeChoices")]
    pub negative_choices: Vec<u8>,
}

/// The two kinds of records owned by the program.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AccountData {
    Election(Election),
    VoterBallot(VoterBallot),
}

/// A record as held by an account store.
///
/// `revision` starts at 0 and grows by one on every update.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub revision: u64,
    pub data: AccountData,
}

/// Which half of a ballot a choice belongs to.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum VoteSide {
    Positive,
    Negative,
}

impl std::fmt::Display for VoteSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteSide::Positive => write!(f, "positive"),
            VoteSide::Negative => write!(f, "negative"),
        }
    }
}

// ********* Instructions ***********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct InitializeElectionArgs {
    pub authority: Pubkey,
    /// Any value is accepted. The reference client uses the current time in seconds,
    /// so keeping it unique per authority is up to the caller.
    pub index: u64,
    pub title: String,
    pub candidates: Vec<String>,
    pub positive_votes_per_voter: u8,
    pub negative_votes_per_voter: u8,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CastVoteArgs {
    pub election: Pubkey,
    pub positive_choices: Vec<u8>,
    pub negative_choices: Vec<u8>,
}

/// The state-changing requests understood by the program.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Instruction {
    InitializeElection(InitializeElectionArgs),
    CastVote(CastVoteArgs),
    CloseElection { election: Pubkey },
}

/// An instruction together with the identity that signed it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Transaction {
    pub signer: Pubkey,
    pub instruction: Instruction,
}

impl Transaction {
    pub fn new(signer: Pubkey, instruction: Instruction) -> Transaction {
        Transaction {
            signer,
            instruction,
        }
    }
}

/// What an accepted transaction did.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Outcome {
    ElectionCreated(Pubkey),
    VoteCast { election: Pubkey, ballot: Pubkey },
    ElectionClosed(Pubkey),
}
