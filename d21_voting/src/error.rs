use snafu::prelude::*;

use crate::address::Pubkey;
use crate::config::VoteSide;

/// The broad categories of rejection.
///
/// Callers should branch on these rather than on individual variants.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ErrorKind {
    Validation,
    DuplicateResource,
    NotFound,
    InactiveElection,
    ConflictingChoice,
    BudgetExceeded,
    Unauthorized,
    Storage,
}

/// Errors that reject a transaction. No state is changed when one is returned.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProgramError {
    #[snafu(display("the election title is empty"))]
    TitleEmpty {},

    #[snafu(display("the election title has {len} characters, at most {max} are allowed"))]
    TitleTooLong { len: usize, max: usize },

    #[snafu(display("{count} candidates given, at least {min} are needed"))]
    TooFewCandidates { count: usize, min: usize },

    #[snafu(display("{count} candidates given, at most {max} are allowed"))]
    TooManyCandidates { count: usize, max: usize },

    #[snafu(display("candidate #{position} has an empty name"))]
    CandidateNameEmpty { position: usize },

    #[snafu(display("candidate #{position} has {len} characters, at most {max} are allowed"))]
    CandidateNameTooLong {
        position: usize,
        len: usize,
        max: usize,
    },

    #[snafu(display("both vote budgets are zero"))]
    NoVoteBudget {},

    #[snafu(display("an election already exists at {address} (index {index})"))]
    ElectionAlreadyExists { address: Pubkey, index: u64 },

    #[snafu(display("{voter} already voted in election {election}"))]
    AlreadyVoted { election: Pubkey, voter: Pubkey },

    #[snafu(display("no election at {address}"))]
    ElectionNotFound { address: Pubkey },

    #[snafu(display("election {address} is closed"))]
    ElectionInactive { address: Pubkey },

    #[snafu(display("{side} choice {index} is out of range, the election has {count} candidates"))]
    CandidateIndexOutOfRange {
        side: VoteSide,
        index: u8,
        count: usize,
    },

    #[snafu(display("candidate {index} appears twice in the {side} choices"))]
    DuplicateChoice { side: VoteSide, index: u8 },

    #[snafu(display("candidate {index} is in both the positive and the negative choices"))]
    ConflictingChoice { index: u8 },

    #[snafu(display("{used} {side} votes given, the budget is {budget}"))]
    BudgetExceeded {
        side: VoteSide,
        used: usize,
        budget: u8,
    },

    #[snafu(display("{signer} may not act for {expected}"))]
    Unauthorized { signer: Pubkey, expected: Pubkey },

    #[snafu(display("account {address} changed since it was read (revision {expected} -> {found})"))]
    StaleAccount {
        address: Pubkey,
        expected: u64,
        found: u64,
    },

    #[snafu(display("account {address} is already in use"))]
    AccountInUse { address: Pubkey },

    #[snafu(display("account {address} does not exist"))]
    AccountMissing { address: Pubkey },

    #[snafu(display("a vote counter of election {address} would overflow"))]
    CounterOverflow { address: Pubkey },
}

impl ProgramError {
    pub fn kind(&self) -> ErrorKind {
        use ProgramError::*;
        match self {
            TitleEmpty {}
            | TitleTooLong { .. }
            | TooFewCandidates { .. }
            | TooManyCandidates { .. }
            | CandidateNameEmpty { .. }
            | CandidateNameTooLong { .. }
            | NoVoteBudget {} => ErrorKind::Validation,
            ElectionAlreadyExists { .. } | AlreadyVoted { .. } => ErrorKind::DuplicateResource,
            ElectionNotFound { .. } => ErrorKind::NotFound,
            ElectionInactive { .. } => ErrorKind::InactiveElection,
            CandidateIndexOutOfRange { .. } | DuplicateChoice { .. } | ConflictingChoice { .. } => {
                ErrorKind::ConflictingChoice
            }
            BudgetExceeded { .. } => ErrorKind::BudgetExceeded,
            Unauthorized { .. } => ErrorKind::Unauthorized,
            StaleAccount { .. }
            | AccountInUse { .. }
            | AccountMissing { .. }
            | CounterOverflow { .. } => ErrorKind::Storage,
        }
    }

    /// Only a lost write race is worth replaying. Everything else is a permanent
    /// answer; in particular a duplicate must never be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProgramError::StaleAccount { .. })
    }
}

pub type ProgramResult<T> = Result<T, ProgramError>;
