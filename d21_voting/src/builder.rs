pub use crate::config::*;

use std::time::{SystemTime, UNIX_EPOCH};

use crate::address::{derive_election_address, Pubkey};
use crate::error::*;
use crate::{validate_candidate_names, validate_title};

/// A builder for the instruction that creates an election.
///
/// It runs the same checks as the program, so most mistakes surface before anything
/// is submitted. The program still checks everything again.
///
/// ```
/// use d21_voting::builder::ElectionBuilder;
/// use d21_voting::{derive_election_address, process, MemoryLedger, Pubkey, Transaction};
/// # use d21_voting::ProgramError;
///
/// let authority = Pubkey::from_label("alice");
/// let builder = ElectionBuilder::new(authority, "Team lunch")
///     .candidate("Pizza")
///     .candidate("Sushi")
///     .candidate("Tacos")
///     .budgets(2, 1)
///     .index(42);
/// let instruction = builder.build()?;
/// assert_eq!(builder.address(), derive_election_address(&authority, 42));
///
/// let mut ledger = MemoryLedger::new();
/// process(&mut ledger, &Transaction::new(authority, instruction))?;
///
/// # Ok::<(), ProgramError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionBuilder {
    pub(crate) _authority: Pubkey,
    pub(crate) _index: u64,
    pub(crate) _title: String,
    pub(crate) _candidates: Vec<String>,
    pub(crate) _positive: u8,
    pub(crate) _negative: u8,
}

impl ElectionBuilder {
    /// Starts a new election with one positive vote per voter and no negative vote.
    ///
    /// The index defaults to the current UNIX time in seconds, like the web client.
    /// Two elections created by the same authority within one second collide: the
    /// second one is rejected as a duplicate. Use `index` to choose a value.
    pub fn new(authority: Pubkey, title: &str) -> ElectionBuilder {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        ElectionBuilder {
            _authority: authority,
            _index: now,
            _title: title.to_string(),
            _candidates: Vec::new(),
            _positive: 1,
            _negative: 0,
        }
    }

    pub fn index(self, index: u64) -> ElectionBuilder {
        ElectionBuilder {
            _index: index,
            ..self
        }
    }

    pub fn candidate(mut self, name: &str) -> ElectionBuilder {
        self._candidates.push(name.to_string());
        self
    }

    /// Replaces the candidate list.
    pub fn candidates(self, names: &[String]) -> ElectionBuilder {
        ElectionBuilder {
            _candidates: names.to_vec(),
            ..self
        }
    }

    pub fn budgets(self, positive: u8, negative: u8) -> ElectionBuilder {
        ElectionBuilder {
            _positive: positive,
            _negative: negative,
            ..self
        }
    }

    /// The address the election will have once created.
    pub fn address(&self) -> Pubkey {
        derive_election_address(&self._authority, self._index)
    }

    pub fn build(&self) -> ProgramResult<Instruction> {
        validate_title(&self._title)?;
        validate_candidate_names(&self._candidates)?;
        if self._positive == 0 && self._negative == 0 {
            return NoVoteBudgetSnafu {}.fail();
        }
        Ok(Instruction::InitializeElection(InitializeElectionArgs {
            authority: self._authority,
            index: self._index,
            title: self._title.clone(),
            candidates: self._candidates.clone(),
            positive_votes_per_voter: self._positive,
            negative_votes_per_voter: self._negative,
        }))
    }
}
