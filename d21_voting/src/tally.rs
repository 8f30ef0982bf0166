// ********* Read path: listings, standings and audits ***********

use log::{debug, info};
use serde::Serialize;

use std::collections::BTreeMap;

use crate::address::{derive_ballot_address, derive_election_address, Pubkey};
use crate::config::*;
use crate::ledger::AccountStore;

/// The place of one candidate in the ranking of an election.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct Standing {
    /// 1-based rank after sorting. Tied candidates get consecutive ranks.
    pub rank: usize,
    /// The index of the candidate in the election, as used by ballots.
    pub position: usize,
    pub name: String,
    #[serde(rename = "positiveVotes")]
    pub positive_votes: u64,
    #[serde(rename = "negativeVotes")]
    pub negative_votes: u64,
    pub score: i128,
}

/// Ranks the candidates by score, highest first.
///
/// The sort is stable: candidates with the same score keep the order in which they
/// were registered.
pub fn standings(election: &Election) -> Vec<Standing> {
    let mut ranked: Vec<(usize, &Candidate)> = election.candidates.iter().enumerate().collect();
    ranked.sort_by(|(_, c1), (_, c2)| c2.score().cmp(&c1.score()));
    ranked
        .into_iter()
        .enumerate()
        .map(|(idx, (position, c))| Standing {
            rank: idx + 1,
            position,
            name: c.name.clone(),
            positive_votes: c.positive_votes,
            negative_votes: c.negative_votes,
            score: c.score(),
        })
        .collect()
}

/// Everything a listing needs to show about one election.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct ElectionSummary {
    pub address: Pubkey,
    pub title: String,
    pub authority: Pubkey,
    #[serde(rename = "positiveVotesPerVoter")]
    pub positive_votes_per_voter: u8,
    #[serde(rename = "negativeVotesPerVoter")]
    pub negative_votes_per_voter: u8,
    #[serde(rename = "totalVoters")]
    pub total_voters: u64,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub standings: Vec<Standing>,
}

pub fn summarize(address: &Pubkey, election: &Election) -> ElectionSummary {
    ElectionSummary {
        address: *address,
        title: election.title.clone(),
        authority: election.authority,
        positive_votes_per_voter: election.positive_votes_per_voter,
        negative_votes_per_voter: election.negative_votes_per_voter,
        total_voters: election.total_voters,
        is_active: election.is_active,
        standings: standings(election),
    }
}

/// All the elections in the store, by ascending address.
pub fn list_elections<S: AccountStore + ?Sized>(store: &S) -> Vec<(Pubkey, Election)> {
    store
        .scan()
        .into_iter()
        .filter_map(|(addr, acc)| match acc.data {
            AccountData::Election(e) => Some((addr, e)),
            AccountData::VoterBallot(_) => None,
        })
        .collect()
}

pub fn find_election<S: AccountStore + ?Sized>(store: &S, address: &Pubkey) -> Option<Election> {
    match store.get(address)?.data {
        AccountData::Election(e) => Some(e),
        AccountData::VoterBallot(_) => None,
    }
}

/// The ballots recorded for one election, by ascending ballot address.
pub fn list_ballots<S: AccountStore + ?Sized>(
    store: &S,
    election: &Pubkey,
) -> Vec<(Pubkey, VoterBallot)> {
    store
        .scan()
        .into_iter()
        .filter_map(|(addr, acc)| match acc.data {
            AccountData::VoterBallot(b) if b.election == *election => Some((addr, b)),
            _ => None,
        })
        .collect()
}

// ********* Audit ***********

/// An inconsistency between the stored counters and the stored ballots.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Discrepancy {
    /// An election is not stored at the address derived from its authority and index.
    MisplacedElection { address: Pubkey, expected: Pubkey },
    /// A ballot is not stored at the address derived from its election and voter.
    MisplacedBallot { address: Pubkey, expected: Pubkey },
    /// A ballot refers to an election that does not exist.
    OrphanBallot { address: Pubkey, election: Pubkey },
    /// A ballot refers to a candidate the election does not have.
    BallotOutOfRange { address: Pubkey, index: u8 },
    CounterMismatch {
        election: Pubkey,
        position: usize,
        side: VoteSide,
        recorded: u64,
        recomputed: u64,
    },
    VoterCountMismatch {
        election: Pubkey,
        recorded: u64,
        recomputed: u64,
    },
}

impl std::fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Discrepancy::MisplacedElection { address, expected } => {
                write!(f, "election at {} belongs at {}", address, expected)
            }
            Discrepancy::MisplacedBallot { address, expected } => {
                write!(f, "ballot at {} belongs at {}", address, expected)
            }
            Discrepancy::OrphanBallot { address, election } => {
                write!(f, "ballot {} refers to missing election {}", address, election)
            }
            Discrepancy::BallotOutOfRange { address, index } => {
                write!(f, "ballot {} chooses unknown candidate {}", address, index)
            }
            Discrepancy::CounterMismatch {
                election,
                position,
                side,
                recorded,
                recomputed,
            } => write!(
                f,
                "election {} candidate {}: {} votes recorded {} but ballots give {}",
                election, position, side, recorded, recomputed
            ),
            Discrepancy::VoterCountMismatch {
                election,
                recorded,
                recomputed,
            } => write!(
                f,
                "election {}: {} voters recorded but {} ballots found",
                election, recorded, recomputed
            ),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AuditReport {
    pub elections_checked: usize,
    pub ballots_checked: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }
}

// Counters rebuilt from the ballots of one election.
struct Recount {
    positive: Vec<u64>,
    negative: Vec<u64>,
    voters: u64,
}

/// Rebuilds every tally from the stored ballots and compares it to the stored counters.
///
/// This is read-only. It reports all the problems it finds instead of stopping at the
/// first one.
pub fn audit<S: AccountStore + ?Sized>(store: &S) -> AuditReport {
    let mut report = AuditReport::default();
    let mut elections: BTreeMap<Pubkey, Election> = BTreeMap::new();
    let mut ballots: Vec<(Pubkey, VoterBallot)> = Vec::new();
    for (addr, acc) in store.scan() {
        match acc.data {
            AccountData::Election(e) => {
                elections.insert(addr, e);
            }
            AccountData::VoterBallot(b) => ballots.push((addr, b)),
        }
    }
    report.elections_checked = elections.len();
    report.ballots_checked = ballots.len();

    let mut recounts: BTreeMap<Pubkey, Recount> = elections
        .iter()
        .map(|(addr, e)| {
            (
                *addr,
                Recount {
                    positive: vec![0; e.candidates.len()],
                    negative: vec![0; e.candidates.len()],
                    voters: 0,
                },
            )
        })
        .collect();

    for (addr, e) in elections.iter() {
        let expected = derive_election_address(&e.authority, e.index);
        if expected != *addr {
            report.discrepancies.push(Discrepancy::MisplacedElection {
                address: *addr,
                expected,
            });
        }
    }

    for (addr, b) in ballots.iter() {
        let expected = derive_ballot_address(&b.election, &b.voter);
        if expected != *addr {
            report.discrepancies.push(Discrepancy::MisplacedBallot {
                address: *addr,
                expected,
            });
        }
        let recount = match recounts.get_mut(&b.election) {
            Some(r) => r,
            None => {
                report.discrepancies.push(Discrepancy::OrphanBallot {
                    address: *addr,
                    election: b.election,
                });
                continue;
            }
        };
        recount.voters += 1;
        for (choices, counters) in [
            (&b.positive_choices, &mut recount.positive),
            (&b.negative_choices, &mut recount.negative),
        ] {
            for &index in choices.iter() {
                match counters.get_mut(index as usize) {
                    Some(c) => *c += 1,
                    None => report.discrepancies.push(Discrepancy::BallotOutOfRange {
                        address: *addr,
                        index,
                    }),
                }
            }
        }
    }

    for (addr, e) in elections.iter() {
        let recount = match recounts.get(addr) {
            Some(r) => r,
            None => continue,
        };
        debug!(
            "audit: election {} recounted {} ballots",
            addr, recount.voters
        );
        if recount.voters != e.total_voters {
            report.discrepancies.push(Discrepancy::VoterCountMismatch {
                election: *addr,
                recorded: e.total_voters,
                recomputed: recount.voters,
            });
        }
        for (position, c) in e.candidates.iter().enumerate() {
            let sides = [
                (VoteSide::Positive, c.positive_votes, recount.positive[position]),
                (VoteSide::Negative, c.negative_votes, recount.negative[position]),
            ];
            for (side, recorded, recomputed) in sides {
                if recorded != recomputed {
                    report.discrepancies.push(Discrepancy::CounterMismatch {
                        election: *addr,
                        position,
                        side,
                        recorded,
                        recomputed,
                    });
                }
            }
        }
    }

    info!(
        "Audit: {} elections, {} ballots, {} discrepancies",
        report.elections_checked,
        report.ballots_checked,
        report.discrepancies.len()
    );
    report
}
