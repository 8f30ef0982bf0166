mod address;
pub mod builder;
mod config;
mod error;
pub mod ledger;
pub mod manual;
pub mod quick_start;
mod tally;

use log::{debug, info, warn};
use snafu::prelude::*;

use std::collections::HashSet;

pub use crate::address::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::ledger::{AccountStore, MemoryLedger, SharedLedger, Write};
pub use crate::tally::*;

// ********* Validation ***********

pub(crate) fn validate_title(title: &str) -> ProgramResult<()> {
    let len = title.chars().count();
    ensure!(len > 0, TitleEmptySnafu {});
    ensure!(
        len <= MAX_TITLE_LEN,
        TitleTooLongSnafu {
            len,
            max: MAX_TITLE_LEN
        }
    );
    Ok(())
}

pub(crate) fn validate_candidate_names(names: &[String]) -> ProgramResult<()> {
    let count = names.len();
    ensure!(
        count >= MIN_CANDIDATES,
        TooFewCandidatesSnafu {
            count,
            min: MIN_CANDIDATES
        }
    );
    ensure!(
        count <= MAX_CANDIDATES,
        TooManyCandidatesSnafu {
            count,
            max: MAX_CANDIDATES
        }
    );
    for (position, name) in names.iter().enumerate() {
        let len = name.chars().count();
        ensure!(len > 0, CandidateNameEmptySnafu { position });
        ensure!(
            len <= MAX_CANDIDATE_NAME_LEN,
            CandidateNameTooLongSnafu {
                position,
                len,
                max: MAX_CANDIDATE_NAME_LEN
            }
        );
    }
    Ok(())
}

/// Checks a ballot against the shape of an election.
///
/// The checks run in a fixed order over both halves of the ballot: index range,
/// duplicates, overlap between the halves, then budgets. The first failure is returned.
pub fn validate_choices(
    election: &Election,
    positive_choices: &[u8],
    negative_choices: &[u8],
) -> ProgramResult<()> {
    let sides = [
        (VoteSide::Positive, positive_choices),
        (VoteSide::Negative, negative_choices),
    ];
    let count = election.candidates.len();

    for (side, choices) in sides.iter() {
        for &index in choices.iter() {
            ensure!(
                (index as usize) < count,
                CandidateIndexOutOfRangeSnafu {
                    side: *side,
                    index,
                    count
                }
            );
        }
    }

    for (side, choices) in sides.iter() {
        let mut seen: HashSet<u8> = HashSet::new();
        for &index in choices.iter() {
            ensure!(seen.insert(index), DuplicateChoiceSnafu { side: *side, index });
        }
    }

    let positive: HashSet<u8> = positive_choices.iter().cloned().collect();
    if let Some(&index) = negative_choices.iter().find(|i| positive.contains(*i)) {
        return ConflictingChoiceSnafu { index }.fail();
    }

    let budgets = [
        election.positive_votes_per_voter,
        election.negative_votes_per_voter,
    ];
    for ((side, choices), budget) in sides.iter().zip(budgets) {
        ensure!(
            choices.len() <= budget as usize,
            BudgetExceededSnafu {
                side: *side,
                used: choices.len(),
                budget
            }
        );
    }
    Ok(())
}

fn load_election<S: AccountStore + ?Sized>(
    store: &S,
    address: &Pubkey,
) -> ProgramResult<(u64, Election)> {
    match store.get(address) {
        Some(Account {
            revision,
            data: AccountData::Election(election),
        }) => Ok((revision, election)),
        _ => ElectionNotFoundSnafu { address: *address }.fail(),
    }
}

fn bump(counter: &mut u64, election: &Pubkey) -> ProgramResult<()> {
    *counter = counter
        .checked_add(1)
        .context(CounterOverflowSnafu { address: *election })?;
    Ok(())
}

// ********* Instructions ***********

/// Creates a new election at the address derived from its authority and index.
///
/// Returns the address of the election. The same address is returned by
/// [`derive_election_address`], so clients do not need to remember it.
pub fn initialize_election<S: AccountStore + ?Sized>(
    store: &mut S,
    signer: &Pubkey,
    args: &InitializeElectionArgs,
) -> ProgramResult<Pubkey> {
    ensure!(
        args.authority == *signer,
        UnauthorizedSnafu {
            signer: *signer,
            expected: args.authority
        }
    );
    validate_title(&args.title)?;
    validate_candidate_names(&args.candidates)?;
    ensure!(
        args.positive_votes_per_voter > 0 || args.negative_votes_per_voter > 0,
        NoVoteBudgetSnafu {}
    );

    let address = derive_election_address(&args.authority, args.index);
    debug!(
        "initialize_election: authority {} index {} -> {}",
        args.authority, args.index, address
    );
    let election = Election {
        authority: args.authority,
        index: args.index,
        title: args.title.clone(),
        candidates: args.candidates.iter().map(|n| Candidate::new(n)).collect(),
        positive_votes_per_voter: args.positive_votes_per_voter,
        negative_votes_per_voter: args.negative_votes_per_voter,
        total_voters: 0,
        is_active: true,
    };

    store
        .commit(vec![Write::Create {
            address,
            data: AccountData::Election(election),
        }])
        .map_err(|e| match e {
            ProgramError::AccountInUse { .. } => ProgramError::ElectionAlreadyExists {
                address,
                index: args.index,
            },
            e => e,
        })?;

    info!(
        "Election {:?} created at {} with {} candidates",
        args.title,
        address,
        args.candidates.len()
    );
    Ok(address)
}

/// Records the ballot of `voter` and updates the tallies.
///
/// The ballot account is created in the same commit as the election update. If the
/// voter already has a ballot, that creation fails and nothing is written.
pub fn cast_vote<S: AccountStore + ?Sized>(
    store: &mut S,
    voter: &Pubkey,
    args: &CastVoteArgs,
) -> ProgramResult<Pubkey> {
    let (revision, mut election) = load_election(store, &args.election)?;
    ensure!(
        election.is_active,
        ElectionInactiveSnafu {
            address: args.election
        }
    );
    validate_choices(&election, &args.positive_choices, &args.negative_choices)?;

    for &index in args.positive_choices.iter() {
        bump(
            &mut election.candidates[index as usize].positive_votes,
            &args.election,
        )?;
    }
    for &index in args.negative_choices.iter() {
        bump(
            &mut election.candidates[index as usize].negative_votes,
            &args.election,
        )?;
    }
    bump(&mut election.total_voters, &args.election)?;

    let ballot_address = derive_ballot_address(&args.election, voter);
    let ballot = VoterBallot {
        election: args.election,
        voter: *voter,
        positive_choices: args.positive_choices.clone(),
        negative_choices: args.negative_choices.clone(),
    };
    debug!(
        "cast_vote: voter {} ballot {} revision {}",
        voter, ballot_address, revision
    );

    store
        .commit(vec![
            Write::Create {
                address: ballot_address,
                data: AccountData::VoterBallot(ballot),
            },
            Write::Update {
                address: args.election,
                expected_revision: revision,
                data: AccountData::Election(election),
            },
        ])
        .map_err(|e| match e {
            ProgramError::AccountInUse { address } if address == ballot_address => {
                ProgramError::AlreadyVoted {
                    election: args.election,
                    voter: *voter,
                }
            }
            e => e,
        })?;

    info!(
        "Vote from {} accepted in {}: +{:?} -{:?}",
        voter, args.election, args.positive_choices, args.negative_choices
    );
    Ok(ballot_address)
}

/// Stops an election from accepting ballots. Only its authority may do this.
pub fn close_election<S: AccountStore + ?Sized>(
    store: &mut S,
    signer: &Pubkey,
    address: &Pubkey,
) -> ProgramResult<()> {
    let (revision, mut election) = load_election(store, address)?;
    ensure!(
        election.authority == *signer,
        UnauthorizedSnafu {
            signer: *signer,
            expected: election.authority
        }
    );
    ensure!(
        election.is_active,
        ElectionInactiveSnafu { address: *address }
    );
    election.is_active = false;
    store.commit(vec![Write::Update {
        address: *address,
        expected_revision: revision,
        data: AccountData::Election(election),
    }])?;
    info!("Election {} closed", address);
    Ok(())
}

/// Runs one transaction against the store.
pub fn process<S: AccountStore + ?Sized>(store: &mut S, tx: &Transaction) -> ProgramResult<Outcome> {
    match &tx.instruction {
        Instruction::InitializeElection(args) => {
            initialize_election(store, &tx.signer, args).map(Outcome::ElectionCreated)
        }
        Instruction::CastVote(args) => {
            cast_vote(store, &tx.signer, args).map(|ballot| Outcome::VoteCast {
                election: args.election,
                ballot,
            })
        }
        Instruction::CloseElection { election } => {
            close_election(store, &tx.signer, election).map(|_| Outcome::ElectionClosed(*election))
        }
    }
}

/// Runs a transaction, replaying it when it lost a write race.
///
/// Up to `retry_limit` replays are attempted. Every other error is returned at once.
pub fn execute<S: AccountStore + ?Sized>(
    store: &mut S,
    tx: &Transaction,
    retry_limit: u32,
) -> ProgramResult<Outcome> {
    let mut attempt: u32 = 0;
    loop {
        match process(store, tx) {
            Err(e) if e.is_retryable() && attempt < retry_limit => {
                attempt += 1;
                warn!("execute: {} (replay {}/{})", e, attempt, retry_limit);
            }
            Err(e) => {
                warn!("Transaction from {} rejected: {}", tx.signer, e);
                return Err(e);
            }
            Ok(outcome) => return Ok(outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    fn create_args(authority: Pubkey, index: u64, cands: &[&str], pos: u8, neg: u8) -> InitializeElectionArgs {
        InitializeElectionArgs {
            authority,
            index,
            title: "Best fruit".to_string(),
            candidates: names(cands),
            positive_votes_per_voter: pos,
            negative_votes_per_voter: neg,
        }
    }

    fn setup(pos: u8, neg: u8) -> (MemoryLedger, Pubkey) {
        init_logs();
        let mut ledger = MemoryLedger::new();
        let authority = Pubkey::from_label("authority");
        let addr = initialize_election(
            &mut ledger,
            &authority,
            &create_args(authority, 1, &["A", "B", "C"], pos, neg),
        )
        .unwrap();
        (ledger, addr)
    }

    fn vote(election: Pubkey, pos: &[u8], neg: &[u8]) -> CastVoteArgs {
        CastVoteArgs {
            election,
            positive_choices: pos.to_vec(),
            negative_choices: neg.to_vec(),
        }
    }

    fn election_at(store: &dyn AccountStore, addr: &Pubkey) -> Election {
        find_election(store, addr).unwrap()
    }

    fn tallies(e: &Election) -> Vec<(u64, u64)> {
        e.candidates
            .iter()
            .map(|c| (c.positive_votes, c.negative_votes))
            .collect()
    }

    #[test]
    fn initialize_sets_fresh_state() {
        let (ledger, addr) = setup(2, 1);
        let authority = Pubkey::from_label("authority");
        assert_eq!(addr, derive_election_address(&authority, 1));
        let e = election_at(&ledger, &addr);
        assert_eq!(e.authority, authority);
        assert_eq!(e.total_voters, 0);
        assert!(e.is_active);
        assert_eq!(tallies(&e), vec![(0, 0); 3]);
    }

    #[test]
    fn initialize_twice_is_rejected() {
        let (mut ledger, addr) = setup(2, 1);
        let authority = Pubkey::from_label("authority");
        let before = election_at(&ledger, &addr);
        let mut args = create_args(authority, 1, &["X", "Y"], 1, 1);
        args.title = "Another".to_string();
        let res = initialize_election(&mut ledger, &authority, &args);
        assert_eq!(
            res,
            Err(ProgramError::ElectionAlreadyExists {
                address: addr,
                index: 1
            })
        );
        assert_eq!(res.unwrap_err().kind(), ErrorKind::DuplicateResource);
        assert_eq!(election_at(&ledger, &addr), before);

        // A different index is a different election.
        args.index = 2;
        assert!(initialize_election(&mut ledger, &authority, &args).is_ok());
        assert_eq!(list_elections(&ledger).len(), 2);
    }

    #[test]
    fn initialize_validation() {
        init_logs();
        let mut ledger = MemoryLedger::new();
        let a = Pubkey::from_label("authority");
        let check = |args: InitializeElectionArgs, ledger: &mut MemoryLedger| {
            initialize_election(ledger, &a, &args).unwrap_err()
        };

        let mut args = create_args(a, 1, &["A", "B"], 1, 0);
        args.title = "".to_string();
        assert_eq!(check(args, &mut ledger), ProgramError::TitleEmpty {});

        let mut args = create_args(a, 1, &["A", "B"], 1, 0);
        args.title = "é".repeat(201);
        assert_eq!(
            check(args, &mut ledger),
            ProgramError::TitleTooLong { len: 201, max: 200 }
        );

        let args = create_args(a, 1, &["A"], 1, 0);
        assert_eq!(check(args, &mut ledger).kind(), ErrorKind::Validation);

        let many: Vec<String> = (0..21).map(|i| format!("c{}", i)).collect();
        let mut args = create_args(a, 1, &[], 1, 0);
        args.candidates = many;
        assert_eq!(
            check(args, &mut ledger),
            ProgramError::TooManyCandidates { count: 21, max: 20 }
        );

        let args = create_args(a, 1, &["A", ""], 1, 0);
        assert_eq!(
            check(args, &mut ledger),
            ProgramError::CandidateNameEmpty { position: 1 }
        );

        let long = "n".repeat(51);
        let args = create_args(a, 1, &["A", long.as_str()], 1, 0);
        assert_eq!(
            check(args, &mut ledger),
            ProgramError::CandidateNameTooLong {
                position: 1,
                len: 51,
                max: 50
            }
        );

        let args = create_args(a, 1, &["A", "B"], 0, 0);
        assert_eq!(check(args, &mut ledger), ProgramError::NoVoteBudget {});

        let args = create_args(a, 1, &["A", "B"], 1, 0);
        let res = initialize_election(&mut ledger, &Pubkey::from_label("mallory"), &args);
        assert_eq!(res.unwrap_err().kind(), ErrorKind::Unauthorized);

        assert!(ledger.is_empty());
    }

    #[test]
    fn boundary_sizes_are_accepted() {
        init_logs();
        let mut ledger = MemoryLedger::new();
        let a = Pubkey::from_label("authority");
        let twenty: Vec<String> = (0..20).map(|_| "n".repeat(50)).collect();
        let args = InitializeElectionArgs {
            authority: a,
            index: 0,
            title: "t".repeat(200),
            candidates: twenty,
            positive_votes_per_voter: 0,
            negative_votes_per_voter: 3,
        };
        assert!(initialize_election(&mut ledger, &a, &args).is_ok());
    }

    #[test]
    fn scenario_abc() {
        let (mut ledger, addr) = setup(2, 1);
        let voter1 = Pubkey::from_label("voter1");
        let ballot = cast_vote(&mut ledger, &voter1, &vote(addr, &[0, 1], &[2])).unwrap();
        assert_eq!(ballot, derive_ballot_address(&addr, &voter1));

        let e = election_at(&ledger, &addr);
        assert_eq!(tallies(&e), vec![(1, 0), (1, 0), (0, 1)]);
        let scores: Vec<i128> = e.candidates.iter().map(|c| c.score()).collect();
        assert_eq!(scores, vec![1, 1, -1]);
        assert_eq!(e.total_voters, 1);

        let res = cast_vote(&mut ledger, &voter1, &vote(addr, &[2], &[]));
        assert_eq!(
            res,
            Err(ProgramError::AlreadyVoted {
                election: addr,
                voter: voter1
            })
        );
        assert_eq!(res.unwrap_err().kind(), ErrorKind::DuplicateResource);
        assert_eq!(election_at(&ledger, &addr), e);
    }

    #[test]
    fn budget_exceeded() {
        let (mut ledger, addr) = setup(1, 1);
        let before = ledger.clone();
        let res = cast_vote(
            &mut ledger,
            &Pubkey::from_label("v"),
            &vote(addr, &[0, 1], &[]),
        );
        assert_eq!(
            res,
            Err(ProgramError::BudgetExceeded {
                side: VoteSide::Positive,
                used: 2,
                budget: 1
            })
        );
        assert_eq!(res.unwrap_err().kind(), ErrorKind::BudgetExceeded);
        assert_eq!(ledger, before);
    }

    #[test]
    fn negative_budget_of_zero() {
        let (mut ledger, addr) = setup(2, 0);
        let res = cast_vote(&mut ledger, &Pubkey::from_label("v"), &vote(addr, &[], &[1]));
        assert_eq!(res.unwrap_err().kind(), ErrorKind::BudgetExceeded);
    }

    #[test]
    fn conflicting_choice() {
        let (mut ledger, addr) = setup(2, 1);
        let before = ledger.clone();
        let res = cast_vote(&mut ledger, &Pubkey::from_label("v"), &vote(addr, &[0], &[0]));
        assert_eq!(res, Err(ProgramError::ConflictingChoice { index: 0 }));
        assert_eq!(res.unwrap_err().kind(), ErrorKind::ConflictingChoice);
        assert_eq!(ledger, before);
    }

    #[test]
    fn choice_checks_run_in_order() {
        let (ledger, addr) = setup(1, 1);
        let e = election_at(&ledger, &addr);
        // Out of range wins over everything else.
        assert_eq!(
            validate_choices(&e, &[0, 0, 1], &[3]),
            Err(ProgramError::CandidateIndexOutOfRange {
                side: VoteSide::Negative,
                index: 3,
                count: 3
            })
        );
        // Duplicates come before budget and overlap.
        assert_eq!(
            validate_choices(&e, &[1, 1], &[1]),
            Err(ProgramError::DuplicateChoice {
                side: VoteSide::Positive,
                index: 1
            })
        );
        // Overlap comes before budget.
        assert_eq!(
            validate_choices(&e, &[0, 1], &[1]),
            Err(ProgramError::ConflictingChoice { index: 1 })
        );
        assert_eq!(validate_choices(&e, &[2], &[0]), Ok(()));
        assert_eq!(validate_choices(&e, &[], &[]), Ok(()));
    }

    #[test]
    fn vote_on_missing_election() {
        init_logs();
        let mut ledger = MemoryLedger::new();
        let addr = Pubkey::from_label("nowhere");
        let res = cast_vote(&mut ledger, &Pubkey::from_label("v"), &vote(addr, &[0], &[]));
        assert_eq!(res, Err(ProgramError::ElectionNotFound { address: addr }));
        assert_eq!(res.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn ballot_address_is_not_an_election() {
        let (mut ledger, addr) = setup(1, 1);
        let ballot = cast_vote(&mut ledger, &Pubkey::from_label("v"), &vote(addr, &[0], &[])).unwrap();
        let res = cast_vote(&mut ledger, &Pubkey::from_label("w"), &vote(ballot, &[0], &[]));
        assert_eq!(res.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn closed_election_rejects_votes() {
        let (mut ledger, addr) = setup(2, 1);
        let authority = Pubkey::from_label("authority");
        let stranger = Pubkey::from_label("stranger");

        let res = close_election(&mut ledger, &stranger, &addr);
        assert_eq!(res.unwrap_err().kind(), ErrorKind::Unauthorized);
        assert!(election_at(&ledger, &addr).is_active);

        close_election(&mut ledger, &authority, &addr).unwrap();
        assert!(!election_at(&ledger, &addr).is_active);

        let res = cast_vote(&mut ledger, &Pubkey::from_label("v"), &vote(addr, &[0], &[]));
        assert_eq!(res, Err(ProgramError::ElectionInactive { address: addr }));
        assert_eq!(res.unwrap_err().kind(), ErrorKind::InactiveElection);
        // Even an invalid ballot reports the closed election first.
        let res = cast_vote(&mut ledger, &Pubkey::from_label("v"), &vote(addr, &[9], &[9]));
        assert_eq!(res.unwrap_err().kind(), ErrorKind::InactiveElection);

        let res = close_election(&mut ledger, &authority, &addr);
        assert_eq!(res.unwrap_err().kind(), ErrorKind::InactiveElection);
    }

    #[test]
    fn empty_ballot_counts_as_a_voter() {
        let (mut ledger, addr) = setup(2, 1);
        cast_vote(&mut ledger, &Pubkey::from_label("v"), &vote(addr, &[], &[])).unwrap();
        let e = election_at(&ledger, &addr);
        assert_eq!(e.total_voters, 1);
        assert_eq!(tallies(&e), vec![(0, 0); 3]);
    }

    #[test]
    fn sums_match_accepted_choices() {
        let (mut ledger, addr) = setup(2, 1);
        let ballots: Vec<(Vec<u8>, Vec<u8>)> = vec![
            (vec![0, 1], vec![2]),
            (vec![2], vec![0]),
            (vec![0, 0], vec![]), // rejected
            (vec![1], vec![]),
            (vec![], vec![1]),
            (vec![0, 1, 2], vec![]), // rejected
        ];
        let mut accepted_pos = 0;
        let mut accepted_neg = 0;
        let mut accepted_voters = 0;
        for (i, (pos, neg)) in ballots.iter().enumerate() {
            let voter = Pubkey::from_label(&format!("voter{}", i));
            if cast_vote(&mut ledger, &voter, &vote(addr, pos, neg)).is_ok() {
                accepted_pos += pos.len() as u64;
                accepted_neg += neg.len() as u64;
                accepted_voters += 1;
            }
        }
        let e = election_at(&ledger, &addr);
        let pos_sum: u64 = e.candidates.iter().map(|c| c.positive_votes).sum();
        let neg_sum: u64 = e.candidates.iter().map(|c| c.negative_votes).sum();
        assert_eq!(pos_sum, accepted_pos);
        assert_eq!(neg_sum, accepted_neg);
        assert_eq!(e.total_voters, accepted_voters);
        assert_eq!(accepted_voters, 4);
        assert!(audit(&ledger).is_clean());
    }

    #[test]
    fn process_dispatches() {
        init_logs();
        let mut ledger = MemoryLedger::new();
        let a = Pubkey::from_label("authority");
        let v = Pubkey::from_label("v");
        let tx = Transaction::new(
            a,
            Instruction::InitializeElection(create_args(a, 5, &["A", "B"], 1, 1)),
        );
        let addr = match process(&mut ledger, &tx).unwrap() {
            Outcome::ElectionCreated(addr) => addr,
            o => panic!("unexpected outcome {:?}", o),
        };
        let tx = Transaction::new(v, Instruction::CastVote(vote(addr, &[1], &[0])));
        assert_eq!(
            execute(&mut ledger, &tx, 0),
            Ok(Outcome::VoteCast {
                election: addr,
                ballot: derive_ballot_address(&addr, &v)
            })
        );
        let tx = Transaction::new(a, Instruction::CloseElection { election: addr });
        assert_eq!(
            execute(&mut ledger, &tx, 0),
            Ok(Outcome::ElectionClosed(addr))
        );
    }

    /// A store where another writer touches the election right before each of
    /// the first `races` commits.
    struct RacingStore {
        inner: MemoryLedger,
        election: Pubkey,
        races: u32,
    }

    impl AccountStore for RacingStore {
        fn get(&self, address: &Pubkey) -> Option<Account> {
            self.inner.get(address)
        }

        fn scan(&self) -> Vec<(Pubkey, Account)> {
            self.inner.scan()
        }

        fn commit(&mut self, writes: Vec<Write>) -> ProgramResult<()> {
            if self.races > 0 {
                self.races -= 1;
                let acc = self.inner.get(&self.election).unwrap();
                self.inner
                    .commit(vec![Write::Update {
                        address: self.election,
                        expected_revision: acc.revision,
                        data: acc.data,
                    }])
                    .unwrap();
            }
            self.inner.commit(writes)
        }
    }

    #[test]
    fn lost_race_is_replayed() {
        let (ledger, addr) = setup(2, 1);
        let v = Pubkey::from_label("v");
        let tx = Transaction::new(v, Instruction::CastVote(vote(addr, &[0], &[])));

        let mut store = RacingStore {
            inner: ledger.clone(),
            election: addr,
            races: 2,
        };
        assert!(execute(&mut store, &tx, 3).is_ok());
        let e = election_at(&store, &addr);
        assert_eq!(e.total_voters, 1);
        assert_eq!(e.candidates[0].positive_votes, 1);

        let mut store = RacingStore {
            inner: ledger,
            election: addr,
            races: 2,
        };
        let res = execute(&mut store, &tx, 1);
        assert!(matches!(res, Err(ProgramError::StaleAccount { .. })));
        assert!(store.get(&derive_ballot_address(&addr, &v)).is_none());
        assert_eq!(election_at(&store, &addr).total_voters, 0);
    }

    #[test]
    fn concurrent_voters_lose_no_updates() {
        let (ledger, addr) = setup(2, 1);
        let shared = SharedLedger::new(ledger);
        let threads = 8;
        let per_thread = 25;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let mut store = shared.clone();
                thread::spawn(move || {
                    for i in 0..per_thread {
                        let voter = Pubkey::from_label(&format!("voter-{}-{}", t, i));
                        let pos = vec![(i % 3) as u8];
                        let neg = vec![((i + 1) % 3) as u8];
                        let tx = Transaction::new(
                            voter,
                            Instruction::CastVote(vote(addr, &pos, &neg)),
                        );
                        execute(&mut store, &tx, 10_000).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snapshot = shared.snapshot();
        let e = election_at(&snapshot, &addr);
        let total = (threads * per_thread) as u64;
        assert_eq!(e.total_voters, total);
        let pos_sum: u64 = e.candidates.iter().map(|c| c.positive_votes).sum();
        let neg_sum: u64 = e.candidates.iter().map(|c| c.negative_votes).sum();
        assert_eq!(pos_sum, total);
        assert_eq!(neg_sum, total);
        assert!(audit(&snapshot).is_clean());
    }

    #[test]
    fn concurrent_double_vote_has_one_winner() {
        let (ledger, addr) = setup(2, 1);
        let shared = SharedLedger::new(ledger);
        let voter = Pubkey::from_label("eager");

        let handles: Vec<_> = (0..6u8)
            .map(|t| {
                let mut store = shared.clone();
                thread::spawn(move || {
                    let tx = Transaction::new(
                        voter,
                        Instruction::CastVote(vote(addr, &[t % 3], &[])),
                    );
                    execute(&mut store, &tx, 10_000)
                })
            })
            .collect();
        let results: Vec<ProgramResult<Outcome>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for r in results.iter().filter(|r| r.is_err()) {
            assert_eq!(
                r.as_ref().unwrap_err().kind(),
                ErrorKind::DuplicateResource
            );
        }
        let e = election_at(&shared, &addr);
        assert_eq!(e.total_voters, 1);
    }
}
