// ********* Account storage ***********

use log::debug;
use snafu::prelude::*;

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use crate::address::Pubkey;
use crate::config::{Account, AccountData};
use crate::error::*;

/// A single change requested by a transaction.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Write {
    /// Allocates a new account. Fails if anything already lives at the address.
    Create { address: Pubkey, data: AccountData },
    /// Replaces an account, provided nobody else updated it since it was read.
    Update {
        address: Pubkey,
        expected_revision: u64,
        data: AccountData,
    },
}

impl Write {
    pub fn address(&self) -> &Pubkey {
        match self {
            Write::Create { address, .. } => address,
            Write::Update { address, .. } => address,
        }
    }
}

/// The storage underneath the program: a map from derived addresses to records.
///
/// `commit` is the only mutation. It is all-or-nothing: either every write in
/// the batch is applied, or none is and the first failing condition is returned.
pub trait AccountStore {
    fn get(&self, address: &Pubkey) -> Option<Account>;

    /// All the accounts, in ascending address order.
    fn scan(&self) -> Vec<(Pubkey, Account)>;

    fn commit(&mut self, writes: Vec<Write>) -> ProgramResult<()>;
}

/// An in-memory account store.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MemoryLedger {
    accounts: BTreeMap<Pubkey, Account>,
}

impl MemoryLedger {
    pub fn new() -> MemoryLedger {
        MemoryLedger::default()
    }

    /// Rebuilds a ledger from previously stored accounts.
    /// Later entries replace earlier ones with the same address.
    pub fn from_accounts(accounts: Vec<(Pubkey, Account)>) -> MemoryLedger {
        MemoryLedger {
            accounts: accounts.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn check(&self, writes: &[Write]) -> ProgramResult<()> {
        let mut claimed: HashSet<Pubkey> = HashSet::new();
        for w in writes.iter() {
            match w {
                Write::Create { address, .. } => {
                    ensure!(
                        !self.accounts.contains_key(address) && claimed.insert(*address),
                        AccountInUseSnafu { address: *address }
                    );
                }
                Write::Update {
                    address,
                    expected_revision,
                    ..
                } => {
                    let current = self
                        .accounts
                        .get(address)
                        .context(AccountMissingSnafu { address: *address })?;
                    ensure!(
                        current.revision == *expected_revision,
                        StaleAccountSnafu {
                            address: *address,
                            expected: *expected_revision,
                            found: current.revision,
                        }
                    );
                }
            }
        }
        Ok(())
    }
}

impl AccountStore for MemoryLedger {
    fn get(&self, address: &Pubkey) -> Option<Account> {
        self.accounts.get(address).cloned()
    }

    fn scan(&self) -> Vec<(Pubkey, Account)> {
        self.accounts
            .iter()
            .map(|(addr, acc)| (*addr, acc.clone()))
            .collect()
    }

    fn commit(&mut self, writes: Vec<Write>) -> ProgramResult<()> {
        self.check(&writes)?;
        debug!(
            "commit: applying {} writes to {:?}",
            writes.len(),
            writes.iter().map(Write::address).collect::<Vec<_>>()
        );
        for w in writes {
            match w {
                Write::Create { address, data } => {
                    self.accounts.insert(address, Account { revision: 0, data });
                }
                Write::Update {
                    address,
                    expected_revision,
                    data,
                } => {
                    self.accounts.insert(
                        address,
                        Account {
                            revision: expected_revision + 1,
                            data,
                        },
                    );
                }
            }
        }
        Ok(())
    }
}

/// A ledger that can be handed to several threads.
///
/// Each call takes the lock once, so a transaction that reads and then commits can
/// interleave with others. The revision check in `commit` catches those races.
#[derive(Debug, Clone, Default)]
pub struct SharedLedger {
    inner: Arc<Mutex<MemoryLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: MemoryLedger) -> SharedLedger {
        SharedLedger {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> MemoryLedger {
        let ledger = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        MemoryLedger::clone(&ledger)
    }
}

impl AccountStore for SharedLedger {
    fn get(&self, address: &Pubkey) -> Option<Account> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
    }

    fn scan(&self) -> Vec<(Pubkey, Account)> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .scan()
    }

    fn commit(&mut self, writes: Vec<Write>) -> ProgramResult<()> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .commit(writes)
    }
}
