// Persistence of the ledger as a single JSON document.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::Path;

use d21_voting::{Account, AccountData, AccountStore, MemoryLedger, Pubkey};
use fs2::FileExt;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use tempfile::NamedTempFile;

use crate::cli::{
    CliResult, DuplicateAccountSnafu, LockingLedgerSnafu, OpeningFileSnafu, ParsingJsonSnafu,
    UnsupportedLedgerVersionSnafu, WritingFileSnafu, WritingJsonSnafu,
};

pub const LEDGER_VERSION: u32 = 1;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct StoredAccount {
    address: Pubkey,
    revision: u64,
    data: AccountData,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    accounts: Vec<StoredAccount>,
}

/// An exclusive advisory lock on a ledger, held until dropped.
///
/// The lock lives on a `.lock` file next to the ledger, since the ledger itself is
/// replaced on every save.
#[derive(Debug)]
pub struct LedgerLock {
    file: File,
    path: String,
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!("LedgerLock: could not release {}: {}", self.path, e);
        }
    }
}

/// Blocks until no other process or thread holds the lock of the ledger at `path`.
pub fn lock_ledger(path: &str) -> CliResult<LedgerLock> {
    let lock_path = format!("{}.lock", path);
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(&lock_path)
        .context(LockingLedgerSnafu {
            path: lock_path.clone(),
        })?;
    FileExt::lock_exclusive(&file).context(LockingLedgerSnafu {
        path: lock_path.clone(),
    })?;
    debug!("lock_ledger: holding {}", lock_path);
    Ok(LedgerLock {
        file,
        path: lock_path,
    })
}

/// Reads the ledger at `path`. A missing file is an empty ledger.
pub fn load_ledger(path: &str) -> CliResult<MemoryLedger> {
    if !Path::new(path).exists() {
        info!("load_ledger: {} does not exist, starting from an empty ledger", path);
        return Ok(MemoryLedger::new());
    }
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    let version = js.get("version");
    if version.and_then(|v| v.as_u64()) != Some(LEDGER_VERSION as u64) {
        let found = match version {
            Some(v) => v.to_string(),
            None => "(missing)".to_string(),
        };
        return UnsupportedLedgerVersionSnafu {
            path,
            found,
            supported: LEDGER_VERSION,
        }
        .fail();
    }
    let file: LedgerFile = serde_json::from_value(js).context(ParsingJsonSnafu { path })?;
    debug!("load_ledger: {} accounts in {}", file.accounts.len(), path);
    let mut seen: HashSet<Pubkey> = HashSet::new();
    let mut accounts: Vec<(Pubkey, Account)> = Vec::with_capacity(file.accounts.len());
    for a in file.accounts {
        ensure!(
            seen.insert(a.address),
            DuplicateAccountSnafu {
                path,
                address: a.address
            }
        );
        accounts.push((
            a.address,
            Account {
                revision: a.revision,
                data: a.data,
            },
        ));
    }
    Ok(MemoryLedger::from_accounts(accounts))
}

/// Writes the ledger to a fresh temporary file in the same directory, then moves it in
/// place, so a crash never leaves a half-written file behind.
pub fn save_ledger(path: &str, ledger: &MemoryLedger) -> CliResult<()> {
    let file = LedgerFile {
        version: LEDGER_VERSION,
        accounts: ledger
            .scan()
            .into_iter()
            .map(|(address, account)| StoredAccount {
                address,
                revision: account.revision,
                data: account.data,
            })
            .collect(),
    };
    let contents = serde_json::to_string_pretty(&file).context(WritingJsonSnafu {})?;
    let dir = match Path::new(path).parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).context(WritingFileSnafu { path })?;
    tmp.write_all(contents.as_bytes())
        .context(WritingFileSnafu { path })?;
    tmp.as_file().sync_all().context(WritingFileSnafu { path })?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .context(WritingFileSnafu { path })?;
    debug!("save_ledger: {} accounts written to {}", file.accounts.len(), path);
    Ok(())
}
