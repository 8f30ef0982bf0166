use log::{debug, info, warn};

use d21_voting::builder::ElectionBuilder;
use d21_voting::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{AddressTarget, Args, Command};

pub mod config_reader;
pub mod io_common;
pub mod ledger_file;

use crate::cli::config_reader::*;
use crate::cli::io_common::*;
use crate::cli::ledger_file::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON in {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error producing JSON"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Ledger file {path} has version {found}, only version {supported} is supported"))]
    UnsupportedLedgerVersion {
        path: String,
        found: String,
        supported: u32,
    },
    #[snafu(display("Ledger file {path} lists account {address} more than once"))]
    DuplicateAccount { path: String, address: Pubkey },
    #[snafu(display("Error locking ledger file {path}"))]
    LockingLedger {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Invalid address {text:?}"))]
    InvalidAddress {
        source: ParsePubkeyError,
        text: String,
    },
    #[snafu(display("An identity cannot be empty"))]
    EmptyIdentity {},
    #[snafu(display("Unknown output format {format:?}, expected text or json"))]
    UnknownOutputFormat { format: String },
    #[snafu(display("{source}"))]
    Rejected { source: ProgramError },
    #[snafu(display("No election at {address}"))]
    NoSuchElection { address: Pubkey },
    #[snafu(display("The summary differs from the reference in {path}"))]
    ReferenceMismatch { path: String },
    #[snafu(display("The audit found {count} discrepancies"))]
    AuditFailed { count: usize },
}

pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// The failure class of a rejected transaction, if the program refused it.
    pub fn program_error_kind(&self) -> Option<ErrorKind> {
        match self {
            CliError::Rejected { source } => Some(source.kind()),
            _ => None,
        }
    }
}

/// Runs the command from the command line and returns what should be printed.
pub fn run(args: &Args) -> CliResult<String> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => CliConfig::default(),
    };
    let settings = resolve_settings(&config, args.ledger.as_deref(), args.json)?;
    debug!("run: settings {:?}", settings);
    run_command(&settings, &args.command)
}

pub fn run_command(settings: &Settings, command: &Command) -> CliResult<String> {
    match command {
        Command::Create {
            signer,
            title,
            candidates,
            positive,
            negative,
            index,
        } => {
            let authority = parse_identity(signer)?;
            let mut builder = ElectionBuilder::new(authority, title.trim())
                .candidates(&clean_names(candidates))
                .budgets(*positive, *negative);
            if let Some(i) = index {
                builder = builder.index(*i);
            }
            let instruction = builder.build().context(RejectedSnafu {})?;
            let outcome = submit(settings, Transaction::new(authority, instruction))?;
            render_outcome(settings, &outcome)
        }
        Command::Vote {
            signer,
            election,
            plus,
            minus,
        } => {
            let voter = parse_identity(signer)?;
            let instruction = Instruction::CastVote(CastVoteArgs {
                election: parse_address(election)?,
                positive_choices: plus.clone(),
                negative_choices: minus.clone(),
            });
            let outcome = submit(settings, Transaction::new(voter, instruction))?;
            render_outcome(settings, &outcome)
        }
        Command::Close { signer, election } => {
            let authority = parse_identity(signer)?;
            let instruction = Instruction::CloseElection {
                election: parse_address(election)?,
            };
            let outcome = submit(settings, Transaction::new(authority, instruction))?;
            render_outcome(settings, &outcome)
        }
        Command::List => {
            let ledger = load_ledger(&settings.ledger_path)?;
            let summaries: Vec<ElectionSummary> = list_elections(&ledger)
                .iter()
                .map(|(address, election)| summarize(address, election))
                .collect();
            info!("list: {} elections", summaries.len());
            match settings.output_format {
                OutputFormat::Json => to_pretty(&json!(summaries)),
                OutputFormat::Text => {
                    if summaries.is_empty() {
                        Ok("No elections".to_string())
                    } else {
                        let texts: Vec<String> = summaries.iter().map(format_summary).collect();
                        Ok(texts.join("\n").trim_end().to_string())
                    }
                }
            }
        }
        Command::Show {
            election,
            reference,
        } => {
            let address = parse_address(election)?;
            let ledger = load_ledger(&settings.ledger_path)?;
            let e = match find_election(&ledger, &address) {
                Some(e) => e,
                None => return NoSuchElectionSnafu { address }.fail(),
            };
            let summary = summarize(&address, &e);
            if let Some(ref_path) = reference {
                check_reference(&summary, ref_path)?;
            }
            match settings.output_format {
                OutputFormat::Json => to_pretty(&json!(summary)),
                OutputFormat::Text => Ok(format_summary(&summary).trim_end().to_string()),
            }
        }
        Command::Address(target) => {
            let address = match target {
                AddressTarget::Election { authority, index } => {
                    derive_election_address(&parse_identity(authority)?, *index)
                }
                AddressTarget::Ballot { election, voter } => {
                    derive_ballot_address(&parse_address(election)?, &parse_identity(voter)?)
                }
            };
            match settings.output_format {
                OutputFormat::Json => to_pretty(&json!({ "address": address })),
                OutputFormat::Text => Ok(address.to_string()),
            }
        }
        Command::Audit => {
            let ledger = load_ledger(&settings.ledger_path)?;
            let report = audit(&ledger);
            info!(
                "audit: checked {} elections and {} ballots",
                report.elections_checked, report.ballots_checked
            );
            if !report.is_clean() {
                for d in report.discrepancies.iter() {
                    warn!("audit: {}", d);
                }
                return AuditFailedSnafu {
                    count: report.discrepancies.len(),
                }
                .fail();
            }
            match settings.output_format {
                OutputFormat::Json => to_pretty(&json!({
                    "electionsChecked": report.elections_checked,
                    "ballotsChecked": report.ballots_checked,
                    "discrepancies": 0,
                })),
                OutputFormat::Text => Ok(format!(
                    "Ledger is consistent: {} elections, {} ballots",
                    report.elections_checked, report.ballots_checked
                )),
            }
        }
    }
}

// Loads the ledger, applies one transaction and writes the ledger back, all under the
// ledger lock. Nothing is written when the transaction is rejected.
fn submit(settings: &Settings, tx: Transaction) -> CliResult<Outcome> {
    let _lock = lock_ledger(&settings.ledger_path)?;
    let mut ledger = load_ledger(&settings.ledger_path)?;
    let outcome = execute(&mut ledger, &tx, settings.retry_limit).context(RejectedSnafu {})?;
    save_ledger(&settings.ledger_path, &ledger)?;
    info!("submit: {:?}", outcome);
    Ok(outcome)
}

fn render_outcome(settings: &Settings, outcome: &Outcome) -> CliResult<String> {
    match settings.output_format {
        OutputFormat::Json => {
            let js = match outcome {
                Outcome::ElectionCreated(e) => json!({ "election": e }),
                Outcome::VoteCast { election, ballot } => {
                    json!({ "election": election, "ballot": ballot })
                }
                Outcome::ElectionClosed(e) => json!({ "election": e, "isActive": false }),
            };
            to_pretty(&js)
        }
        OutputFormat::Text => Ok(match outcome {
            Outcome::ElectionCreated(e) => format!("Election created at {}", e),
            Outcome::VoteCast { ballot, .. } => format!("Ballot recorded at {}", ballot),
            Outcome::ElectionClosed(e) => format!("Election {} closed", e),
        }),
    }
}

fn to_pretty(js: &JSValue) -> CliResult<String> {
    serde_json::to_string_pretty(js).context(WritingJsonSnafu {})
}

fn check_reference(summary: &ElectionSummary, path: &str) -> CliResult<()> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let reference: JSValue =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    let expected = to_pretty(&reference)?;
    let actual = to_pretty(&json!(summary))?;
    if expected != actual {
        warn!("Found differences with the reference summary in {}", path);
        print_diff(expected.as_str(), actual.as_str(), "\n");
        return ReferenceMismatchSnafu { path }.fail();
    }
    debug!("check_reference: summary matches {}", path);
    Ok(())
}
