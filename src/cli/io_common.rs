// Primitives shared by the commands: reading keys and printing results.

use std::fmt::Write as FmtWrite;

use d21_voting::{ElectionSummary, Pubkey, PUBKEY_BYTES};
use log::debug;
use snafu::prelude::*;

use crate::cli::{CliResult, EmptyIdentitySnafu, InvalidAddressSnafu};

/// Parses an account address, which must be given as 64 hex characters.
pub fn parse_address(text: &str) -> CliResult<Pubkey> {
    text.trim().parse::<Pubkey>().context(InvalidAddressSnafu {
        text: text.to_string(),
    })
}

/// Parses an identity.
///
/// 64 hex characters are read as a key. Anything else is treated as a label and
/// hashed into a key, so `alice` is always the same voter.
pub fn parse_identity(text: &str) -> CliResult<Pubkey> {
    let t = text.trim();
    ensure!(!t.is_empty(), EmptyIdentitySnafu {});
    if t.len() == PUBKEY_BYTES * 2 && t.chars().all(|c| c.is_ascii_hexdigit()) {
        parse_address(t)
    } else {
        debug!("parse_identity: using label {:?}", t);
        Ok(Pubkey::from_label(t))
    }
}

/// Trims the candidate names and drops the blank ones, as the web form does.
pub fn clean_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

pub fn format_summary(summary: &ElectionSummary) -> String {
    let mut out = String::new();
    let status = if summary.is_active { "active" } else { "closed" };
    let _ = writeln!(
        out,
        "{} [{}] {} voters, budgets +{}/-{}",
        summary.title,
        status,
        summary.total_voters,
        summary.positive_votes_per_voter,
        summary.negative_votes_per_voter
    );
    let _ = writeln!(out, "  address:   {}", summary.address);
    let _ = writeln!(out, "  authority: {}", summary.authority);
    let width = summary
        .standings
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);
    for s in summary.standings.iter() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<width$}  +{} -{}  score {}",
            s.rank,
            s.name,
            s.positive_votes,
            s.negative_votes,
            s.score,
            width = width
        );
    }
    out
}
