use clap::{Parser, Subcommand};

/// This is a client for D21 elections, kept in a local ledger file.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. See the manual for the available keys.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) The ledger file. Overrides the path given in the configuration.
    /// The file is created on the first write if it does not exist.
    #[clap(short, long, value_parser)]
    pub ledger: Option<String>,

    /// If passed as an argument, results are printed in JSON format.
    #[clap(long, takes_value = false, global = true)]
    pub json: bool,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Creates a new election. The signer becomes its authority.
    Create {
        /// (identity) 64 hex characters or a label.
        #[clap(long, value_parser)]
        signer: String,
        #[clap(long, value_parser)]
        title: String,
        /// A candidate name. Repeat the flag for every candidate, in ballot order.
        #[clap(long = "candidate", value_parser, required = true)]
        candidates: Vec<String>,
        /// The number of positive votes each voter may give.
        #[clap(long, value_parser, default_value_t = 1)]
        positive: u8,
        /// The number of negative votes each voter may give.
        #[clap(long, value_parser, default_value_t = 0)]
        negative: u8,
        /// (optional) The election index. Defaults to the current time in seconds.
        #[clap(long, value_parser)]
        index: Option<u64>,
    },
    /// Casts a ballot. Each identity can vote once per election.
    Vote {
        #[clap(long, value_parser)]
        signer: String,
        /// (address) The election, as 64 hex characters.
        #[clap(long, value_parser)]
        election: String,
        /// Candidate positions (starting at 0) receiving a positive vote, comma-separated.
        #[clap(long, value_parser, value_delimiter = ',')]
        plus: Vec<u8>,
        /// Candidate positions (starting at 0) receiving a negative vote, comma-separated.
        #[clap(long, value_parser, value_delimiter = ',')]
        minus: Vec<u8>,
    },
    /// Closes an election. Only its authority can do this.
    Close {
        #[clap(long, value_parser)]
        signer: String,
        #[clap(long, value_parser)]
        election: String,
    },
    /// Lists all the elections with their standings.
    List,
    /// Shows a single election.
    Show {
        #[clap(long, value_parser)]
        election: String,
        /// (file path, optional) A reference JSON summary. If provided, d21 checks that the
        /// summary of the election matches it.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Computes derived addresses without touching the ledger.
    #[clap(subcommand)]
    Address(AddressTarget),
    /// Recounts every election from its ballots.
    Audit,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddressTarget {
    /// The address of an election.
    Election {
        #[clap(long, value_parser)]
        authority: String,
        #[clap(long, value_parser)]
        index: u64,
    },
    /// The address of the ballot of a voter.
    Ballot {
        #[clap(long, value_parser)]
        election: String,
        #[clap(long, value_parser)]
        voter: String,
    },
}
