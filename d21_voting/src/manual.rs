/*!

This is the long-form manual for `d21_voting` and the `d21` command.

## The voting method

D21 (also called Janeček's method) lets every voter give several positive votes and,
optionally, a few negative ones. Each candidate is ranked by its score:

```text
score = positive votes - negative votes
```

The organiser of an election chooses two budgets when creating it:
* `positiveVotesPerVoter`: the most positive votes a voter may hand out
* `negativeVotesPerVoter`: the most negative votes a voter may hand out

At least one of them must be non-zero. A voter does not have to use the whole budget.
A voter may not give two votes of the same kind to one candidate, and may not vote both
for and against the same candidate.

## Accounts

The program stores two kinds of records:

| record        | address                                 | written by                 |
|---------------|-----------------------------------------|----------------------------|
| `Election`    | `derive_election_address(authority, i)` | its authority, every voter |
| `VoterBallot` | `derive_ballot_address(election, voter)`| nobody after creation      |

Addresses are SHA-256 hashes of fixed seeds (`election`, `voter_ballot`), the keys
involved, and the program id. Anybody can compute them offline.

Both kinds of records are created with an exclusive insert. This is what prevents an
election from being created twice and a voter from voting twice. No separate "has voted"
flag exists.

## Limits

* titles: 1 to 200 characters
* candidates: 2 to 20, each name 1 to 50 characters
* budgets: 0 to 255 each, not both zero

Lengths are counted in Unicode characters, not bytes.

## Errors

All errors leave the ledger exactly as it was. They fall into these groups
(see [`crate::ErrorKind`]):

* `Validation`: the election description is malformed
* `DuplicateResource`: the election index is already taken, or the voter already voted.
   This is final and must not be retried.
* `NotFound`: no election at the given address
* `InactiveElection`: the election was closed by its authority
* `ConflictingChoice`: an index is out of range, repeated, or used on both sides
* `BudgetExceeded`: too many positive or negative choices
* `Unauthorized`: the signer is not the authority of the election
* `Storage`: a concurrent writer got there first (retried automatically by
  [`crate::execute`]), or a counter would overflow

## Ledger file

The `d21` command keeps the ledger in a JSON file (`d21-ledger.json` by default):

```text
{
  "version": 1,
  "accounts": [
    { "address": "<64 hex>", "revision": 3, "data": { "kind": "Election", ... } },
    { "address": "<64 hex>", "revision": 0, "data": { "kind": "VoterBallot", ... } }
  ]
}
```

Files with another version number, or listing an address twice, are refused. Commands
that change the ledger hold a lock on `<ledger>.lock` while they run, so several `d21`
processes can share one file without losing votes.

## Configuration

The `--config` flag points to an optional JSON file:

```text
{
  "ledgerPath": "elections/ledger.json",
  "retryLimit": 5,
  "outputFormat": "json"
}
```

Any flag given on the command line wins over the file.

*/
