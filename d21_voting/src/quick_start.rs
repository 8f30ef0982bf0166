/*!

# Quick start

This example runs a small election end to end with the `d21` command. Identities can be
given as 64 hex characters or as plain labels such as `alice`; a label always maps to
the same key.

**Creating an election** Alice asks her team where to go for lunch. Everybody gets two
positive votes and one negative vote:

```bash
d21 create --signer alice --title "Team lunch" \
  --candidate Pizza --candidate Sushi --candidate Tacos \
  --positive 2 --negative 1
```

The command prints the address of the new election. It can also be computed ahead of
time from the authority and the index:

```bash
d21 address election --authority alice --index 1700000000
```

**Voting** Candidates are referred to by their position in the list, starting at 0:

```bash
d21 vote --signer bob   --election <address> --plus 0,1 --minus 2
d21 vote --signer carol --election <address> --plus 2
```

Voting a second time with the same identity is rejected:

```text
[2024-03-01T12:00:00Z WARN  d21_voting] Transaction from 5c1f... rejected: 5c1f... already voted in election 9a0e...
```

**Results** `list` shows every election, `show` a single one:

```bash
d21 show --election <address>
```

```text
Team lunch [active] 2 voters, budgets +2/-1
  address:   <address>
  authority: <alice's key>
   1. Pizza  +1 -0  score 1
   2. Sushi  +1 -0  score 1
   3. Tacos  +1 -1  score 0
```

Ties keep the order in which candidates were registered. Add `--json` for a
machine-readable summary, and `--reference expected.json` to compare the summary with a
file saved earlier.

**Closing** Only the authority can close an election. After that every vote is refused:

```bash
d21 close --signer alice --election <address>
```

**Checking the ledger** `d21 audit` recounts every election from its ballots and reports
any counter that does not match.

*/
