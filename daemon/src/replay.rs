//! Replay of a recorded call stream against a genesis engine.
//!
//! Input is one JSON object per line: `caller`, an optional `at` (Unix
//! seconds) and the operation fields, e.g.
//! `{"caller":"ccd_alice","at":1000,"op":"vote","proposal":0,"support":true}`.
//! JSON amounts must fit in 64 bits.

use crate::config::GenesisConfig;
use anyhow::Context;
use concord_governance::{GovernanceEngine, Operation, OperationResult};
use concord_types::{AccountId, Clock, SingleAuthority, Timestamp};
use concord_utils::format_duration;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// One recorded call.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Call {
    pub caller: AccountId,
    /// Time the call is applied at; the replay clock when absent.
    #[serde(default)]
    pub at: Option<Timestamp>,
    #[serde(flatten)]
    pub op: Operation,
}

/// A call together with the input line it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberedCall {
    pub line: usize,
    pub call: Call,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Status {
    Ok { result: OperationResult },
    Rejected { error: String },
}

#[derive(Serialize)]
struct CallReport<'a> {
    line: usize,
    caller: &'a AccountId,
    op: &'static str,
    at: Timestamp,
    #[serde(flatten)]
    status: Status,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub rejected: usize,
}

/// Engine seeded from `config`: parameters, authority and minted allocations.
pub fn genesis_engine(config: &GenesisConfig) -> anyhow::Result<GovernanceEngine<SingleAuthority>> {
    let authority = config.authority.clone();
    let mut engine =
        GovernanceEngine::new(config.params.clone(), SingleAuthority::new(authority.clone()))?;
    for allocation in &config.allocations {
        engine
            .mint(&authority, &allocation.account, u128::from(allocation.amount))
            .with_context(|| format!("genesis allocation to {}", allocation.account))?;
    }
    tracing::info!(
        %authority,
        accounts = config.allocations.len(),
        supply = %config.allocated_supply(),
        voting_window = %format_duration(config.params.voting_duration_secs),
        "genesis applied"
    );
    Ok(engine)
}

/// Parse a JSON-lines call stream. Blank lines are skipped.
pub fn parse_calls(input: &str) -> anyhow::Result<Vec<NumberedCall>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(index, text)| {
            let line = index + 1;
            let call = serde_json::from_str(text).with_context(|| format!("call on line {}", line))?;
            Ok(NumberedCall { line, call })
        })
        .collect()
}

/// Apply `calls` in order, writing one JSON report line per call to `out`.
///
/// A rejected call had no effect and is skipped; with `strict` it stops the
/// replay instead.
pub fn replay(
    engine: &mut GovernanceEngine<SingleAuthority>,
    calls: Vec<NumberedCall>,
    clock: &dyn Clock,
    strict: bool,
    out: &mut dyn Write,
) -> anyhow::Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();
    for NumberedCall { line, call } in calls {
        let at = call.at.unwrap_or_else(|| clock.now());
        let op = call.op.name();
        let status = match engine.apply(&call.caller, call.op, at) {
            Ok(result) => {
                summary.applied += 1;
                Status::Ok { result }
            }
            Err(e) => {
                summary.rejected += 1;
                tracing::warn!(line, caller = %call.caller, op, error = %e, "call rejected");
                if strict {
                    return Err(e).with_context(|| format!("{} on line {} rejected", op, line));
                }
                Status::Rejected {
                    error: e.to_string(),
                }
            }
        };
        let report = CallReport {
            line,
            caller: &call.caller,
            op,
            at,
            status,
        };
        serde_json::to_writer(&mut *out, &report)?;
        writeln!(out)?;
    }
    Ok(summary)
}

/// Write every retained event as a JSON line.
pub fn write_events(
    engine: &GovernanceEngine<SingleAuthority>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    for record in engine.events().records() {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_governance::ProposalState;
    use concord_nullables::NullClock;

    const SECS_PER_WEEK_PLUS: u64 = concord_types::SECS_PER_WEEK + 100;

    const GENESIS: &str = r#"
authority = "ccd_owner"

[[allocations]]
account = "ccd_alice"
amount = 1000

[[allocations]]
account = "ccd_bob"
amount = 500
"#;

    const CALLS: &str = r#"
{"caller":"ccd_alice","at":10,"op":"delegate","to":"ccd_bob"}
{"caller":"ccd_alice","at":10,"op":"propose","description":"first"}
{"caller":"ccd_alice","at":20,"op":"vote","proposal":0,"support":true}
{"caller":"ccd_alice","at":30,"op":"vote","proposal":0,"support":false}

{"caller":"ccd_owner","op":"execute","proposal":0}
"#;

    const LEDGER_CALLS: &str = r#"
{"caller":"ccd_owner","at":5,"op":"mint","account":"ccd_carol","amount":300}
{"caller":"ccd_carol","at":6,"op":"transfer","to":"ccd_dave","amount":100}
{"caller":"ccd_carol","at":7,"op":"approve","spender":"ccd_dave","amount":"150"}
{"caller":"ccd_dave","at":8,"op":"transfer_from","from":"ccd_carol","to":"ccd_alice","amount":50}
{"caller":"ccd_owner","at":9,"op":"burn","account":"ccd_dave","amount":100}
"#;

    fn engine() -> GovernanceEngine<SingleAuthority> {
        genesis_engine(&GenesisConfig::from_toml_str(GENESIS).unwrap()).unwrap()
    }

    #[test]
    fn genesis_mints_allocations() {
        let engine = engine();
        assert_eq!(engine.total_supply(), 1500);
        assert_eq!(engine.balance_of(&AccountId::new("ccd_bob")), 500);
        assert_eq!(engine.events().len(), 2);
    }

    #[test]
    fn parses_flattened_calls_with_line_numbers() {
        let calls = parse_calls(CALLS).unwrap();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0].line, 2);
        assert_eq!(calls[4].line, 7);
        assert_eq!(calls[4].call.at, None);
        assert_eq!(
            calls[2].call.op,
            Operation::Vote {
                proposal: 0,
                support: true
            }
        );
    }

    #[test]
    fn ledger_calls_replay_through_json() {
        let mut engine = engine();
        let clock = NullClock::new(0);
        let mut out = Vec::new();
        let calls = parse_calls(LEDGER_CALLS).unwrap();
        assert_eq!(
            calls[1].call.op,
            Operation::Transfer {
                to: AccountId::new("ccd_dave"),
                amount: 100
            }
        );
        let summary = replay(&mut engine, calls, &clock, true, &mut out).unwrap();
        assert_eq!(summary, ReplaySummary { applied: 5, rejected: 0 });

        let carol = AccountId::new("ccd_carol");
        let dave = AccountId::new("ccd_dave");
        assert_eq!(engine.balance_of(&carol), 150);
        assert_eq!(engine.balance_of(&dave), 0);
        assert_eq!(engine.balance_of(&AccountId::new("ccd_alice")), 1050);
        assert_eq!(engine.allowance(&carol, &dave), 100);
        assert_eq!(engine.total_supply(), 1700);

        let kinds: Vec<_> = engine.events().records()[2..]
            .iter()
            .map(|r| r.event.kind())
            .collect();
        assert_eq!(
            kinds,
            vec!["transfer", "transfer", "approval", "approval", "transfer", "transfer"]
        );
    }

    #[test]
    fn malformed_line_is_reported() {
        let err = parse_calls("{\"caller\":\"ccd_a\",\"op\":\"fly\"}\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
    }

    #[test]
    fn lenient_replay_skips_rejections() {
        let mut engine = engine();
        let clock = NullClock::new(SECS_PER_WEEK_PLUS);
        let mut out = Vec::new();
        let summary =
            replay(&mut engine, parse_calls(CALLS).unwrap(), &clock, false, &mut out).unwrap();
        assert_eq!(summary, ReplaySummary { applied: 4, rejected: 1 });
        assert_eq!(engine.proposal(0).unwrap().state, ProposalState::Executed);
        assert_eq!(engine.balance_of(&AccountId::new("ccd_owner")), 1500);

        let reports: Vec<serde_json::Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(reports[2]["status"], "ok");
        assert_eq!(reports[2]["result"]["power"], 1500);
        assert_eq!(reports[3]["status"], "rejected");
        assert_eq!(reports[3]["line"], 5);
        assert_eq!(reports[4]["result"]["outcome"], "executed");
    }

    #[test]
    fn strict_replay_stops_at_first_rejection() {
        let mut engine = engine();
        let clock = NullClock::new(SECS_PER_WEEK_PLUS);
        let mut out = Vec::new();
        let err = replay(&mut engine, parse_calls(CALLS).unwrap(), &clock, true, &mut out)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("line 5"));
        assert_eq!(engine.proposal(0).unwrap().state, ProposalState::Pending);
    }

    #[test]
    fn events_are_written_as_json_lines() {
        let engine = engine();
        let mut out = Vec::new();
        write_events(&engine, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first["seq"], 0);
        assert_eq!(first["type"], "transfer");
        assert_eq!(first["to"], "ccd_alice");
    }
}
