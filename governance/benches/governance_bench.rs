use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use concord_governance::{DelegationGraph, GovernanceEngine};
use concord_ledger::TokenLedger;
use concord_types::{AccountId, GovernanceParams, SingleAuthority, Timestamp};

fn account(i: usize) -> AccountId {
    AccountId::new(format!("ccd_acct{}", i))
}

fn chain(len: usize) -> (DelegationGraph, TokenLedger) {
    let owner = AccountId::new("ccd_owner");
    let gate = SingleAuthority::new(owner.clone());
    let mut ledger = TokenLedger::new();
    let mut graph = DelegationGraph::new();
    for i in 0..=len {
        ledger.mint(&gate, &owner, &account(i), 1_000).unwrap();
        if i < len {
            graph.delegate(&account(i), &account(i + 1)).unwrap();
        }
    }
    (graph, ledger)
}

fn bench_resolve_power(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_power");

    for len in [0, 1, 5, 100] {
        let (graph, ledger) = chain(len);
        group.bench_with_input(BenchmarkId::new("chain", len), &len, |b, _| {
            b.iter(|| black_box(graph.resolve_power(black_box(&account(0)), &ledger)));
        });
    }

    group.finish();
}

fn bench_vote_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("vote_round");

    for voters in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("voters", voters), &voters, |b, &voters| {
            b.iter(|| {
                let owner = AccountId::new("ccd_owner");
                let mut engine = GovernanceEngine::new(
                    GovernanceParams::default(),
                    SingleAuthority::new(owner.clone()),
                )
                .unwrap();
                for i in 0..voters {
                    engine.mint(&owner, &account(i), 500).unwrap();
                }
                let now = Timestamp::new(0);
                let id = engine.propose(&account(0), "bench", now).unwrap();
                for i in 0..voters {
                    engine.vote(&account(i), id, i % 3 != 0, now).unwrap();
                }
                black_box(engine.proposal(id).unwrap().for_votes)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve_power, bench_vote_round);
criterion_main!(benches);
