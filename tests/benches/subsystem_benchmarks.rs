//! # Nym-Trust Subsystem Benchmarks
//!
//! | Subsystem | Operation | Grows with |
//! |-----------|-----------|------------|
//! | nt-01 Verifiable Shuffle | shuffle, prove, verify | list size `k` |
//! | nt-02 Ledger | proof-of-work search | creator's share of the chain |
//! | nt-03 Trust Evaluation | granularity search | list size |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nt_01_verifiable_shuffle::{hash_verify, shuffle};
use nt_02_ledger::{default_tag, mine, Block, MiningOutcome, MiningTemplate};
use nt_03_trust_evaluation::choose_d;
use rand::Rng;
use shared_crypto::{random_scalar, GroupElement, SchnorrKeyPair};
use shared_types::ReputationEntry;
use std::time::Duration;

const LIST_SIZES: [usize; 4] = [2, 8, 32, 128];

fn pairs(k: usize) -> (GroupElement, GroupElement, Vec<GroupElement>, Vec<GroupElement>) {
    let g = GroupElement::generator();
    let h = GroupElement::mul_base(&random_scalar());
    let x = vec![h; k];
    let y = (0..k).map(|_| GroupElement::random()).collect();
    (g, h, x, y)
}

// ============================================================================
// NT-01: Verifiable Shuffle
// ============================================================================

fn bench_pair_shuffle(c: &mut Criterion) {
    let mut group = c.benchmark_group("nt-01-verifiable-shuffle");
    group.measurement_time(Duration::from_secs(10));

    for k in LIST_SIZES {
        let (g, h, x, y) = pairs(k);
        group.throughput(Throughput::Elements(k as u64));

        group.bench_with_input(BenchmarkId::new("shuffle_and_prove", k), &k, |b, _| {
            b.iter(|| {
                let out = shuffle(&g, &h, &x, &y).unwrap();
                black_box(out.prover.hash_prove().unwrap())
            })
        });

        let out = shuffle(&g, &h, &x, &y).unwrap();
        let statement = out.prover.statement().clone();
        let proof = out.prover.hash_prove().unwrap();
        group.bench_with_input(BenchmarkId::new("verify", k), &k, |b, _| {
            b.iter(|| black_box(hash_verify(&statement, &proof).is_ok()))
        });
    }

    group.finish();
}

// ============================================================================
// NT-02: Ledger
// ============================================================================

fn bench_mining(c: &mut Criterion) {
    let mut group = c.benchmark_group("nt-02-ledger");
    group.sample_size(20);

    let creator = SchnorrKeyPair::generate().public_key();
    let entries: Vec<ReputationEntry> = (0..32)
        .map(|_| ReputationEntry::new(GroupElement::random(), 0.1))
        .collect();
    let genesis = Block::genesis(&entries, &GroupElement::random(), &creator);
    let tag = default_tag();

    // target grows with chain_length / work, so fewer prior wins mean a cheaper search
    for work in [16i64, 4, 1] {
        let template = MiningTemplate::new(&genesis, 16, work, &[], &entries, &creator).unwrap();
        group.bench_with_input(
            BenchmarkId::new("mine_after_wins", work),
            &work,
            |b, _| {
                b.iter(|| match mine(&template, tag, || false) {
                    MiningOutcome::Found(block) => black_box(block.timestamp),
                    other => panic!("mining did not finish: {other:?}"),
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// NT-03: Trust Evaluation
// ============================================================================

fn bench_obfuscation(c: &mut Criterion) {
    let mut group = c.benchmark_group("nt-03-trust-evaluation");
    let mut rng = rand::thread_rng();

    for size in [10usize, 100, 1000] {
        let scores: Vec<f64> = (0..size).map(|_| rng.gen_range(0.0..=1.0)).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("choose_d", size), &scores, |b, scores| {
            b.iter(|| black_box(choose_d(scores, 30, 1, 0.5)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pair_shuffle, bench_mining, bench_obfuscation);
criterion_main!(benches);
