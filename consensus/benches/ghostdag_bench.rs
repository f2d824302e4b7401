//! Header admission benchmarks
//!
//! Measures GHOSTDAG plus reachability cost per admitted header for a plain
//! chain and for a DAG where every block merges several parallel blocks.

use consensus::test_helpers::DagBuilder;
use consensus::Consensus;
use consensus_core::config::params::Params;
use consensus_core::header::Header;
use consensus_core::Hash;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use database::MemoryDb;
use std::sync::Arc;
use tracing::Span;

fn chain_headers(genesis: Hash, count: u64) -> Vec<Header> {
    let mut parent = genesis;
    (1..=count)
        .map(|word| {
            let header = Header::from_precomputed_hash(Hash::from_u64_word(word), vec![parent]);
            parent = header.hash;
            header
        })
        .collect()
}

/// Layers of `width` parallel blocks, each layer merging the whole previous one
fn layered_headers(genesis: Hash, layers: u64, width: u64) -> Vec<Header> {
    let mut previous = vec![genesis];
    let mut headers = Vec::new();
    for layer in 0..layers {
        let current: Vec<Hash> = (0..width).map(|i| Hash::from_u64_word(1 + layer * width + i)).collect();
        for &hash in current.iter() {
            headers.push(Header::from_precomputed_hash(hash, previous.clone()));
        }
        previous = current;
    }
    headers
}

fn fresh_consensus(params: &Params) -> Consensus {
    let consensus = Consensus::new(Arc::new(MemoryDb::new()), params, Span::none()).unwrap();
    consensus.init_genesis().unwrap();
    consensus
}

fn bench_header_admission(c: &mut Criterion) {
    let params = Params::devnet();
    let genesis = params.genesis_hash();
    let mut group = c.benchmark_group("header_admission");

    let chain = chain_headers(genesis, 500);
    group.throughput(Throughput::Elements(chain.len() as u64));
    group.bench_function("chain_500", |b| {
        b.iter_batched(
            || fresh_consensus(&params),
            |consensus| {
                for header in chain.iter() {
                    consensus.admit_header(black_box(header)).unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });

    for width in [2u64, 4, 8] {
        let headers = layered_headers(genesis, 400 / width, width);
        group.throughput(Throughput::Elements(headers.len() as u64));
        group.bench_with_input(BenchmarkId::new("layered", width), &headers, |b, headers| {
            b.iter_batched(
                || fresh_consensus(&params),
                |consensus| {
                    for header in headers.iter() {
                        consensus.admit_header(black_box(header)).unwrap();
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_expected_coinbase(c: &mut Criterion) {
    let mut dag = DagBuilder::new(&Params::devnet()).unwrap();
    let genesis = dag.genesis();
    let tips: Vec<Hash> = (1..=8).map(Hash::from_u64_word).collect();
    for &tip in tips.iter() {
        dag.add_block(tip, &[genesis]).unwrap();
    }
    let merging = Hash::from_u64_word(100);
    dag.add_block(merging, &tips).unwrap();

    c.bench_function("expected_coinbase_8_merged", |b| {
        b.iter(|| dag.consensus().expected_coinbase_transaction(black_box(merging), &Default::default()).unwrap())
    });
}

criterion_group!(benches, bench_header_admission, bench_expected_coinbase);
criterion_main!(benches);
