use super::GhostdagManager;
use crate::errors::ConsensusError;
use crate::model::stores::{
    DbResult, GhostdagStore, GhostdagStoreReader, HeaderStore, HeaderStoreReader, ReachabilityStoreReader,
};
use crate::processes::services::ReachabilityService;
use crate::processes::traversal::DagTraversalManager;
use crate::test_helpers::DagBuilder;
use consensus_core::config::params::Params;
use consensus_core::errors::RuleError;
use consensus_core::header::Header;
use consensus_core::{BlockHashSet, BlueWorkType, Hash, KType};
use database::{ConsensusStorage, MemoryDb};
use std::sync::Arc;
use tracing::Span;

fn h(word: u64) -> Hash {
    Hash::from_u64_word(word)
}

fn builder(k: KType) -> DagBuilder {
    DagBuilder::new(&Params { ghostdag_k: k, ..Params::devnet() }).unwrap()
}

// Test headers carry DEFAULT_TEST_BITS, whose work is 2
fn work(blues: u64) -> BlueWorkType {
    BlueWorkType::from(2 * blues)
}

#[test]
fn test_chain() {
    let mut dag = builder(18);
    let genesis = dag.genesis();
    let mut parent = genesis;
    for i in 1..=5 {
        let data = dag.add_block(h(i), &[parent]).unwrap();
        assert_eq!(data.selected_parent, Some(parent));
        assert_eq!(data.mergeset_blues, vec![parent]);
        assert!(data.mergeset_reds.is_empty());
        assert_eq!(data.blue_score, i);
        assert_eq!(data.blue_work, work(i));
        parent = h(i);
    }
    let chain = dag.consensus().traversal_manager().selected_chain(&dag.consensus().staging(), h(5)).unwrap();
    assert_eq!(chain, vec![h(5), h(4), h(3), h(2), h(1), genesis]);
}

#[test]
fn test_diamond_merges_both_parents_as_blue() {
    let mut dag = builder(18);
    let genesis = dag.genesis();
    dag.add_block(h(1), &[genesis]).unwrap();
    dag.add_block(h(2), &[genesis]).unwrap();
    let data = dag.add_block(h(3), &[h(2), h(1)]).unwrap();

    // equal blue scores, the smaller hash is selected
    assert_eq!(data.selected_parent, Some(h(1)));
    assert_eq!(data.mergeset_blues, vec![h(1), h(2)]);
    assert!(data.mergeset_reds.is_empty());
    assert_eq!(data.blue_score, 3);
    assert_eq!(data.blue_work, work(3));
    assert_eq!(data.blues_anticone_sizes.get(&h(1)), Some(&1));
    assert_eq!(data.blues_anticone_sizes.get(&h(2)), Some(&1));
}

#[test]
fn test_zero_k_colors_merged_parallel_block_red() {
    let mut dag = builder(0);
    let genesis = dag.genesis();
    dag.add_block(h(1), &[genesis]).unwrap();
    dag.add_block(h(2), &[genesis]).unwrap();
    let data = dag.add_block(h(3), &[h(1), h(2)]).unwrap();

    assert_eq!(data.mergeset_blues, vec![h(1)]);
    assert_eq!(data.mergeset_reds, vec![h(2)]);
    assert_eq!(data.blue_score, 2);
    assert_eq!(data.blue_work, work(2));
}

#[test]
fn test_selected_parent_has_highest_blue_score() {
    let mut dag = builder(18);
    let genesis = dag.genesis();
    dag.add_block(h(10), &[genesis]).unwrap();
    dag.add_block(h(11), &[h(10)]).unwrap();
    dag.add_block(h(1), &[genesis]).unwrap();

    let data = dag.add_block(h(12), &[h(1), h(11)]).unwrap();
    assert_eq!(data.selected_parent, Some(h(11)));
    assert_eq!(data.mergeset_blues, vec![h(11), h(1)]);
    assert_eq!(data.blue_score, 4);
}

#[test]
fn test_blue_set_is_bounded_by_k() {
    let k = 3;
    let mut dag = builder(k);
    let genesis = dag.genesis();
    let parents: Vec<Hash> = (1..=10).map(h).collect();
    for &parent in parents.iter() {
        dag.add_block(parent, &[genesis]).unwrap();
    }
    let data = dag.add_block(h(11), &parents).unwrap();

    assert_eq!(data.mergeset_blues, vec![h(1), h(2), h(3), h(4)]);
    assert_eq!(data.mergeset_reds, (5..=10).map(h).collect::<Vec<_>>());
    assert_eq!(data.blue_score, 1 + k as u64 + 1);
    for blue in data.mergeset_blues.iter() {
        assert_eq!(data.blues_anticone_sizes.get(blue), Some(&k));
    }

    // every blue has at most k blues in its anticone
    let consensus = dag.consensus();
    let staging = consensus.staging();
    for &blue in data.mergeset_blues.iter() {
        let anticone = consensus.traversal_manager().anticone(&staging, blue, &[h(11)], 100).unwrap();
        let blue_anticone = anticone.iter().filter(|block| data.mergeset_blues.contains(block)).count();
        assert!(blue_anticone <= k as usize);
    }
}

#[test]
fn test_merge_set_excludes_selected_parent_past() {
    let mut dag = builder(18);
    let genesis = dag.genesis();
    dag.add_block(h(1), &[genesis]).unwrap();
    dag.add_block(h(2), &[h(1)]).unwrap();
    dag.add_block(h(3), &[h(2)]).unwrap();
    dag.add_block(h(4), &[h(1)]).unwrap();
    dag.add_block(h(5), &[h(4)]).unwrap();

    let data = dag.add_block(h(6), &[h(3), h(5)]).unwrap();
    // ties broken by hash: 3 < 5
    assert_eq!(data.selected_parent, Some(h(3)));
    let mut merged: Vec<Hash> = data.mergeset_without_selected_parent().collect();
    merged.sort();
    assert_eq!(merged, vec![h(4), h(5)]);
}

#[test]
fn test_invalid_parent_sets_are_rejected() {
    let mut dag = builder(18);
    let genesis = dag.genesis();
    dag.add_block(h(1), &[genesis]).unwrap();
    dag.add_block(h(2), &[h(1)]).unwrap();

    let err = dag.add_block(h(3), &[h(1), h(2)]).unwrap_err();
    assert!(matches!(
        err,
        ConsensusError::Validation { source: RuleError::InvalidParentsRelation(parent, selected), .. }
            if parent == h(1) && selected == h(2)
    ));

    let err = dag.add_block(h(4), &[h(2), h(2)]).unwrap_err();
    assert!(matches!(err, ConsensusError::Validation { source: RuleError::DuplicateParents(_), .. }));

    let err = dag.add_block(h(5), &[]).unwrap_err();
    assert!(matches!(err, ConsensusError::Validation { source: RuleError::NoParents, .. }));

    // rejected blocks leave nothing behind
    assert!(dag.ghostdag_data(h(3)).unwrap_err().is_not_found());
}

#[test]
fn test_missing_parent_is_not_found() {
    let mut dag = builder(18);
    let genesis = dag.genesis();
    let err = dag.add_block(h(2), &[genesis, h(1)]).unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_fatal());
}

#[test]
fn test_admission_order_does_not_change_the_result() {
    let build = |order: &[u64]| {
        let mut dag = builder(2);
        let genesis = dag.genesis();
        for &word in order {
            dag.add_block(h(word), &[genesis]).unwrap();
        }
        dag.add_block(h(10), &[h(1), h(2), h(3), h(4)]).unwrap()
    };
    let forward = build(&[1, 2, 3, 4]);
    let backward = build(&[4, 3, 2, 1]);
    assert_eq!(forward, backward);
    assert_eq!(forward.mergeset_blues, vec![h(1), h(2), h(3)]);
    assert_eq!(forward.mergeset_reds, vec![h(4)]);
}

#[test]
fn test_sort_blocks_orders_by_blue_work_then_hash() {
    let mut dag = builder(18);
    let genesis = dag.genesis();
    dag.add_block(h(5), &[genesis]).unwrap();
    dag.add_block(h(1), &[h(5)]).unwrap();
    dag.add_block(h(3), &[genesis]).unwrap();

    let consensus = dag.consensus();
    let sorted = consensus.ghostdag_manager().sort_blocks(&consensus.staging(), [h(1), h(5), h(3), genesis]).unwrap();
    assert_eq!(sorted, vec![genesis, h(3), h(5), h(1)]);
}

#[test]
fn test_header_is_stored_with_its_ghostdag_data() {
    let mut dag = builder(18);
    let genesis = dag.genesis();
    let header = Header::from_precomputed_hash(h(1), vec![genesis]);
    let result = dag.consensus().admit_header(&header).unwrap();
    assert_eq!(result.hash(), h(1));
    assert_eq!(result.ghostdag_data().map(|data| data.blue_score), Some(1));

    let again = dag.consensus().admit_header(&header).unwrap();
    assert!(again.ghostdag_data().is_none());

    let staging = dag.consensus().staging();
    assert_eq!(staging.get_blue_score(h(1)).unwrap(), 1);
    assert_eq!(staging.get_selected_parent(h(1)).unwrap(), Some(genesis));
}

/// Answers ancestry by walking header parents, without any reachability index
#[derive(Clone)]
struct ParentWalk;

impl ReachabilityService for ParentWalk {
    fn is_dag_ancestor_of<S>(&self, store: &S, this: Hash, queried: Hash) -> DbResult<bool>
    where
        S: HeaderStoreReader + ReachabilityStoreReader + ?Sized,
    {
        let mut visited = BlockHashSet::new();
        let mut stack = vec![queried];
        while let Some(current) = stack.pop() {
            if current == this {
                return Ok(true);
            }
            if visited.insert(current) {
                stack.extend(store.get_parents(current)?);
            }
        }
        Ok(false)
    }
}

#[test]
fn test_coloring_over_another_reachability_service() {
    let k = 2;
    let mut dag = builder(k);
    let genesis = dag.genesis();
    let committed = dag.consensus().staging();

    let traversal = DagTraversalManager::new(ParentWalk, Span::none());
    let manager = GhostdagManager::new(k, ParentWalk, traversal, Span::none());
    let mut staging = ConsensusStorage::new(Arc::new(MemoryDb::new())).staging();
    staging.insert_header(&committed.get_header(genesis).unwrap()).unwrap();
    staging.insert_ghostdag_data(genesis, &committed.get_ghostdag_data(genesis).unwrap()).unwrap();

    let blocks: Vec<(u64, Vec<Hash>)> = vec![
        (1, vec![genesis]),
        (2, vec![genesis]),
        (3, vec![genesis]),
        (4, vec![genesis]),
        (5, vec![h(1), h(2)]),
        (6, vec![h(3), h(4)]),
        (7, vec![h(5), h(6)]),
        (8, vec![h(7), h(4)]),
    ];
    for (word, parents) in blocks {
        let expected = dag.add_block(h(word), &parents).unwrap();
        staging.insert_header(&Header::from_precomputed_hash(h(word), parents.clone())).unwrap();
        let data = manager.ghostdag(&staging, h(word), &parents).unwrap();
        assert_eq!(data, *expected, "block {}", word);
        staging.insert_ghostdag_data(h(word), &data).unwrap();
    }
    // no reachability data was ever written next to the headers
    assert!(staging.get_children(genesis).unwrap_err().is_not_found());
    assert!(!dag.ghostdag_data(h(7)).unwrap().mergeset_reds.is_empty());
}

#[test]
fn test_blue_work_overflow_is_a_validation_error() {
    let dag = builder(18);
    let genesis = dag.genesis();
    let committed = dag.consensus().staging();

    let mut staging = ConsensusStorage::new(Arc::new(MemoryDb::new())).staging();
    staging.insert_header(&committed.get_header(genesis).unwrap()).unwrap();
    let mut genesis_data = committed.get_ghostdag_data(genesis).unwrap();
    genesis_data.blue_work = BlueWorkType::MAX;
    staging.insert_ghostdag_data(genesis, &genesis_data).unwrap();
    staging.insert_header(&Header::from_precomputed_hash(h(1), vec![genesis])).unwrap();

    let err = dag.consensus().ghostdag_manager().ghostdag(&staging, h(1), &[genesis]).unwrap_err();
    assert!(matches!(err, ConsensusError::Validation { block, source: RuleError::BlueWorkOverflow } if block == h(1)));
}
