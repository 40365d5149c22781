
use anyhow::Result;
use std::collections::{HashMap, HashSet, VecDeque};
use tangle_core::{storage::MemoryCachedTransaction, traverse_approvees, CachedTransaction, MemoryTangle, Tangle};
use tangle_proto::Hash;
use tangle_tests::{chain, genesis, random_tangle};

/// The stored ancestors of `start` (inclusive), computed without the traversal engine.
fn past_cone(tangle: &MemoryTangle, start: &Hash) -> Result<HashSet<Hash>> {
    let mut cone = HashSet::new();
    let mut queue = VecDeque::from([start.clone()]);
    while let Some(hash) = queue.pop_front() {
        if tangle.solid_entry_points_contain(&hash) || !cone.insert(hash.clone()) {
            continue;
        }
        let cached = tangle.get_cached_transaction(&hash)?.ok_or_else(|| anyhow::anyhow!("{} not stored", hash))?;
        queue.extend(cached.transaction().approvee_hashes().into_iter().cloned());
    }
    Ok(cone)
}

#[test]
fn test_random_tangles_past_cone() -> Result<()> {
    for seed in 0..8 {
        let (tangle, hashes) = random_tangle(seed, 300, 4);
        let start = hashes.last().expect("non-empty");
        let expected = past_cone(&tangle, start)?;

        let mut evaluated = Vec::new();
        let mut consumed = Vec::new();
        let mut approvees = HashMap::new();
        let mut solid_entry_points = 0;
        traverse_approvees(
            &tangle,
            start,
            &mut |cached: MemoryCachedTransaction| {
                evaluated.push(cached.transaction().hash().clone());
                Ok(true)
            },
            &mut |cached: MemoryCachedTransaction| {
                let transaction = cached.transaction();
                approvees.insert(transaction.hash().clone(), transaction.approvee_hashes().into_iter().cloned().collect::<Vec<_>>());
                consumed.push(transaction.hash().clone());
                Ok(())
            },
            &mut |hash: &Hash| Err(tangle_core::TraversalError::TransactionNotFound(hash.clone())),
            &mut |hash: &Hash| {
                assert_eq!(hash, &genesis());
                solid_entry_points += 1;
            },
            false,
            false,
            None,
        )?;

        // every transaction of the cone is evaluated and consumed exactly once
        assert_eq!(evaluated.len(), expected.len(), "seed {}", seed);
        assert_eq!(evaluated.iter().cloned().collect::<HashSet<_>>(), expected);
        assert_eq!(consumed.len(), expected.len());
        assert_eq!(consumed.iter().cloned().collect::<HashSet<_>>(), expected);
        assert_eq!(solid_entry_points, 1, "genesis is reported once");

        // approvees are consumed before their approvers
        let positions: HashMap<&Hash, usize> = consumed.iter().enumerate().map(|(i, hash)| (hash, i)).collect();
        for (hash, parents) in &approvees {
            for parent in parents.iter().filter(|parent| **parent != genesis()) {
                assert!(positions[parent] < positions[hash], "seed {}: {:#} consumed before its approvee {:#}", seed, hash, parent);
            }
        }

        assert_eq!(tangle.acquisitions(), tangle.releases());
        tangle.flush_expired();
        assert_eq!(tangle.cached_count(), 0);
    }
    Ok(())
}

#[test]
fn test_forced_release_leaves_nothing_cached() -> Result<()> {
    let (tangle, hashes) = random_tangle(42, 200, 5);

    traverse_approvees(
        &tangle,
        hashes.last().expect("non-empty"),
        &mut |cached: MemoryCachedTransaction| {
            cached.release(true);
            Ok(true)
        },
        &mut |cached: MemoryCachedTransaction| {
            cached.release(true);
            Ok(())
        },
        &mut |_: &Hash| Ok(()),
        &mut |_: &Hash| {},
        true,
        false,
        None,
    )?;

    assert!(tangle.acquisitions() > 0);
    assert_eq!(tangle.acquisitions(), tangle.releases());
    assert_eq!(tangle.cached_count(), 0);
    Ok(())
}

#[test]
fn test_deep_chain_does_not_recurse() -> Result<()> {
    let tangle = MemoryTangle::new();
    tangle.add_solid_entry_point(genesis());
    let hashes = chain(&tangle, 50_000);

    let mut consumed = Vec::with_capacity(hashes.len());
    traverse_approvees(
        &tangle,
        hashes.last().expect("non-empty"),
        &mut |_cached: MemoryCachedTransaction| Ok(true),
        &mut |cached: MemoryCachedTransaction| {
            consumed.push(cached.transaction().hash().clone());
            Ok(())
        },
        &mut |_: &Hash| Ok(()),
        &mut |_: &Hash| {},
        true,
        false,
        None,
    )?;

    assert_eq!(consumed, hashes);
    assert_eq!(tangle.acquisitions(), tangle.releases());
    Ok(())
}
