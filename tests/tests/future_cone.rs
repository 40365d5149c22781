
use anyhow::Result;
use std::collections::{HashMap, HashSet, VecDeque};
use tangle_core::{storage::MemoryCachedTransaction, traverse_approvers, CachedTransaction, MemoryTangle, Tangle, TraversalError};
use tangle_proto::{Hash, Transaction};
use tangle_tests::random_tangle;

/// Descendants of `start` (inclusive), computed from the approvee references alone.
fn future_cone(tangle: &MemoryTangle, hashes: &[Hash], start: &Hash) -> Result<HashSet<Hash>> {
    let mut approvers: HashMap<Hash, Vec<Hash>> = HashMap::new();
    for hash in hashes {
        let cached = tangle.get_cached_transaction(hash)?.ok_or_else(|| anyhow::anyhow!("{} not stored", hash))?;
        for approvee in cached.transaction().approvee_hashes() {
            approvers.entry(approvee.clone()).or_default().push(hash.clone());
        }
    }

    let mut cone = HashSet::new();
    let mut queue = VecDeque::from([start.clone()]);
    while let Some(hash) = queue.pop_front() {
        if cone.insert(hash.clone()) {
            queue.extend(approvers.get(&hash).into_iter().flatten().cloned());
        }
    }
    Ok(cone)
}

#[test]
fn test_random_tangles_future_cone() -> Result<()> {
    for seed in 0..8 {
        let (tangle, hashes) = random_tangle(seed, 300, 4);
        // somewhere early, so the future cone is large
        let start = &hashes[seed as usize * 3];
        let expected = future_cone(&tangle, &hashes, start)?;

        let mut evaluated = Vec::new();
        let mut consumed = Vec::new();
        traverse_approvers(
            &tangle,
            start,
            &mut |cached: MemoryCachedTransaction| {
                evaluated.push(cached.transaction().hash().clone());
                Ok(true)
            },
            &mut |cached: MemoryCachedTransaction| {
                consumed.push(cached.transaction().hash().clone());
                Ok(())
            },
            false,
            None,
        )?;

        // each transaction is scheduled once, even when several approvees lead to it
        assert_eq!(evaluated.len(), expected.len(), "seed {}", seed);
        assert_eq!(consumed.iter().cloned().collect::<HashSet<_>>(), expected);
        assert_eq!(consumed.len(), expected.len());
        assert_eq!(consumed.first(), Some(start));
        assert_eq!(tangle.acquisitions(), tangle.releases());
    }
    Ok(())
}

#[test]
fn test_future_cone_bounded_by_predicate() -> Result<()> {
    let (tangle, hashes) = random_tangle(7, 200, 4);
    let start = &hashes[0];

    // only follow transactions that are not tails; tails are evaluated but neither consumed nor expanded
    let mut consumed = Vec::new();
    traverse_approvers(
        &tangle,
        start,
        &mut |cached: MemoryCachedTransaction| Ok(cached.transaction().hash() == start || !cached.transaction().is_tail()),
        &mut |cached: MemoryCachedTransaction| {
            consumed.push(cached.transaction().clone());
            Ok(())
        },
        true,
        None,
    )?;

    assert!(consumed.iter().skip(1).all(|transaction: &Transaction| !transaction.is_tail()));
    assert_eq!(tangle.acquisitions(), tangle.releases());
    Ok(())
}

#[test]
fn test_consumer_error_stops_future_cone() {
    let (tangle, hashes) = random_tangle(3, 50, 4);

    let mut consumed = 0;
    let result = traverse_approvers(
        &tangle,
        &hashes[0],
        &mut |_cached: MemoryCachedTransaction| Ok(true),
        &mut |_cached: MemoryCachedTransaction| {
            consumed += 1;
            if consumed == 3 {
                return Err(TraversalError::consumer("stop"));
            }
            Ok(())
        },
        false,
        None,
    );

    assert!(matches!(result, Err(TraversalError::Consumer(_))));
    assert_eq!(consumed, 3);
    assert_eq!(tangle.acquisitions(), tangle.releases());
}
