//! Slot Operations - Pure DOP Functions
//!
//! Allocation over the packed slot space in `ExplorableStorage`. Freed ids
//! are reused last-in first-out before new ids are minted.

use super::explorable_data::{ExplorableId, ExplorableStorage};
use crate::error::{ExplorableError, ExplorableResult};
use rustc_hash::FxHashSet;

/// Reserve a slot id
///
/// Pops the free list, else mints `explorables.len()` and reserves its
/// entry so a second allocation before the first is filled cannot reuse it.
pub fn allocate_slot(storage: &mut ExplorableStorage, capacity: u32) -> ExplorableResult<ExplorableId> {
    if let Some(id) = storage.unused.pop() {
        return Ok(id);
    }

    let next = storage.explorables.len();
    if next >= capacity as usize {
        return Err(ExplorableError::CapacityExceeded { capacity });
    }

    storage.explorables.push(None);
    Ok(ExplorableId(next as u32))
}

/// Vacate a slot and make its id reusable
///
/// Returns false when the id was never minted or is already free.
pub fn free_slot(storage: &mut ExplorableStorage, id: ExplorableId) -> bool {
    let Some(entry) = storage.explorables.get_mut(id.index()) else {
        return false;
    };
    *entry = None;

    if storage.unused.contains(&id) {
        return false;
    }
    storage.unused.push(id);
    true
}

/// Put vacant slots that are missing from the free list back on it
///
/// A slot reserved by `allocate_slot` stays vacant and off the free list
/// until its record is written; a restart in between would strand it.
/// Returns the reclaimed ids, ascending.
pub fn reclaim_vacant_slots(storage: &mut ExplorableStorage) -> Vec<ExplorableId> {
    let free: FxHashSet<ExplorableId> = storage.unused.iter().copied().collect();
    let stranded: Vec<ExplorableId> = storage
        .explorables
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_none())
        .map(|(index, _)| ExplorableId(index as u32))
        .filter(|id| !free.contains(id))
        .collect();

    // Pushed highest first so the lowest stranded id is reused first
    storage.unused.extend(stranded.iter().rev().copied());
    stranded
}

/// Describe the first inconsistency in the free list, if any
///
/// Every free id must be minted, vacant and listed once.
pub fn free_list_fault(storage: &ExplorableStorage) -> Option<String> {
    let mut seen = FxHashSet::default();
    for id in &storage.unused {
        if id.index() >= storage.explorables.len() {
            return Some(format!("free slot {} was never allocated", id));
        }
        if is_live(storage, *id) {
            return Some(format!("free slot {} holds a live explorable", id));
        }
        if !seen.insert(*id) {
            return Some(format!("free slot {} is listed twice", id));
        }
    }
    None
}

/// Grid coordinates of a slot: `(id mod width, id / width)`
pub fn grid_coords(id: ExplorableId, grid_width: u32) -> (u32, u32) {
    (id.0 % grid_width, id.0 / grid_width)
}

pub fn is_live(storage: &ExplorableStorage, id: ExplorableId) -> bool {
    matches!(storage.explorables.get(id.index()), Some(Some(_)))
}

/// Ids of every live explorable, ascending
pub fn live_ids(storage: &ExplorableStorage) -> Vec<ExplorableId> {
    storage
        .explorables
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_some())
        .map(|(index, _)| ExplorableId(index as u32))
        .collect()
}

pub fn live_count(storage: &ExplorableStorage) -> usize {
    storage.explorables.iter().filter(|entry| entry.is_some()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::HashSet;

    #[test]
    fn test_sequential_then_lifo_reuse() {
        let mut storage = ExplorableStorage::default();

        let a = allocate_slot(&mut storage, 10).expect("a");
        let b = allocate_slot(&mut storage, 10).expect("b");
        let c = allocate_slot(&mut storage, 10).expect("c");
        assert_eq!((a, b, c), (ExplorableId(0), ExplorableId(1), ExplorableId(2)));

        assert!(free_slot(&mut storage, a));
        assert!(free_slot(&mut storage, c));

        assert_eq!(allocate_slot(&mut storage, 10).expect("reuse"), c);
        assert_eq!(allocate_slot(&mut storage, 10).expect("reuse"), a);
        assert_eq!(allocate_slot(&mut storage, 10).expect("fresh"), ExplorableId(3));
    }

    #[test]
    fn test_double_free_is_ignored() {
        let mut storage = ExplorableStorage::default();
        let id = allocate_slot(&mut storage, 10).expect("alloc");

        assert!(free_slot(&mut storage, id));
        assert!(!free_slot(&mut storage, id));
        assert!(!free_slot(&mut storage, ExplorableId(42)));
        assert_eq!(storage.unused, vec![id]);
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut storage = ExplorableStorage::default();
        allocate_slot(&mut storage, 2).expect("0");
        allocate_slot(&mut storage, 2).expect("1");

        let err = allocate_slot(&mut storage, 2).expect_err("grid is full");
        assert!(matches!(err, ExplorableError::CapacityExceeded { capacity: 2 }));
    }

    #[test]
    fn test_reserved_but_unfilled_slots_are_reclaimed() {
        let mut storage = ExplorableStorage::default();
        let a = allocate_slot(&mut storage, 10).expect("a");
        let b = allocate_slot(&mut storage, 10).expect("b");
        let c = allocate_slot(&mut storage, 10).expect("c");
        storage.explorables[b.index()] = Some(sample());

        // `a` and `c` were reserved but never filled
        assert_eq!(reclaim_vacant_slots(&mut storage), vec![a, c]);
        assert_eq!(allocate_slot(&mut storage, 10).expect("reuse"), a);
        assert_eq!(storage.unused, vec![c]);
        assert!(free_list_fault(&storage).is_none());
    }

    #[test]
    fn test_free_list_faults() {
        let mut storage = ExplorableStorage::default();
        let a = allocate_slot(&mut storage, 10).expect("a");
        storage.explorables[a.index()] = Some(sample());
        assert!(free_list_fault(&storage).is_none());

        storage.unused = vec![a];
        assert!(free_list_fault(&storage).is_some());

        storage.unused = vec![ExplorableId(5)];
        assert!(free_list_fault(&storage).is_some());

        storage.explorables.push(None);
        storage.unused = vec![ExplorableId(1), ExplorableId(1)];
        assert!(free_list_fault(&storage).is_some());
    }

    fn sample() -> crate::explorable::Explorable {
        crate::explorable::Explorable {
            explorable_type: "cave".to_string(),
            grid_x: 0,
            grid_y: 0,
            entrance_x: 0,
            entrance_y: 0,
            exit_to_x: 0,
            exit_to_y: 0,
            player_count: 0,
            reset_at: None,
        }
    }

    #[test]
    fn test_grid_coords() {
        assert_eq!(grid_coords(ExplorableId(0), 1000), (0, 0));
        assert_eq!(grid_coords(ExplorableId(999), 1000), (999, 0));
        assert_eq!(grid_coords(ExplorableId(1000), 1000), (0, 1));
        assert_eq!(grid_coords(ExplorableId(123_456), 1000), (456, 123));
    }

    #[test]
    fn test_random_sequences_never_share_ids() {
        let mut rng = StdRng::seed_from_u64(0x5107);
        let mut storage = ExplorableStorage::default();
        let mut live: HashSet<ExplorableId> = HashSet::new();

        for _ in 0..2_000 {
            if live.is_empty() || rng.gen_bool(0.6) {
                let free_before: HashSet<ExplorableId> = storage.unused.iter().copied().collect();
                let id = allocate_slot(&mut storage, 1_000_000).expect("alloc");

                assert!(live.insert(id), "id {} handed out twice", id);
                if !free_before.is_empty() {
                    assert!(free_before.contains(&id), "fresh id minted while ids were free");
                }
            } else {
                let victim = *live.iter().nth(rng.gen_range(0..live.len())).expect("non-empty");
                live.remove(&victim);
                assert!(free_slot(&mut storage, victim));
            }
        }
    }
}
