//! Property tests through the public API only.

use openhash::{LinkedOpenHashSet, OpenHashMap};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum MapOp {
    Insert(u8, i32),
    Remove(u8),
    Retain(u8),
    Clear,
}

fn arb_map_op() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        8 => (0u8..48, any::<i32>()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        4 => (0u8..48).prop_map(MapOp::Remove),
        1 => (2u8..5).prop_map(MapOp::Retain),
        1 => Just(MapOp::Clear),
    ]
}

#[derive(Debug, Clone)]
enum SetOp {
    Insert(u8),
    InsertPromote(u8),
    Remove(u8),
    PopFirst,
    PopLast,
}

fn arb_set_op() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        6 => (0u8..24).prop_map(SetOp::Insert),
        3 => (0u8..24).prop_map(SetOp::InsertPromote),
        3 => (0u8..24).prop_map(SetOp::Remove),
        2 => Just(SetOp::PopFirst),
        2 => Just(SetOp::PopLast),
    ]
}

proptest! {
    /// The map facade behaves like std's HashMap under any op sequence.
    #[test]
    fn map_matches_std(ops in prop::collection::vec(arb_map_op(), 1..150)) {
        let mut m: OpenHashMap<u8, i32> = OpenHashMap::new();
        let mut model: HashMap<u8, i32> = HashMap::new();
        for op in ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(m.insert(k, v), model.insert(k, v));
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(m.remove(&k), model.remove(&k));
                }
                MapOp::Retain(d) => {
                    m.retain(|k, _| k % d != 0);
                    model.retain(|k, _| k % d != 0);
                }
                MapOp::Clear => {
                    m.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(m.len(), model.len());
        }
        for (k, v) in &model {
            prop_assert_eq!(m.get(k), Some(v));
        }
        let mut got: Vec<(u8, i32)> = m.iter().map(|(k, v)| (*k, *v)).collect();
        let mut want: Vec<(u8, i32)> = model.into_iter().collect();
        got.sort_unstable();
        want.sort_unstable();
        prop_assert_eq!(got, want);
    }

    /// The linked set's iteration order tracks an order-preserving model.
    #[test]
    fn linked_set_matches_order_model(ops in prop::collection::vec(arb_set_op(), 1..150)) {
        let mut s: LinkedOpenHashSet<u8> = LinkedOpenHashSet::new();
        let mut model: Vec<u8> = Vec::new();
        for op in ops {
            match op {
                SetOp::Insert(k) => {
                    let fresh = s.insert(k);
                    prop_assert_eq!(fresh, !model.contains(&k));
                    if fresh {
                        model.push(k);
                    }
                }
                SetOp::InsertPromote(k) => {
                    s.insert_and_move_to_back(k);
                    model.retain(|&x| x != k);
                    model.push(k);
                }
                SetOp::Remove(k) => {
                    prop_assert_eq!(s.remove(&k), model.contains(&k));
                    model.retain(|&x| x != k);
                }
                SetOp::PopFirst => {
                    let want = if model.is_empty() { None } else { Some(model.remove(0)) };
                    prop_assert_eq!(s.pop_first(), want);
                }
                SetOp::PopLast => {
                    prop_assert_eq!(s.pop_last(), model.pop());
                }
            }
        }
        prop_assert_eq!(s.iter().copied().collect::<Vec<_>>(), model);
    }
}
