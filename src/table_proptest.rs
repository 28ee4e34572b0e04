//! Property tests: the raw table against reference models.
//!
//! Three models cover the three contracts: a `std::collections::HashMap`
//! for associative behavior (also driven under a worst-case all-collisions
//! hasher), an ordered `Vec` for the linked variant's iteration order, and
//! the cursor sweep checked for exactly-once service while removals shift
//! entries underneath it.

use crate::linkage::{InsertOrder, Linkage, Unordered};
use crate::table::RawTable;
use crate::test_hashers::ConstBuildHasher;
use proptest::prelude::*;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeSet, HashMap};
use std::hash::BuildHasher;

#[derive(Debug, Clone)]
enum Op {
    Insert(u8, u16),
    Remove(u8),
    Mutate(u8, u16),
    /// Cursor sweep removing every key divisible by the modulus.
    Sweep(u8),
    Clear,
    Trim,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0u8..32, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
        4 => (0u8..32).prop_map(Op::Remove),
        3 => (0u8..32, any::<u16>()).prop_map(|(k, v)| Op::Mutate(k, v)),
        2 => (2u8..6).prop_map(Op::Sweep),
        1 => Just(Op::Clear),
        1 => Just(Op::Trim),
    ]
}

/// Drive the table and a std HashMap through the same operations; their
/// observable behavior must never diverge.
fn check_against_model<S: BuildHasher>(ops: &[Op], hasher: S) {
    let mut table: RawTable<u8, u16, S, Unordered> = RawTable::with_hasher(hasher);
    let mut model: HashMap<u8, u16> = HashMap::new();

    for op in ops {
        match *op {
            Op::Insert(k, v) => {
                let (_, old) = table.insert(k, v);
                assert_eq!(old, model.insert(k, v));
            }
            Op::Remove(k) => {
                assert_eq!(table.remove(&k), model.remove(&k).map(|v| (k, v)));
            }
            Op::Mutate(k, v) => {
                match (table.find(&k), model.get_mut(&k)) {
                    (Some(idx), Some(slot)) => {
                        *table.value_at_mut(idx) = v;
                        *slot = v;
                    }
                    (None, None) => {}
                    (t, m) => panic!("presence diverged for {k}: {t:?} vs {}", m.is_some()),
                }
            }
            Op::Sweep(m) => {
                let mut cur = table.cursor();
                let mut served = Vec::new();
                while let Some(idx) = cur.advance(&table).unwrap() {
                    let k = *table.key_at(idx);
                    served.push(k);
                    if k % m == 0 {
                        cur.remove_current(&mut table).unwrap();
                    }
                }
                assert_eq!(served.len(), model.len(), "sweep served every entry once");
                assert_eq!(
                    served.iter().collect::<BTreeSet<_>>().len(),
                    served.len(),
                    "sweep repeated an entry"
                );
                model.retain(|k, _| k % m != 0);
            }
            Op::Clear => {
                table.clear();
                model.clear();
            }
            Op::Trim => {
                table.trim();
            }
        }
        assert_eq!(table.len(), model.len());
    }

    for (k, v) in &model {
        let idx = table.find(k).expect("model key present in table");
        assert_eq!(table.value_at(idx), v);
    }
    for k in 0u8..32 {
        assert_eq!(table.find(&k).is_some(), model.contains_key(&k));
    }
}

#[derive(Debug, Clone)]
enum LinkedOp {
    Insert(u8, u16),
    Remove(u8),
    PopFirst,
    PopLast,
    MoveToBack(u8),
    MoveToFront(u8),
}

fn arb_linked_op() -> impl Strategy<Value = LinkedOp> {
    prop_oneof![
        8 => (0u8..24, any::<u16>()).prop_map(|(k, v)| LinkedOp::Insert(k, v)),
        3 => (0u8..24).prop_map(LinkedOp::Remove),
        2 => Just(LinkedOp::PopFirst),
        2 => Just(LinkedOp::PopLast),
        2 => (0u8..24).prop_map(LinkedOp::MoveToBack),
        2 => (0u8..24).prop_map(LinkedOp::MoveToFront),
    ]
}

fn linked_order<S: BuildHasher>(t: &RawTable<u8, u16, S, InsertOrder>) -> Vec<(u8, u16)> {
    let mut out = Vec::new();
    let mut at = t.first();
    while let Some(i) = at {
        out.push((*t.key_at(i), *t.value_at(i)));
        at = t.links().next_of(i);
    }
    out
}

/// Drive the linked table and an order-preserving Vec model; the order
/// chain must track the model exactly through shifts, growth, and
/// promotion.
fn check_linked_against_model<S: BuildHasher>(ops: &[LinkedOp], hasher: S) {
    let mut table: RawTable<u8, u16, S, InsertOrder> = RawTable::with_hasher(hasher);
    let mut model: Vec<(u8, u16)> = Vec::new();

    for op in ops {
        match *op {
            LinkedOp::Insert(k, v) => {
                table.insert(k, v);
                match model.iter_mut().find(|(mk, _)| *mk == k) {
                    // Overwrite updates in place and must not reorder.
                    Some(slot) => slot.1 = v,
                    None => model.push((k, v)),
                }
            }
            LinkedOp::Remove(k) => {
                let removed = table.remove(&k);
                let pos = model.iter().position(|(mk, _)| *mk == k);
                assert_eq!(removed, pos.map(|p| model.remove(p)));
            }
            LinkedOp::PopFirst => {
                let got = table.first().map(|i| table.remove_at(i));
                let want = if model.is_empty() { None } else { Some(model.remove(0)) };
                assert_eq!(got, want);
            }
            LinkedOp::PopLast => {
                let got = table.last().map(|i| table.remove_at(i));
                assert_eq!(got, model.pop());
            }
            LinkedOp::MoveToBack(k) => {
                if let Some(idx) = table.find(&k) {
                    table.move_to_back(idx);
                    let p = model.iter().position(|(mk, _)| *mk == k).unwrap();
                    let e = model.remove(p);
                    model.push(e);
                }
            }
            LinkedOp::MoveToFront(k) => {
                if let Some(idx) = table.find(&k) {
                    table.move_to_front(idx);
                    let p = model.iter().position(|(mk, _)| *mk == k).unwrap();
                    let e = model.remove(p);
                    model.insert(0, e);
                }
            }
        }
        assert_eq!(table.len(), model.len());
    }

    assert_eq!(linked_order(&table), model);
}

proptest! {
    /// The table behaves like HashMap under any operation sequence.
    #[test]
    fn matches_hashmap_model(ops in prop::collection::vec(arb_op(), 1..200)) {
        check_against_model(&ops, RandomState::new());
    }

    /// Same, with every key hashing to one bucket: the entire table is a
    /// single probe chain and every removal shifts.
    #[test]
    fn matches_hashmap_model_under_total_collision(
        ops in prop::collection::vec(arb_op(), 1..120),
    ) {
        check_against_model(&ops, ConstBuildHasher);
    }

    /// The linked table's order chain tracks an order-preserving model.
    #[test]
    fn linked_matches_vec_model(ops in prop::collection::vec(arb_linked_op(), 1..200)) {
        check_linked_against_model(&ops, RandomState::new());
    }

    /// Order under maximal shifting: all collisions, every removal moves
    /// slots, the chain must never notice.
    #[test]
    fn linked_model_under_total_collision(
        ops in prop::collection::vec(arb_linked_op(), 1..120),
    ) {
        check_linked_against_model(&ops, ConstBuildHasher);
    }
}
