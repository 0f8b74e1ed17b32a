//! Local variable round trips.

use std::ops::Range;

use crate::disassembler::{InstrIdx, MethodBody, OpCategory};

/// The nearest store to the local slot read by the load at `load`.
///
/// Scans strictly backward from the instruction before `load` and returns the
/// first `stloc` whose slot index equals the load's. Later stores shadow earlier
/// ones. Returns `None` if `load` is not a local load or no store precedes it.
///
/// The scan is purely positional: it does not look at branches or at
/// [`address_taken`] writes, so a caller that needs straight-line semantics has to
/// check the path between the store and the load itself.
#[must_use]
pub fn find_store(body: &MethodBody, load: InstrIdx) -> Option<InstrIdx> {
    let instr = body.get(load)?;
    if instr.category != OpCategory::LoadLocal {
        return None;
    }
    let slot = instr.local_index()?;

    (0..load).rev().find(|&index| {
        body.get(index).is_some_and(|candidate| {
            candidate.category == OpCategory::StoreLocal && candidate.local_index() == Some(slot)
        })
    })
}

/// Returns true if an instruction in `range` takes the address of `slot`.
///
/// A `ref` or `out` argument can overwrite the local behind the scan's back,
/// so a store found by [`find_store`] is only trusted when this is false for
/// the instructions between it and the load.
#[must_use]
pub fn address_taken(body: &MethodBody, slot: u16, range: Range<InstrIdx>) -> bool {
    range
        .filter_map(|index| body.get(index))
        .any(|instr| instr.address_of_local() == Some(slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::BodyBuilder;

    #[test]
    fn nearest_store_wins() {
        let body = BodyBuilder::new()
            .local("System.String")
            .local("System.String")
            .ldstr("first")
            .stloc(0)
            .ldstr("other")
            .stloc(1)
            .ldstr("second")
            .stloc(0)
            .ldloc(0)
            .build()
            .unwrap();

        assert_eq!(find_store(&body, 6), Some(5));
    }

    #[test]
    fn matches_on_slot_not_encoding() {
        // stloc.s 4 and ldloc 4 use different encodings of the same slot
        let body = BodyBuilder::new()
            .ldstr("text")
            .stloc(4)
            .nop()
            .raw(
                crate::disassembler::opcodes::FE_PREFIX,
                crate::disassembler::opcodes::FE_LDLOC,
                crate::disassembler::Operand::Local(4),
            )
            .build()
            .unwrap();

        assert_eq!(body.get(1).unwrap().mnemonic, "stloc.s");
        assert_eq!(find_store(&body, 3), Some(1));
    }

    #[test]
    fn no_store() {
        let body = BodyBuilder::new()
            .ldstr("text")
            .stloc(1)
            .ldloc(0)
            .build()
            .unwrap();

        assert_eq!(find_store(&body, 2), None);
        // Stores after the load are never considered
        let later = BodyBuilder::new().ldloc(0).ldstr("x").stloc(0).build().unwrap();
        assert_eq!(find_store(&later, 0), None);
    }

    #[test]
    fn address_taken_between_store_and_load() {
        let body = BodyBuilder::new()
            .ldstr("text")
            .stloc(0)
            .ldloca(1)
            .pop()
            .ldloca(300)
            .pop()
            .ldloca(0)
            .pop()
            .ldloc(0)
            .build()
            .unwrap();

        assert_eq!(find_store(&body, 8), Some(1));
        assert!(!address_taken(&body, 0, 2..6));
        assert!(address_taken(&body, 300, 2..6));
        assert!(address_taken(&body, 0, 2..8));
        // The store itself does not count
        assert!(!address_taken(&body, 0, 0..2));
    }

    #[test]
    fn not_a_load() {
        let body = BodyBuilder::new().ldstr("x").stloc(0).build().unwrap();
        assert_eq!(find_store(&body, 0), None);
        assert_eq!(find_store(&body, 1), None);
        assert_eq!(find_store(&body, 99), None);
    }
}
