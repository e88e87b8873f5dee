//! RAW hazard detection between DECODE and the stages ahead of it.
//!
//! WB is never inspected: the register file is written in the first half of a
//! cycle and read in the second, so a producer in WB is visible to DECODE.
//!
//! Stall policy, by distance of the producer from DECODE:
//!
//! | producer in | forwarding off       | forwarding on        |
//! |-------------|----------------------|----------------------|
//! | EXEC        | always stall         | stall if LW/SW       |
//! | MEM         | stall if LW/SW       | never stall          |

use crate::insts::{Inst, Opcode, RegId};

use super::stage::{Stage, StageSlot, NUM_STAGES};

/// A data hazard that forces DECODE to stall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataHazard {
    /// Stage holding the producer.
    pub stage: Stage,
    pub producer: Opcode,
    pub reg: RegId,
}

/// Decide whether the instruction in DECODE must stall this cycle.
///
/// `slots` must hold the contents from before the clock edge.
pub fn detect(slots: &[StageSlot; NUM_STAGES], forwarding: bool) -> Option<DataHazard> {
    let decode = slots[Stage::Decode.index()].occupant()?;
    if decode.is_bubble() {
        return None;
    }

    for stage in [Stage::Exec, Stage::Mem] {
        let Some(producer) = slots[stage.index()].occupant() else {
            continue;
        };
        if producer.is_bubble() {
            continue;
        }
        let Some(reg) = raw_dependency(decode, producer) else {
            continue;
        };
        if must_stall(stage, producer.op(), forwarding) {
            return Some(DataHazard {
                stage,
                producer: producer.op(),
                reg,
            });
        }
    }

    None
}

/// The register `producer` writes that `consumer` reads, if any.
fn raw_dependency(consumer: &Inst, producer: &Inst) -> Option<RegId> {
    producer.rd().filter(|&rd| consumer.reads(rd))
}

fn must_stall(stage: Stage, producer: Opcode, forwarding: bool) -> bool {
    match stage {
        Stage::Exec if forwarding => producer.is_mem_access(),
        Stage::Exec => true,
        Stage::Mem if forwarding => false,
        Stage::Mem => producer.is_mem_access(),
        Stage::Fetch | Stage::Decode | Stage::Wb => unreachable!("no producer check in {stage}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn slots(decode: Inst, exec: Inst, mem: Inst, wb: Inst) -> [StageSlot; NUM_STAGES] {
        let mut slots = Stage::ALL.map(StageSlot::new);
        slots[Stage::Decode.index()].set_occupant(decode);
        slots[Stage::Exec.index()].set_occupant(exec);
        slots[Stage::Mem.index()].set_occupant(mem);
        slots[Stage::Wb.index()].set_occupant(wb);
        slots
    }

    fn add(rd: RegId, rs1: RegId, rs2: RegId) -> Inst {
        Inst::alu(Opcode::Add, rd, rs1, rs2)
    }

    #[test]
    fn bubble_in_decode_never_stalls() {
        let s = slots(Inst::nop(), add(3, 1, 2), Inst::lw(3, 4), Inst::nop());
        assert!(detect(&s, false).is_none());
        assert!(detect(&s, true).is_none());
    }

    #[test]
    fn exec_alu_producer_stalls() {
        let s = slots(add(4, 3, 5), add(3, 1, 2), Inst::nop(), Inst::nop());
        assert_eq!(
            detect(&s, false),
            Some(DataHazard {
                stage: Stage::Exec,
                producer: Opcode::Add,
                reg: 3
            })
        );
    }

    #[test]
    fn exec_match_on_second_source() {
        let s = slots(Inst::sw(6, 3), add(3, 1, 2), Inst::nop(), Inst::nop());
        assert!(detect(&s, false).is_some());
    }

    #[test]
    fn mem_alu_producer_is_bypassed() {
        let s = slots(add(4, 3, 5), Inst::nop(), add(3, 1, 2), Inst::nop());
        assert!(detect(&s, false).is_none());
    }

    #[test]
    fn mem_load_producer_stalls() {
        let s = slots(add(4, 3, 5), Inst::nop(), Inst::lw(3, 1), Inst::nop());
        assert_eq!(
            detect(&s, false),
            Some(DataHazard {
                stage: Stage::Mem,
                producer: Opcode::Lw,
                reg: 3
            })
        );
    }

    #[test]
    fn wb_is_ignored() {
        let s = slots(add(4, 3, 5), Inst::nop(), Inst::nop(), Inst::lw(3, 1));
        assert!(detect(&s, false).is_none());
    }

    #[test]
    fn no_destination_no_hazard() {
        let s = slots(add(4, 3, 5), Inst::sw(3, 3), Inst::bne(3, 5), Inst::nop());
        assert!(detect(&s, false).is_none());
    }

    #[test]
    fn empty_slots_are_skipped() {
        let mut s = slots(add(4, 3, 5), Inst::nop(), Inst::lw(3, 1), Inst::nop());
        s[Stage::Exec.index()].clear();
        assert!(detect(&s, false).is_some());
        s[Stage::Decode.index()].clear();
        assert!(detect(&s, false).is_none());
    }

    #[test]
    fn exec_checked_before_mem() {
        let s = slots(add(4, 3, 5), add(5, 1, 2), Inst::lw(3, 1), Inst::nop());
        assert_eq!(detect(&s, false).map(|h| h.stage), Some(Stage::Exec));
    }

    #[test]
    fn forwarding_bypasses_alu_in_exec() {
        let s = slots(add(4, 3, 5), add(3, 1, 2), Inst::nop(), Inst::nop());
        assert!(detect(&s, true).is_none());
    }

    #[test]
    fn forwarding_still_stalls_load_use() {
        let s = slots(add(4, 3, 5), Inst::lw(3, 1), Inst::nop(), Inst::nop());
        assert!(detect(&s, true).is_some());
    }

    #[test]
    fn forwarding_bypasses_load_in_mem() {
        let s = slots(add(4, 3, 5), Inst::nop(), Inst::lw(3, 1), Inst::nop());
        assert!(detect(&s, true).is_none());
    }

    #[test]
    fn search_continues_past_unrelated_exec() {
        let s = slots(add(4, 3, 5), add(6, 1, 2), Inst::lw(3, 1), Inst::nop());
        assert_eq!(
            detect(&s, false),
            Some(DataHazard {
                stage: Stage::Mem,
                producer: Opcode::Lw,
                reg: 3
            })
        );
    }

    #[test]
    fn forwarding_bypassed_exec_does_not_end_search() {
        // EXEC matches but is bypassed; MEM is checked next and is bypassed too.
        let s = slots(add(4, 3, 5), add(3, 1, 2), Inst::lw(3, 1), Inst::nop());
        assert!(detect(&s, true).is_none());
        let s = slots(add(4, 3, 5), add(3, 1, 2), Inst::lw(5, 1), Inst::nop());
        assert!(detect(&s, true).is_none());
        assert_eq!(detect(&s, false).map(|h| h.stage), Some(Stage::Exec));
    }
}
