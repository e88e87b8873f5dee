use std::fmt::Display;

use crate::insts::Inst;

pub const NUM_STAGES: usize = 5;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub enum Stage {
    Fetch = 0,
    Decode = 1,
    Exec = 2,
    Mem = 3,
    Wb = 4,
}

impl Stage {
    /// All stages in pipeline order.
    pub const ALL: [Stage; NUM_STAGES] = [
        Stage::Fetch,
        Stage::Decode,
        Stage::Exec,
        Stage::Mem,
        Stage::Wb,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name used in trace headers and logs.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Fetch => "IF",
            Stage::Decode => "ID",
            Stage::Exec => "EXEC",
            Stage::Mem => "MEM",
            Stage::Wb => "WB",
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One pipeline position and the instruction it holds this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSlot {
    stage: Stage,
    inst: Option<Inst>,
}

impl StageSlot {
    /// A slot holding a bubble.
    pub fn new(stage: Stage) -> StageSlot {
        let mut slot = StageSlot { stage, inst: None };
        slot.set_occupant(Inst::nop());
        slot
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Install `inst`, stamping its stage tag.
    pub fn set_occupant(&mut self, mut inst: Inst) {
        inst.set_stage(self.stage);
        self.inst = Some(inst);
    }

    pub fn clear(&mut self) {
        self.inst = None;
    }

    /// Move the occupant out, leaving the slot empty.
    pub fn take(&mut self) -> Option<Inst> {
        let inst = self.inst;
        self.clear();
        inst
    }

    pub fn occupant(&self) -> Option<&Inst> {
        self.inst.as_ref()
    }

    /// Empty slots are not bubbles.
    pub fn holds_bubble(&self) -> bool {
        self.inst.is_some_and(|inst| inst.is_bubble())
    }

    /// The occupant as a trace descriptor. An empty slot reads as a bubble.
    pub fn describe(&self) -> Inst {
        self.inst.unwrap_or_default()
    }
}
