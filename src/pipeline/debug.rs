use crate::insts::Inst;

use super::stage::{Stage, NUM_STAGES};

/// Occupancy of every stage at the end of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRecord {
    pub cycle: u64,
    pub stages: [Inst; NUM_STAGES],
    /// Whether a bubble was injected into EXEC during this cycle.
    pub stalled: bool,
}

impl CycleRecord {
    pub fn stage(&self, stage: Stage) -> &Inst {
        &self.stages[stage.index()]
    }
}

pub fn header() -> String {
    let mut s = String::from("Cycle");
    for (i, stage) in Stage::ALL.iter().enumerate() {
        s.push('\t');
        s.push_str(stage.name());
        if i + 1 < NUM_STAGES {
            s.push('\t');
        }
    }
    s
}

/// One trace row: the cycle number then each stage, tab separated.
pub fn pcycle(record: &CycleRecord) -> String {
    let stages: String = Stage::ALL
        .iter()
        .map(|&stage| format!("\t{}", record.stage(stage)))
        .collect();
    format!("{}{stages}", record.cycle)
}
