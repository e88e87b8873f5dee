use log::{debug, info, trace, warn};

use crate::{app::Application, insts::Inst};

use super::{
    debug::CycleRecord,
    hazard::detect,
    stage::{Stage, StageSlot, NUM_STAGES},
};

pub struct Pipeline<'a> {
    // clock
    clock: u64,

    // whether EX->EX and MEM->EX bypass paths exist
    forwarding: bool,

    // IF, ID, EXEC, MEM, WB
    slots: [StageSlot; NUM_STAGES],

    // Reference to the instruction source
    app: &'a mut Application,

    // Bubbles injected because of data hazards
    stalls: u64,

    // Whether the last clock stalled
    stalled: bool,
}

/// Result of running a pipeline until it drains.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// One record per cycle, starting with cycle 0.
    pub trace: Vec<CycleRecord>,
    /// Cycles needed to retire the program, excluding the final empty cycle.
    pub cycles: u64,
    /// False if the run hit its cycle bound first.
    pub drained: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(app: &'a mut Application, forwarding: bool) -> Pipeline<'a> {
        Pipeline {
            clock: 0,
            forwarding,
            slots: Stage::ALL.map(StageSlot::new),
            app,
            stalls: 0,
            stalled: false,
        }
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn forwarding(&self) -> bool {
        self.forwarding
    }

    pub fn stalls(&self) -> u64 {
        self.stalls
    }

    pub fn slot(&self, stage: Stage) -> &StageSlot {
        &self.slots[stage.index()]
    }

    /// Advance one clock.
    ///
    /// Every decision reads the slot contents from before the edge. Slots are
    /// written back to front so that no move overwrites a value a later move
    /// still has to read.
    pub fn cycle(&mut self) {
        self.clock += 1;
        debug!(
            "#################### CLOCK: {} ####################",
            self.clock
        );

        let hazard = detect(&self.slots, self.forwarding);
        self.stalled = hazard.is_some();

        // MEM -> WB
        let retired = self.take(Stage::Mem);
        self.put(Stage::Wb, retired);

        // EXEC -> MEM
        let exec = self.take(Stage::Exec);
        self.put(Stage::Mem, exec);

        // DECODE -> EXEC, or a bubble while DECODE and FETCH hold their place
        if let Some(hazard) = hazard {
            warn!(
                "Data hazard detected: {} in {} writes r{}",
                hazard.producer.mnemonic(),
                hazard.stage,
                hazard.reg
            );
            warn!("  Stall 1 cycle");
            self.stalls += 1;
            self.put(Stage::Exec, Default::default());
            self.log_stages();
            return;
        }
        let decode = self.take(Stage::Decode);
        self.put(Stage::Exec, decode);

        // FETCH -> DECODE
        let fetch = self.take(Stage::Fetch);
        self.put(Stage::Decode, fetch);

        // Fetch
        let next = self.app.next_inst();
        self.put(Stage::Fetch, next);

        self.log_stages();
    }

    /// True once every stage holds a bubble.
    pub fn done(&self) -> bool {
        self.slots.iter().all(StageSlot::holds_bubble)
    }

    pub fn snapshot(&self) -> CycleRecord {
        CycleRecord {
            cycle: self.clock,
            stages: Stage::ALL.map(|stage| self.slot(stage).describe()),
            stalled: self.stalled,
        }
    }

    /// Clock the pipeline until it drains, or until `max_cycles` clocks have
    /// elapsed.
    pub fn run(&mut self, max_cycles: Option<u64>) -> RunSummary {
        let mut trace = vec![self.snapshot()];
        let mut drained = false;

        loop {
            if max_cycles.is_some_and(|n| self.clock >= n) {
                warn!("Cycle bound {} reached before the pipeline drained", self.clock);
                break;
            }
            self.cycle();
            trace.push(self.snapshot());
            if self.done() {
                drained = true;
                break;
            }
        }

        let cycles = self.clock.saturating_sub(1);
        if drained {
            info!("Completed in {cycles} cycles, {} stall(s)", self.stalls);
        }

        RunSummary {
            trace,
            cycles,
            drained,
        }
    }

    fn take(&mut self, stage: Stage) -> Inst {
        self.slots[stage.index()].take().unwrap_or_default()
    }

    fn put(&mut self, stage: Stage, inst: Inst) {
        self.slots[stage.index()].set_occupant(inst);
    }

    fn log_stages(&self) {
        for slot in &self.slots {
            let inst = slot.describe();
            let stage = inst.stage().unwrap_or(slot.stage());
            trace!("{:<4}: {}", stage.name(), inst);
        }
    }
}
