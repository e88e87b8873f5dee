//! Instruction definition

use std::fmt::Display;

use crate::pipeline::stage::Stage;

/// Architectural register index.
pub type RegId = u8;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mult,
    Div,
    Lw,
    Sw,
    Bne,
    Nop,
}

impl Opcode {
    /// Resolve a mnemonic. Unknown mnemonics yield [`None`].
    pub fn from_mnemonic(s: &str) -> Option<Opcode> {
        use Opcode::*;
        let op = match s {
            "ADD" => Add,
            "SUB" => Sub,
            "MULT" => Mult,
            "DIV" => Div,
            "LW" => Lw,
            "SW" => Sw,
            "BNE" => Bne,
            "NOP" => Nop,
            _ => return None,
        };
        Some(op)
    }

    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Add => "ADD",
            Sub => "SUB",
            Mult => "MULT",
            Div => "DIV",
            Lw => "LW",
            Sw => "SW",
            Bne => "BNE",
            Nop => "NOP",
        }
    }

    /// Memory access instructions deliver their result one stage later than
    /// the ALU class.
    pub fn is_mem_access(self) -> bool {
        matches!(self, Opcode::Lw | Opcode::Sw)
    }

    pub fn is_alu(self) -> bool {
        matches!(self, Opcode::Add | Opcode::Sub | Opcode::Mult | Opcode::Div)
    }

    /// Number of register operands written in program text.
    pub fn operand_count(self) -> usize {
        use Opcode::*;
        match self {
            Add | Sub | Mult | Div => 3,
            Lw | Sw | Bne => 2,
            Nop => 0,
        }
    }
}

/// One instruction record.
///
/// Operand fields are fixed at construction; only the display stage tag is
/// stamped later by the slot that holds the instruction. Equality ignores
/// the stage tag.
#[derive(Debug, Clone, Copy)]
pub struct Inst {
    op: Opcode,
    rd: Option<RegId>,
    rs1: Option<RegId>,
    rs2: Option<RegId>,
    stage: Option<Stage>,
}

impl PartialEq for Inst {
    fn eq(&self, other: &Self) -> bool {
        self.op == other.op && self.rd == other.rd && self.rs1 == other.rs1 && self.rs2 == other.rs2
    }
}

impl Eq for Inst {}

impl Default for Inst {
    fn default() -> Self {
        Self::nop()
    }
}

impl Inst {
    /// A bubble.
    pub fn nop() -> Inst {
        Inst {
            op: Opcode::Nop,
            rd: None,
            rs1: None,
            rs2: None,
            stage: None,
        }
    }

    /// ADD/SUB/MULT/DIV: `rd <- rs1 op rs2`.
    pub fn alu(op: Opcode, rd: RegId, rs1: RegId, rs2: RegId) -> Inst {
        debug_assert!(op.is_alu(), "{op:?} is not an ALU instruction");
        Inst {
            op,
            rd: Some(rd),
            rs1: Some(rs1),
            rs2: Some(rs2),
            stage: None,
        }
    }

    pub fn lw(rd: RegId, rs1: RegId) -> Inst {
        Inst {
            op: Opcode::Lw,
            rd: Some(rd),
            rs1: Some(rs1),
            rs2: None,
            stage: None,
        }
    }

    pub fn sw(rs1: RegId, rs2: RegId) -> Inst {
        Inst {
            op: Opcode::Sw,
            rd: None,
            rs1: Some(rs1),
            rs2: Some(rs2),
            stage: None,
        }
    }

    pub fn bne(rs1: RegId, rs2: RegId) -> Inst {
        Inst {
            op: Opcode::Bne,
            rd: None,
            rs1: Some(rs1),
            rs2: Some(rs2),
            stage: None,
        }
    }

    /// Build from operands in the order they appear in program text.
    ///
    /// Returns [`None`] if `operands` does not match
    /// [`Opcode::operand_count`]. SW and BNE have no destination: their two
    /// textual operands become `rs1` and `rs2`.
    pub fn from_operands(op: Opcode, operands: &[RegId]) -> Option<Inst> {
        use Opcode::*;
        if operands.len() != op.operand_count() {
            return None;
        }
        let inst = match op {
            Add | Sub | Mult | Div => Inst::alu(op, operands[0], operands[1], operands[2]),
            Lw => Inst::lw(operands[0], operands[1]),
            Sw => Inst::sw(operands[0], operands[1]),
            Bne => Inst::bne(operands[0], operands[1]),
            Nop => Inst::nop(),
        };
        Some(inst)
    }

    pub fn op(&self) -> Opcode {
        self.op
    }

    pub fn rd(&self) -> Option<RegId> {
        self.rd
    }

    pub fn rs1(&self) -> Option<RegId> {
        self.rs1
    }

    pub fn rs2(&self) -> Option<RegId> {
        self.rs2
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    pub fn is_bubble(&self) -> bool {
        self.op == Opcode::Nop
    }

    /// Whether this instruction reads register `reg`.
    pub fn reads(&self, reg: RegId) -> bool {
        self.rs1() == Some(reg) || self.rs2() == Some(reg)
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = Some(stage);
    }
}

fn reg(r: Option<RegId>) -> String {
    match r {
        Some(r) => format!("r{r}"),
        None => "r?".to_string(),
    }
}

impl Display for Inst {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.op.mnemonic();
        match self.op {
            Opcode::Nop => write!(f, "{name}         "),
            Opcode::Sw | Opcode::Bne => write!(f, "{name} {} {}", reg(self.rs1()), reg(self.rs2())),
            Opcode::Lw => write!(f, "{name} {} {}", reg(self.rd()), reg(self.rs1())),
            _ => write!(
                f,
                "{name} {} {} {}",
                reg(self.rd()),
                reg(self.rs1()),
                reg(self.rs2())
            ),
        }
    }
}
