//! Program text parser
use log::{debug, warn};

use crate::{
    error::{Error, Result},
    insts::{Inst, Opcode, RegId},
};

/// Parse a whole program.
///
/// Parsing stops at the first blank line. Lines starting with `#` are
/// skipped.
pub fn parse_program(src: &str) -> Result<Vec<Inst>> {
    let mut insts = Vec::new();
    for (idx, line) in src.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            debug!("blank line {line_no} ends the program");
            break;
        }
        if trimmed.starts_with('#') {
            continue;
        }
        insts.push(parse_line(trimmed, line_no)?);
    }
    Ok(insts)
}

/// Parse a single non-empty line.
pub fn parse_line(line: &str, line_no: usize) -> Result<Inst> {
    let mut tokens = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());

    let Some(mnemonic) = tokens.next() else {
        return Err(parse_err(line_no, "empty instruction"));
    };

    let Some(op) = Opcode::from_mnemonic(mnemonic) else {
        warn!("line {line_no}: unknown instruction `{mnemonic}`, treated as NOP");
        return Ok(Inst::nop());
    };

    let operands = tokens
        .map(|t| parse_reg(t, line_no))
        .collect::<Result<Vec<RegId>>>()?;

    Inst::from_operands(op, &operands).ok_or_else(|| {
        parse_err(
            line_no,
            format!(
                "{} takes {} register operand(s), found {}",
                op.mnemonic(),
                op.operand_count(),
                operands.len()
            ),
        )
    })
}

/// Parse a register token `r<N>`.
fn parse_reg(token: &str, line_no: usize) -> Result<RegId> {
    let idx = token
        .strip_prefix('r')
        .or_else(|| token.strip_prefix('R'))
        .ok_or_else(|| parse_err(line_no, format!("expected register, found `{token}`")))?;
    idx.parse::<RegId>()
        .map_err(|e| parse_err(line_no, format!("bad register `{token}`: {e}")))
}

fn parse_err(line: usize, msg: impl Into<String>) -> Error {
    Error::Parse {
        line,
        msg: msg.into(),
    }
}
