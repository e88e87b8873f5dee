use std::{fs, path::Path};

use log::{info, warn};

use crate::{error::Result, insts::Inst, parse::parse_program};

/// The instruction source: a loaded program and its fetch cursor.
#[derive(Debug, Default)]
pub struct Application {
    insts: Vec<Inst>,
    pc: usize,
}

impl Application {
    pub fn new(insts: Vec<Inst>) -> Application {
        Application { insts, pc: 0 }
    }

    /// Load and parse a program file.
    pub fn load(path: &Path) -> Result<Application> {
        let src = fs::read_to_string(path)?;
        let app = Application::from_source(&src)?;
        if app.is_empty() {
            warn!("{} holds no instructions", path.display());
        }
        info!("Read file completed: {} instruction(s)", app.len());
        for inst in &app.insts {
            info!("  {inst}");
        }
        Ok(app)
    }

    pub fn from_source(src: &str) -> Result<Application> {
        Ok(Application::new(parse_program(src)?))
    }

    /// Next program instruction, or a fresh bubble once the program is
    /// exhausted.
    pub fn next_inst(&mut self) -> Inst {
        match self.insts.get(self.pc) {
            Some(inst) => {
                self.pc += 1;
                *inst
            }
            None => Inst::nop(),
        }
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::insts::Opcode;

    #[test]
    fn yields_program_then_bubbles() {
        let mut app = Application::new(vec![Inst::lw(1, 2), Inst::alu(Opcode::Add, 3, 1, 4)]);
        assert_eq!(app.next_inst(), Inst::lw(1, 2));
        assert_eq!(app.next_inst(), Inst::alu(Opcode::Add, 3, 1, 4));
        for _ in 0..3 {
            assert!(app.next_inst().is_bubble());
        }
        assert_eq!(app.len(), 2);
    }

    #[test]
    fn empty_program() {
        let mut app = Application::from_source("").unwrap();
        assert!(app.is_empty());
        assert!(app.next_inst().is_bubble());
    }

    #[test]
    fn load_missing_file() {
        let err = Application::load(Path::new("/nonexistent/program.txt")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
