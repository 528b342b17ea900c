use crate::isa::{Opcode, Word};
use crate::Error;

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Mul,
}

impl AluOp {
    pub fn from_opcode(op: Opcode) -> Result<AluOp, Error> {
        match op {
            Opcode::ADD => Ok(AluOp::Add),
            Opcode::MUL => Ok(AluOp::Mul),
            other => Err(Error::UnsupportedAluOperation(other)),
        }
    }

    /// Results wrap modulo 256.
    pub fn apply(self, a: Word, b: Word) -> Word {
        match self {
            AluOp::Add => a.wrapping_add(b),
            AluOp::Mul => a.wrapping_mul(b),
        }
    }

    pub fn brief(&self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Mul => "MUL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_for_every_pair() {
        for a in 0..=Word::MAX {
            for b in 0..=Word::MAX {
                let (x, y) = (a as u32, b as u32);
                assert_eq!(AluOp::Add.apply(a, b) as u32, (x + y) % 256);
                assert_eq!(AluOp::Mul.apply(a, b) as u32, (x * y) % 256);
            }
        }
    }

    #[test]
    fn only_arithmetic_opcodes_map() {
        assert_eq!(AluOp::from_opcode(Opcode::ADD).unwrap(), AluOp::Add);
        assert_eq!(AluOp::from_opcode(Opcode::MUL).unwrap().brief(), "MUL");
        for op in [Opcode::CMP, Opcode::LDI, Opcode::HLT] {
            assert!(matches!(
                AluOp::from_opcode(op),
                Err(Error::UnsupportedAluOperation(o)) if o == op
            ));
        }
    }
}
