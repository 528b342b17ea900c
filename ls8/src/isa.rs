use crate::Error;

pub type Reg = usize; // operand bytes index the register file
pub type Word = u8;

/// Opcode byte layout is `AABCDDDD`: `AA` operand count, `B` ALU, `C` sets PC.
const OPERANDS_SHIFT: u8 = 6;
const ALU_BIT: u8 = 0b0010_0000;
const SETS_PC_BIT: u8 = 0b0001_0000;

#[allow(clippy::upper_case_acronyms)]
#[repr(u8)]
#[derive(
    Debug,
    Hash,
    Clone,
    Copy,
    PartialEq,
    Eq,
    enum_utils::TryFromRepr,
    enum_utils::IterVariants,
    enum_utils::FromStr,
)]
pub enum Opcode {
    HLT = 0b0000_0001,
    LDI = 0b1000_0010,
    PRN = 0b0100_0111,
    ADD = 0b1010_0000,
    MUL = 0b1010_0010,
    PUSH = 0b0100_0101,
    POP = 0b0100_0110,
    CALL = 0b0101_0000,
    RET = 0b0001_0001,
    CMP = 0b1010_0111,
    JMP = 0b0101_0100,
    JEQ = 0b0101_0101,
    JNE = 0b0101_0110,
}

impl Opcode {
    pub fn all() -> impl Iterator<Item = Opcode> {
        Opcode::iter()
    }

    pub fn from_u8(val: u8) -> Option<Opcode> {
        Opcode::try_from(val).ok()
    }

    pub fn operand_count(self) -> usize {
        (self as u8 >> OPERANDS_SHIFT) as usize
    }

    pub fn is_alu(self) -> bool {
        self as u8 & ALU_BIT != 0
    }

    pub fn sets_pc(self) -> bool {
        self as u8 & SETS_PC_BIT != 0
    }

    /// Instruction length in bytes, opcode included.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(self) -> usize {
        self.operand_count() + 1
    }

    pub fn brief(self) -> &'static str {
        use Opcode::*;
        match self {
            HLT => "HLT",
            LDI => "LDI",
            PRN => "PRN",
            ADD => "ADD",
            MUL => "MUL",
            PUSH => "PUSH",
            POP => "POP",
            CALL => "CALL",
            RET => "RET",
            CMP => "CMP",
            JMP => "JMP",
            JEQ => "JEQ",
            JNE => "JNE",
        }
    }
}

/// A decoded instruction: the opcode plus however many operand bytes it takes.
#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub struct Insn {
    pub opcode: Opcode,
    operands: [Word; 2],
}

impl std::fmt::Display for Insn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_asm())
    }
}

impl Insn {
    pub fn new(opcode: Opcode, operands: &[Word]) -> Insn {
        let mut buf = [0; 2];
        let n = opcode.operand_count().min(operands.len());
        buf[..n].copy_from_slice(&operands[..n]);
        Insn {
            opcode,
            operands: buf,
        }
    }

    /// Decodes the instruction at the start of `bytes`. Returns `None` for an
    /// unknown opcode or when the operands run past the end of the slice.
    pub fn decode(bytes: &[Word]) -> Option<Insn> {
        let opcode = Opcode::from_u8(*bytes.first()?)?;
        let operands = bytes.get(1..opcode.len())?;
        Some(Insn::new(opcode, operands))
    }

    /// Reads the instruction at `pc`.
    pub fn fetch(memory: &[Word], pc: usize) -> Result<Insn, Error> {
        let size = memory.len();
        let opcode = *memory
            .get(pc)
            .ok_or(Error::AddressOutOfRange { address: pc, size })?;
        let op = Opcode::from_u8(opcode).ok_or(Error::InvalidOpcode { opcode, pc })?;
        let operands = memory
            .get(pc + 1..pc + op.len())
            .ok_or(Error::AddressOutOfRange { address: size, size })?;
        Ok(Insn::new(op, operands))
    }

    pub fn encode(&self) -> Vec<Word> {
        let mut out = vec![self.opcode as Word];
        out.extend_from_slice(self.operands());
        out
    }

    pub fn operands(&self) -> &[Word] {
        &self.operands[..self.opcode.operand_count()]
    }

    pub fn to_asm(&self) -> String {
        let brief = self.opcode.brief();
        match (self.opcode, self.operands()) {
            (Opcode::LDI, [reg, imm]) => format!("{} R{}, {}", brief, reg, imm),
            (_, [a, b]) => format!("{} R{}, R{}", brief, a, b),
            (_, [a]) => format!("{} R{}", brief, a),
            _ => brief.to_string(),
        }
    }
}

/// One `addr: asm` line per instruction. Bytes that do not start a whole
/// instruction are listed as `.BYTE`.
pub fn disassemble(program: &[Word]) -> Vec<String> {
    let mut lines = vec![];
    let mut addr = 0;
    while addr < program.len() {
        match Insn::decode(&program[addr..]) {
            Some(insn) => {
                lines.push(format!("{:02x}: {}", addr, insn));
                addr += insn.opcode.len();
            }
            None => {
                lines.push(format!("{:02x}: .BYTE {:#010b}", addr, program[addr]));
                addr += 1;
            }
        }
    }
    lines
}
