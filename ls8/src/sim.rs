use comfy_table::Table;
use itertools::Itertools;
use log::{debug, log_enabled, trace, Level};
use serde::{Deserialize, Serialize};

use crate::alu::AluOp;
use crate::isa::*;
use crate::loader::LoadError;
use crate::output::Sink;
use crate::Error;

mod handlers;

pub const MEMORY_SIZE: usize = 256;
pub const REGISTERS: usize = 8;
/// R7 is the stack pointer.
pub const SP: Reg = 7;
pub const STACK_BASE: Word = 0xf4;

/// `FL` is `00000LGE`.
pub mod flags {
    use crate::isa::Word;

    pub const E: Word = 0b001;
    pub const G: Word = 0b010;
    pub const L: Word = 0b100;

    pub fn compare(a: Word, b: Word) -> Word {
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => E,
            std::cmp::Ordering::Less => L,
            std::cmp::Ordering::Greater => G,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub memory_size: usize,
    /// Initial SP.
    pub stack_base: Word,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory_size: MEMORY_SIZE,
            stack_base: STACK_BASE,
        }
    }
}

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    Ready,
    Running,
    Halted,
    Faulted,
}

#[derive(Debug, Hash, Clone, Copy, PartialEq, Eq)]
pub enum StepOut {
    Continue,
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub pc: usize,
    pub fl: Word,
    pub regs: [Word; REGISTERS],
    pub running: bool,
    pub state: State,
    pub insns: u64,
}

type Handler = fn(&mut Machine, &mut dyn Sink) -> Result<(), Error>;

pub struct Machine {
    config: Config,
    memory: Vec<Word>,
    regs: [Word; REGISTERS],
    fl: Word,
    pc: usize,
    state: State,
    program_len: usize,
    /// SP as last written through R7; popping at or above it is an underflow.
    stack_top: Word,
    insns: u64,
    dispatch: [Option<Handler>; 256],
}

impl Default for Machine {
    fn default() -> Self {
        Machine::with_config(Config::default())
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut t = Table::new();
        t.set_header((0..REGISTERS).map(|r| format!("R{}", r)));
        t.add_row(self.regs.iter().map(|x| format!("{:02x}", x)));
        t.add_row(
            vec![
                (self.pc, "pc"),
                (self.fl as usize, "fl"),
                (self.program_len, "prog"),
                (self.insns as usize, "instret"),
            ]
            .iter()
            .map(|(x, lbl)| format!("{} = {:02x}", lbl, x)),
        );
        write!(f, "{}\n{:?}", t, self.state)
    }
}

impl Machine {
    pub fn new() -> Self {
        Machine::default()
    }

    pub fn with_config(config: Config) -> Self {
        let mut regs = [0; REGISTERS];
        regs[SP] = config.stack_base;
        Self {
            config,
            memory: vec![0; config.memory_size],
            regs,
            fl: 0,
            pc: 0,
            state: State::Ready,
            program_len: 0,
            stack_top: config.stack_base,
            insns: 0,
            dispatch: dispatch_table(),
        }
    }

    pub fn reset(&mut self) {
        *self = Machine::with_config(self.config);
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn fl(&self) -> Word {
        self.fl
    }

    pub fn sp(&self) -> Word {
        self.regs[SP]
    }

    pub fn insns(&self) -> u64 {
        self.insns
    }

    pub fn program_len(&self) -> usize {
        self.program_len
    }

    pub fn regs(&self) -> &[Word; REGISTERS] {
        &self.regs
    }

    /// Copies `program` into memory starting at address 0.
    pub fn load(&mut self, program: &[Word]) -> Result<(), LoadError> {
        if program.len() > self.memory.len() {
            return Err(LoadError::TooLarge {
                len: program.len(),
                capacity: self.memory.len(),
            });
        }
        self.memory[..program.len()].copy_from_slice(program);
        self.program_len = program.len();
        debug!("loaded {} byte program", program.len());
        Ok(())
    }

    pub fn ram_read(&self, address: usize) -> Result<Word, Error> {
        self.memory
            .get(address)
            .copied()
            .ok_or(Error::AddressOutOfRange {
                address,
                size: self.memory.len(),
            })
    }

    pub fn ram_write(&mut self, address: usize, value: Word) -> Result<(), Error> {
        let size = self.memory.len();
        let cell = self
            .memory
            .get_mut(address)
            .ok_or(Error::AddressOutOfRange { address, size })?;
        *cell = value;
        Ok(())
    }

    pub fn reg(&self, r: Reg) -> Result<Word, Error> {
        self.regs.get(r).copied().ok_or(Error::RegisterOutOfRange(r))
    }

    /// Writing R7 moves the stack: the new SP becomes the empty-stack top.
    pub fn set_reg(&mut self, r: Reg, value: Word) -> Result<(), Error> {
        let cell = self.regs.get_mut(r).ok_or(Error::RegisterOutOfRange(r))?;
        *cell = value;
        if r == SP {
            self.stack_top = value;
        }
        Ok(())
    }

    /// The `n`th operand byte of the instruction at PC.
    fn operand(&self, n: usize) -> Result<Word, Error> {
        self.ram_read(self.pc + 1 + n)
    }

    /// Decrements SP, then stores `value` at the new SP.
    pub fn push(&mut self, value: Word) -> Result<(), Error> {
        let sp = self.regs[SP];
        let next = sp
            .checked_sub(1)
            .filter(|&next| next as usize >= self.program_len)
            .ok_or(Error::StackOverflow { sp })?;
        self.ram_write(next as usize, value)?;
        self.regs[SP] = next;
        debug!("push {:#04x} at {:#04x}", value, next);
        Ok(())
    }

    fn top(&self) -> Result<Word, Error> {
        let sp = self.regs[SP];
        if sp >= self.stack_top {
            return Err(Error::StackUnderflow { sp });
        }
        let value = self.ram_read(sp as usize)?;
        debug!("pop {:#04x} from {:#04x}", value, sp);
        Ok(value)
    }

    fn drop_top(&mut self) -> Result<(), Error> {
        let sp = self.regs[SP];
        self.regs[SP] = sp.checked_add(1).ok_or(Error::StackUnderflow { sp })?;
        Ok(())
    }

    /// Reads the value at SP, then increments SP.
    pub fn pop(&mut self) -> Result<Word, Error> {
        let value = self.top()?;
        self.drop_top()?;
        Ok(value)
    }

    /// Reads the value at SP into `r`, then increments SP. For `r` = R7 the
    /// increment applies to the popped value.
    pub fn pop_into(&mut self, r: Reg) -> Result<(), Error> {
        self.reg(r)?;
        let value = self.top()?;
        self.set_reg(r, value)?;
        self.drop_top()
    }

    pub fn alu(&mut self, op: Opcode, reg_a: Reg, reg_b: Reg) -> Result<(), Error> {
        let op = AluOp::from_opcode(op)?;
        let res = op.apply(self.reg(reg_a)?, self.reg(reg_b)?);
        self.set_reg(reg_a, res)
    }

    /// Sets exactly one of E, L, G from the values held in the two registers.
    pub fn compare(&mut self, reg_a: Reg, reg_b: Reg) -> Result<(), Error> {
        self.fl = flags::compare(self.reg(reg_a)?, self.reg(reg_b)?);
        Ok(())
    }

    pub fn trace(&self) -> String {
        let at = |offset| match self.memory.get(self.pc + offset) {
            Some(b) => format!("{:02X}", b),
            None => "--".to_string(),
        };
        format!(
            "TRACE: {:02X} | {} {} {} | {}",
            self.pc,
            at(0),
            at(1),
            at(2),
            self.regs.iter().map(|r| format!("{:02X}", r)).join(" ")
        )
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pc: self.pc,
            fl: self.fl,
            regs: self.regs,
            running: self.is_running(),
            state: self.state,
            insns: self.insns,
        }
    }

    fn exec(&mut self, sink: &mut dyn Sink) -> Result<(), Error> {
        let pc = self.pc;
        let opcode = self.ram_read(pc)?;
        let handler = self.dispatch[opcode as usize].ok_or(Error::InvalidOpcode { opcode, pc })?;
        if log_enabled!(Level::Trace) {
            match Insn::fetch(&self.memory, pc) {
                Ok(insn) => trace!("{} {}", self.trace(), insn),
                Err(_) => trace!("{}", self.trace()),
            }
        }
        handler(self, sink)
    }

    pub fn step(&mut self, sink: &mut dyn Sink) -> Result<StepOut, Error> {
        if self.state == State::Faulted {
            return Err(Error::Faulted);
        }
        self.state = State::Running;
        match self.exec(sink) {
            Ok(()) => {
                self.insns += 1;
                match self.state {
                    State::Halted => Ok(StepOut::Halt),
                    _ => Ok(StepOut::Continue),
                }
            }
            Err(e) => {
                debug!("fault at {:#04x}: {}", self.pc, e);
                self.state = State::Faulted;
                Err(e)
            }
        }
    }

    /// Runs until `HLT` or the first fault. PC stays on the `HLT`, so running
    /// a halted machine again halts after one instruction.
    pub fn run(&mut self, sink: &mut dyn Sink) -> Result<(), Error> {
        debug!("running from {:#04x}", self.pc);
        while let StepOut::Continue = self.step(sink)? {}
        debug!("halted after {} instructions", self.insns);
        Ok(())
    }
}

fn dispatch_table() -> [Option<Handler>; 256] {
    let mut table: [Option<Handler>; 256] = [None; 256];
    for op in Opcode::all() {
        table[op as usize] = Some(handlers::handler(op));
    }
    table
}
