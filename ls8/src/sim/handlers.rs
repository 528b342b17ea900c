//! One free function per opcode. Handlers that do not set PC themselves
//! advance it by the instruction length.

use super::{flags, Handler, Machine, State};
use crate::isa::{Opcode, Reg, Word};
use crate::output::Sink;
use crate::Error;

pub(super) fn handler(op: Opcode) -> Handler {
    use Opcode::*;
    match op {
        LDI => ldi,
        PRN => prn,
        HLT => hlt,
        ADD => add,
        MUL => mul,
        PUSH => push,
        POP => pop,
        CALL => call,
        RET => ret,
        CMP => cmp,
        JMP => jmp,
        JEQ => jeq,
        JNE => jne,
    }
}

impl Machine {
    fn advance(&mut self, op: Opcode) -> Result<(), Error> {
        self.pc += op.len();
        Ok(())
    }

    fn reg_operand(&self, n: usize) -> Result<Reg, Error> {
        Ok(self.operand(n)? as Reg)
    }

    /// Sets PC to the value of the register named by the first operand.
    fn jump(&mut self) -> Result<(), Error> {
        self.pc = self.reg(self.reg_operand(0)?)? as usize;
        Ok(())
    }

    fn jump_if(&mut self, op: Opcode, taken: bool) -> Result<(), Error> {
        if taken {
            self.jump()
        } else {
            self.advance(op)
        }
    }
}

fn ldi(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    let reg = m.reg_operand(0)?;
    let value = m.operand(1)?;
    m.set_reg(reg, value)?;
    m.advance(Opcode::LDI)
}

fn prn(m: &mut Machine, sink: &mut dyn Sink) -> Result<(), Error> {
    let value = m.reg(m.reg_operand(0)?)?;
    sink.emit(value)?;
    m.advance(Opcode::PRN)
}

fn hlt(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    m.state = State::Halted;
    Ok(())
}

fn arith(m: &mut Machine, op: Opcode) -> Result<(), Error> {
    let reg_a = m.reg_operand(0)?;
    let reg_b = m.reg_operand(1)?;
    m.alu(op, reg_a, reg_b)?;
    m.advance(op)
}

fn add(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    arith(m, Opcode::ADD)
}

fn mul(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    arith(m, Opcode::MUL)
}

fn push(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    let value = m.reg(m.reg_operand(0)?)?;
    m.push(value)?;
    m.advance(Opcode::PUSH)
}

fn pop(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    let reg = m.reg_operand(0)?;
    m.pop_into(reg)?;
    m.advance(Opcode::POP)
}

fn call(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    let target = m.reg(m.reg_operand(0)?)?;
    let ret_addr = m.pc + Opcode::CALL.len();
    let ret_addr = Word::try_from(ret_addr).map_err(|_| Error::AddressOutOfRange {
        address: ret_addr,
        size: m.memory.len(),
    })?;
    m.push(ret_addr)?;
    m.pc = target as usize;
    Ok(())
}

fn ret(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    m.pc = m.pop()? as usize;
    Ok(())
}

fn cmp(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    let reg_a = m.reg_operand(0)?;
    let reg_b = m.reg_operand(1)?;
    m.compare(reg_a, reg_b)?;
    m.advance(Opcode::CMP)
}

fn jmp(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    m.jump()
}

fn jeq(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    let taken = m.fl & flags::E != 0;
    m.jump_if(Opcode::JEQ, taken)
}

fn jne(m: &mut Machine, _: &mut dyn Sink) -> Result<(), Error> {
    let taken = m.fl & flags::E == 0;
    m.jump_if(Opcode::JNE, taken)
}
