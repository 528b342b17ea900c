use thiserror::Error;

use crate::isa::Opcode;

/// Fatal machine faults. Execution stops at the first one and the machine
/// refuses to continue until it is reset.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported instruction {opcode:#010b} at {pc:#04x}")]
    InvalidOpcode { opcode: u8, pc: usize },
    #[error("unsupported ALU operation {0:?}")]
    UnsupportedAluOperation(Opcode),
    #[error("address {address:#04x} out of range for {size}-byte memory")]
    AddressOutOfRange { address: usize, size: usize },
    #[error("register R{0} out of range")]
    RegisterOutOfRange(usize),
    #[error("stack overflow (SP = {sp:#04x})")]
    StackOverflow { sp: u8 },
    #[error("stack underflow (SP = {sp:#04x})")]
    StackUnderflow { sp: u8 },
    #[error("machine faulted earlier; reset it before running again")]
    Faulted,
    #[error("writing output: {0}")]
    Output(#[from] std::io::Error),
}
