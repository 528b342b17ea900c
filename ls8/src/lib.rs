mod alu;
mod error;
mod isa;
mod loader;
mod output;
mod sim;

pub use alu::*;
pub use error::*;
pub use isa::*;
pub use loader::*;
pub use output::*;
pub use sim::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print8() {
        let program = parse_program("10000010\n00000000\n00001000\n01000111\n00000000\n00000001\n").unwrap();
        let mut m = Machine::default();
        m.load(&program).unwrap();
        let mut out = Lines(Vec::new());
        m.run(&mut out).unwrap();
        assert_eq!(out.0, b"8\n");
        assert_eq!(m.state(), State::Halted);
    }
}
