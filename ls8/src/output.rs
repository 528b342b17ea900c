use std::io::Write;

use crate::isa::Word;
use crate::Error;

/// Receives each value printed by `PRN`.
pub trait Sink {
    fn emit(&mut self, value: Word) -> Result<(), Error>;
}

/// Collects printed values in order.
impl Sink for Vec<Word> {
    fn emit(&mut self, value: Word) -> Result<(), Error> {
        self.push(value);
        Ok(())
    }
}

/// One decimal value per line, flushed as it is written.
pub struct Lines<W>(pub W);

impl Lines<std::io::Stdout> {
    pub fn stdout() -> Self {
        Lines(std::io::stdout())
    }
}

impl<W: Write> Sink for Lines<W> {
    fn emit(&mut self, value: Word) -> Result<(), Error> {
        writeln!(self.0, "{}", value)?;
        self.0.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_decimal() {
        let mut out = Lines(Vec::new());
        out.emit(17).unwrap();
        out.emit(0).unwrap();
        out.emit(255).unwrap();
        assert_eq!(String::from_utf8(out.0).unwrap(), "17\n0\n255\n");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_is_reported() {
        assert!(matches!(Lines(Broken).emit(1), Err(Error::Output(_))));
    }
}
