use ls8::*;

fn run_program(name: &str) -> (Machine, Vec<Word>) {
    let path = format!("{}/programs/{}", env!("CARGO_MANIFEST_DIR"), name);
    let program = load_file(&path).unwrap();
    let mut m = Machine::new();
    m.load(&program).unwrap();
    let mut out: Vec<Word> = vec![];
    m.run(&mut out).unwrap();
    (m, out)
}

#[test]
fn print8() {
    let (m, out) = run_program("print8.ls8");
    assert_eq!(out, vec![8]);
    assert_eq!(m.state(), State::Halted);
}

#[test]
fn mult() {
    assert_eq!(run_program("mult.ls8").1, vec![72]);
}

#[test]
fn stack() {
    let (m, out) = run_program("stack.ls8");
    assert_eq!(out, vec![2, 4, 1]);
    assert_eq!(m.sp(), STACK_BASE);
}

#[test]
fn call() {
    let (m, out) = run_program("call.ls8");
    assert_eq!(out, vec![20, 30, 36, 60]);
    assert_eq!(m.sp(), STACK_BASE);
}

#[test]
fn cmpjmp() {
    assert_eq!(run_program("cmpjmp.ls8").1, vec![1]);
}

#[test]
fn jumps() {
    let (m, out) = run_program("jumps.ls8");
    assert_eq!(out, vec![1, 2]);
    assert_eq!(m.fl(), 0b100);
}

#[test]
fn every_bundled_program_disassembles() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/programs");
    for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let listing = disassemble(&load_file(&path).unwrap());
        assert!(
            listing.iter().all(|l| !l.contains(".BYTE")),
            "{}: {:?}",
            path.display(),
            listing
        );
    }
}

#[test]
fn call_listing() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/programs/call.ls8");
    assert_eq!(
        disassemble(&load_file(path).unwrap()),
        vec![
            "00: LDI R1, 24",
            "03: LDI R0, 10",
            "06: CALL R1",
            "08: LDI R0, 15",
            "0b: CALL R1",
            "0d: LDI R0, 18",
            "10: CALL R1",
            "12: LDI R0, 30",
            "15: CALL R1",
            "17: HLT",
            "18: ADD R0, R0",
            "1b: PRN R0",
            "1d: RET",
        ]
    );
}
