use ls8::*;
use std::process::ExitCode;

fn usage() -> ExitCode {
    eprintln!("usage: ls8 <run|disasm|state> <program.ls8>");
    ExitCode::from(1)
}

fn read(path: Option<String>) -> Result<Vec<Word>, ExitCode> {
    let path = path.ok_or_else(usage)?;
    load_file(path).map_err(|e| {
        eprintln!("{}", e);
        match e {
            LoadError::Empty => ExitCode::from(3),
            _ => ExitCode::from(1),
        }
    })
}

fn execute(program: &[Word]) -> Result<Machine, ExitCode> {
    let mut m = Machine::new();
    if let Err(e) = m.load(program) {
        eprintln!("{}", e);
        return Err(ExitCode::from(1));
    }
    if let Err(e) = m.run(&mut Lines::stdout()) {
        eprintln!("fault: {}", e);
        eprintln!("{}", m.trace());
        return Err(ExitCode::from(2));
    }
    Ok(m)
}

fn disasm(program: &[Word]) {
    for line in disassemble(program) {
        println!("{}", line);
    }
}

pub fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    let result = match std::env::args().nth(1).as_deref() {
        Some("run") => read(std::env::args().nth(2))
            .and_then(|program| execute(&program))
            .map(|_| ()),
        Some("disasm") => read(std::env::args().nth(2)).map(|program| disasm(&program)),
        Some("state") => read(std::env::args().nth(2))
            .and_then(|program| execute(&program))
            .and_then(|m| match serde_json::to_string_pretty(&m.snapshot()) {
                Ok(json) => {
                    println!("{}", json);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("encoding state: {}", e);
                    Err(ExitCode::from(1))
                }
            }),
        Some(_) => {
            eprintln!("no such command!");
            Err(usage())
        }
        None => {
            eprintln!("no command given!");
            Err(usage())
        }
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}
