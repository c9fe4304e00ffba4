#[macro_use]
extern crate clap;

use clap::Arg;
use lc16_asm::{Parser, RegisterMap};
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
enum Error {
    Io(std::io::Error, PathBuf),
    Assemble(lc16_asm::ParserError),
    Run(lc16::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, path) => write!(f, "reading \"{}\" failed: {}", path.display(), err),
            Error::Assemble(err) => write!(f, "assembling input failed: {}", err),
            Error::Run(err) => write!(f, "running program failed: {}", err),
        }
    }
}

fn main() {
    env_logger::init();

    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the assembly source file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("dump")
                .short("d")
                .long("dump-registers")
                .help("Prints the final register file after the program runs"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let dump = matches.is_present("dump");

    if let Err(err) = run(input, dump) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(input: &str, dump: bool) -> Result<(), Error> {
    let input_path = PathBuf::from(input);
    let source =
        fs::read_to_string(&input_path).map_err(|err| Error::Io(err, input_path.clone()))?;

    let mut parser = Parser::new(&source).map_err(Error::Assemble)?;

    let mut cpu = lc16::Cpu::new();
    let registers = RegisterMap::named_data_registers(cpu.registers());

    let instructions = parser
        .make_instruction_set(&registers)
        .map_err(Error::Assemble)?;

    cpu.run(instructions).map_err(Error::Run)?;

    if dump {
        for (index, register) in cpu.registers().iter().enumerate() {
            println!("r{} = {}", index, register.get());
        }
    }

    Ok(())
}
