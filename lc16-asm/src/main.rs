#[macro_use]
extern crate clap;

use clap::Arg;
use lc16_asm::{Parser, RegisterMap};
use std::path::PathBuf;

#[derive(Debug)]
enum Error {
    Assemble(lc16_asm::ParserError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Assemble(err) => write!(f, "assembling input failed: {}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the assembly source file to assemble")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Enables debug logging"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let verbose = matches.is_present("verbose");

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if verbose {
        "debug"
    } else {
        "info"
    }))
    .init();

    if let Err(err) = assemble(input) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn assemble(input: &str) -> Result<(), Error> {
    let input_path = PathBuf::from(input);
    log::debug!("reading {}", input_path.display());
    let mut parser = Parser::from_path(&input_path).map_err(Error::Assemble)?;

    let registers = RegisterMap::named_data_registers(lc16::Cpu::new().registers());

    let instructions = parser
        .make_instruction_set(&registers)
        .map_err(Error::Assemble)?;
    log::info!("resolved {} instruction(s)", instructions.len());

    println!(
        "{}: {} instruction(s) assembled",
        input_path.display(),
        instructions.len()
    );
    Ok(())
}
