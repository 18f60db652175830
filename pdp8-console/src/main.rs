//! Entry point: parse `-m <kwords>`, build the machine, hand off to the
//! console REPL.
//!
//! Grounded on `main.c`.

mod commands;
mod console;
mod logger;
mod terminal;
mod trace;

use std::process::ExitCode;

use pdp8_core::{MAX_KWORDS, MIN_KWORDS};

const MAJVER: u32 = 0;
const MINVER: u32 = 2;

fn usage(name: &str) {
    eprintln!("Usage:");
    eprintln!("{name} [-m <kwords>]");
}

fn parse_args(args: &[String]) -> Result<usize, ()> {
    let mut kwords = pdp8_core::DEFAULT_KWORDS;
    let name = args.first().map(String::as_str).unwrap_or("pdp8");
    let mut i = 1;

    while i < args.len() {
        let arg = &args[i];
        if let Some(rest) = arg.strip_prefix("-m") {
            let value = if !rest.is_empty() {
                rest.to_string()
            } else {
                i += 1;
                match args.get(i) {
                    Some(v) => v.clone(),
                    None => {
                        usage(name);
                        return Err(());
                    }
                }
            };
            kwords = value.parse().unwrap_or(0);
            if kwords < MIN_KWORDS || kwords > MAX_KWORDS {
                eprintln!("Invalid memory size: {kwords} K words");
                eprintln!("Must be between {MIN_KWORDS} and {MAX_KWORDS} K words");
                return Err(());
            }
            if kwords % MIN_KWORDS != 0 {
                eprintln!("Invalid memory size: {kwords} K words");
                eprintln!("Must be a multiple of {MIN_KWORDS} (K words)");
                return Err(());
            }
        } else if arg == "-h" {
            usage(name);
            return Err(());
        } else {
            eprintln!("Invalid option: {arg}");
            usage(name);
            return Err(());
        }
        i += 1;
    }

    Ok(kwords)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let kwords = match parse_args(&args) {
        Ok(kwords) => kwords,
        Err(()) => return ExitCode::FAILURE,
    };

    println!("\nPDP-8 simulator version {MAJVER}.{MINVER}");
    println!("{kwords}K memory");

    let mut console = match console::Console::new(kwords) {
        Ok(console) => console,
        Err(err) => {
            eprintln!("Could not start console: {err}");
            return ExitCode::FAILURE;
        }
    };

    console.run();

    ExitCode::SUCCESS
}
