//! The command table, line-splitting, and argument parsing the REPL
//! dispatches through.
//!
//! Grounded on `console.c`'s `find_command`/`make_argv`/`octal_args` and
//! the per-command handlers they feed.

use std::fs;
use std::path::Path;

use pdp8_cpu::StepOutcome;

use crate::console::Console;

/// A handler returns `true` to end the REPL (only `quit` does).
pub type Handler = fn(&mut Console, &[String]) -> bool;

pub struct Command {
    pub name: &'static str,
    pub args_help: &'static str,
    pub help: &'static str,
    pub handler: Handler,
}

pub enum Lookup {
    Found(&'static Command),
    Ambiguous,
    None,
}

static COMMANDS: &[Command] = &[
    Command { name: "assign", args_help: "<dev> <file>", help: "redirect a peripheral to a host file", handler: cmd_assign },
    Command { name: "bc", args_help: "<num>", help: "clear a breakpoint", handler: cmd_bc },
    Command { name: "bl", args_help: "", help: "list breakpoints", handler: cmd_bl },
    Command { name: "bp", args_help: "<addr>", help: "set a breakpoint", handler: cmd_bp },
    Command { name: "continue", args_help: "[<count>]", help: "resume execution", handler: cmd_continue },
    Command { name: "deposit", args_help: "<addr>", help: "interactively assemble and deposit words", handler: cmd_deposit },
    Command { name: "examine", args_help: "<addr> [<count>]", help: "display memory", handler: cmd_examine },
    Command { name: "help", args_help: "", help: "list commands", handler: cmd_help },
    Command { name: "load", args_help: "<file> [-d]", help: "load a program", handler: cmd_load },
    Command { name: "log", args_help: "0|1", help: "enable/disable error logging", handler: cmd_log },
    Command { name: "quit", args_help: "", help: "leave the console", handler: cmd_quit },
    Command { name: "run", args_help: "[<addr>] [<count>]", help: "reset and run from an address", handler: cmd_run },
    Command { name: "sacc", args_help: "<value>", help: "set AC", handler: cmd_sacc },
    Command { name: "shregs", args_help: "", help: "show all registers", handler: cmd_shregs },
    Command { name: "si", args_help: "", help: "single-step", handler: cmd_si },
    Command { name: "slink", args_help: "0|1", help: "set L", handler: cmd_slink },
    Command { name: "sswt", args_help: "<value>", help: "set the switch register", handler: cmd_sswt },
    Command { name: "trace", args_help: "0|1 [<file>]", help: "enable/disable instruction tracing", handler: cmd_trace },
];

/// Prefix-match `name` against [`COMMANDS`]; an exact match always wins
/// even when it's also a prefix of something else (`"r"` vs `"run"` isn't
/// ambiguous with `"run"` itself, but `"s"` is ambiguous among `sacc`,
/// `shregs`, `si`, `slink`, `sswt`).
pub fn find_command(name: &str) -> Lookup {
    if let Some(cmd) = COMMANDS.iter().find(|c| c.name == name) {
        return Lookup::Found(cmd);
    }
    let mut matches = COMMANDS.iter().filter(|c| c.name.starts_with(name));
    match (matches.next(), matches.next()) {
        (Some(cmd), None) => Lookup::Found(cmd),
        (Some(_), Some(_)) => Lookup::Ambiguous,
        (None, _) => Lookup::None,
    }
}

/// Split a line into words, honoring double-quoted substrings so a
/// filename with spaces can be passed to `assign`/`load`.
pub fn make_argv(line: &str) -> Option<Vec<String>> {
    let mut argv = Vec::new();
    let mut chars = line.trim_end_matches(['\n', '\r']).chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' {
            chars.next();
            let mut word = String::new();
            loop {
                match chars.next() {
                    Some('"') | None => break,
                    Some(c) => word.push(c),
                }
            }
            argv.push(word);
        } else {
            let mut word = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() {
                    break;
                }
                word.push(c);
                chars.next();
            }
            argv.push(word);
        }
    }
    Some(argv)
}

/// Parse `argv[1..]` as octal words, enforcing `min..=max` argument count
/// and that each value fits in 12 bits (or `bound`, for addresses, which
/// is the machine's configured word count).
fn octal_args(argv: &[String], min: usize, max: usize, bound: u32) -> Option<Vec<u32>> {
    let rest = &argv[1..];
    if rest.len() < min || rest.len() > max {
        println!("Wrong number of arguments");
        return None;
    }
    let mut values = Vec::with_capacity(rest.len());
    for arg in rest {
        match u32::from_str_radix(arg, 8) {
            Ok(v) if v <= bound => values.push(v),
            Ok(_) => {
                println!("Value out of range: {arg}");
                return None;
            }
            Err(_) => {
                println!("Not an octal number: {arg}");
                return None;
            }
        }
    }
    Some(values)
}

fn cmd_help(_console: &mut Console, _argv: &[String]) -> bool {
    for cmd in COMMANDS {
        println!("  {:<10} {:<20} {}", cmd.name, cmd.args_help, cmd.help);
    }
    false
}

fn cmd_quit(_console: &mut Console, _argv: &[String]) -> bool {
    true
}

fn cmd_shregs(console: &mut Console, _argv: &[String]) -> bool {
    console.trace_next();
    false
}

fn cmd_si(console: &mut Console, _argv: &[String]) -> bool {
    let pc = console.machine.regs.pc;
    let outcome = console.run_machine(pc, 1);
    match outcome {
        StepOutcome::Breakpoint(_) | StepOutcome::Halted => console.report_stop(outcome),
        StepOutcome::Continued => console.trace_next(),
    }
    false
}

fn cmd_continue(console: &mut Console, argv: &[String]) -> bool {
    let Some(args) = octal_args(argv, 0, 1, 0o7777) else { return false };
    let count = args.first().copied().unwrap_or(0) as u16;
    let pc = console.machine.regs.pc;
    let outcome = console.run_machine(pc, count);
    console.report_stop(outcome);
    false
}

fn cmd_run(console: &mut Console, argv: &[String]) -> bool {
    let Some(args) = octal_args(argv, 0, 2, pdp8_core::WORD_MASK.into()) else { return false };
    let addr = args.first().copied().unwrap_or(0) as u16;
    let count = args.get(1).copied().unwrap_or(0) as u16;
    let outcome = console.run_machine(addr, count);
    console.report_stop(outcome);
    false
}

fn cmd_examine(console: &mut Console, argv: &[String]) -> bool {
    let memwords = console.machine.memory.len() as u32;
    let Some(args) = octal_args(argv, 1, 2, memwords - 1) else { return false };
    let addr = args[0];
    let mut count = args.get(1).copied().unwrap_or(1).max(1);
    if addr + count > memwords {
        count = memwords - addr;
    }
    if count == 0 {
        count = 1;
    }

    let pc = u32::from(console.machine.regs.if_reg) | u32::from(console.machine.regs.pc);
    println!();
    for i in 0..count {
        let a = addr + i;
        let breakpoint = console.machine.breakpoints.check(a as u16);
        let word = match breakpoint {
            Some(num) => console.machine.breakpoints.get(num).expect("check() just found it").saved,
            None => console.machine.memory.read(a),
        };
        let inst = pdp8_cpu::decode(a as u16, word);
        println!(
            "{a:05o}:{}{}{word:04o}  {}  {}\t{}",
            if a == pc { '>' } else { ' ' },
            if breakpoint.is_some() { '*' } else { ' ' },
            inst.ascii,
            inst.mnemonic,
            inst.args,
        );
    }
    false
}

/// `deposit <addr>`: prompt at successive addresses, assembling one
/// statement per line until a blank line or EOF, the way `inline_asm`
/// does. Forward symbol references aren't allowed here — there's no pass
/// 1 to resolve them.
fn cmd_deposit(console: &mut Console, argv: &[String]) -> bool {
    use std::io::Write;

    let memwords = console.machine.memory.len() as u32;
    let Some(args) = octal_args(argv, 1, 1, memwords - 1) else { return false };
    let mut addr = args[0] as u16;

    println!();
    while u32::from(addr) < memwords {
        let current = console.machine.memory.read(u32::from(addr));
        print!("{addr:04o}: {current:04o}    ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).unwrap_or(0) == 0 || line.trim().is_empty() {
            break;
        }

        match console.assembler.deposit_statement(addr, &line) {
            Ok(Some((word_addr, word))) => {
                console.machine.memory.write(u32::from(word_addr), word);
            }
            Ok(None) => {}
            Err(err) => println!("{err}"),
        }
        addr = console.assembler.location();
    }
    false
}

fn cmd_bp(console: &mut Console, argv: &[String]) -> bool {
    let bound = console.machine.memory.len() as u32 - 1;
    let Some(args) = octal_args(argv, 1, 1, bound) else { return false };
    match console.machine.set_breakpoint(args[0] as u16) {
        Ok(num) => println!("Breakpoint {num:o} set"),
        Err(err) => println!("{err}"),
    }
    false
}

fn cmd_bc(console: &mut Console, argv: &[String]) -> bool {
    let Some(args) = octal_args(argv, 1, 1, 0o17) else { return false };
    if let Err(err) = console.machine.clear_breakpoint(args[0] as u16) {
        println!("{err}");
    }
    false
}

fn cmd_bl(console: &mut Console, _argv: &[String]) -> bool {
    for (num, bp) in console.machine.breakpoints.list() {
        println!("{num:o}: {:05o}", bp.addr);
    }
    false
}

fn cmd_sacc(console: &mut Console, argv: &[String]) -> bool {
    let Some(args) = octal_args(argv, 1, 1, 0o7777) else { return false };
    console.machine.regs.ac = args[0] as u16;
    false
}

fn cmd_slink(console: &mut Console, argv: &[String]) -> bool {
    let Some(args) = octal_args(argv, 1, 1, 1) else { return false };
    console.machine.regs.l = args[0] as u16;
    false
}

fn cmd_sswt(console: &mut Console, argv: &[String]) -> bool {
    let Some(args) = octal_args(argv, 1, 1, 0o7777) else { return false };
    console.machine.regs.sr = args[0] as u16;
    false
}

fn cmd_log(console: &mut Console, argv: &[String]) -> bool {
    let Some(args) = octal_args(argv, 1, 1, 1) else { return false };
    if args[0] == 1 {
        console.logger.open();
    } else {
        console.logger.close();
    }
    false
}

fn cmd_trace(console: &mut Console, argv: &[String]) -> bool {
    if argv.len() < 2 {
        println!("Wrong number of arguments");
        return false;
    }
    let Ok(on) = argv[1].parse::<u32>() else {
        println!("Not 0 or 1: {}", argv[1]);
        return false;
    };
    if on == 1 {
        console.machine.regs.trace = true;
        if let Some(path) = argv.get(2) {
            if let Err(err) = console.tracer.open_file(path) {
                println!("Could not open {path}: {err}");
            }
        } else {
            console.tracer.use_stdout();
        }
    } else {
        console.machine.regs.trace = false;
    }
    false
}

fn cmd_assign(console: &mut Console, argv: &[String]) -> bool {
    if argv.len() != 3 {
        println!("Wrong number of arguments");
        return false;
    }
    let Ok(dev) = argv[1].parse::<u32>() else {
        println!("Not a device number: {}", argv[1]);
        return false;
    };
    let path = &argv[2];
    let result = match dev {
        1 => fs::File::open(path).map(|f| console.machine.devices.reader_mut().assign(Box::new(f))),
        2 => fs::File::create(path).map(|f| console.machine.devices.punch_mut().assign(Box::new(f))),
        3 => fs::File::open(path).map(|f| {
            console.machine.devices.keyboard_mut().set_source(Box::new(
                crate::terminal::FileKeyboardSource::new(f),
            ));
        }),
        _ => {
            println!("Unknown device: {dev}");
            return false;
        }
    };
    if let Err(err) = result {
        println!("Could not open {path}: {err}");
    }
    false
}

fn cmd_load(console: &mut Console, argv: &[String]) -> bool {
    if argv.len() < 2 {
        println!("Wrong number of arguments");
        return false;
    }
    let path = &argv[1];
    let disassemble = argv.get(2).map(String::as_str) == Some("-d");

    let ext = Path::new(path).extension().and_then(|e| e.to_str()).unwrap_or("");
    let image = match ext {
        "asm8" => match fs::read_to_string(path) {
            Ok(source) => {
                let report = console.assembler.assemble(&source);
                for diag in &report.diagnostics {
                    println!("{diag}");
                }
                report.image
            }
            Err(err) => {
                println!("Could not read {path}: {err}");
                return false;
            }
        },
        "rim" => match fs::read(path) {
            Ok(data) => pdp8_asm::load_rim(&data),
            Err(err) => {
                println!("Could not read {path}: {err}");
                return false;
            }
        },
        "bin" => match fs::read(path) {
            Ok(data) => pdp8_asm::load_bin(&data),
            Err(err) => {
                println!("Could not read {path}: {err}");
                return false;
            }
        },
        "txt" => match fs::read_to_string(path) {
            Ok(text) => match pdp8_asm::load_txt(&text) {
                Ok(image) => image,
                Err(err) => {
                    println!("{err}");
                    return false;
                }
            },
            Err(err) => {
                println!("Could not read {path}: {err}");
                return false;
            }
        },
        _ => {
            println!("Unrecognized file extension: {ext}");
            return false;
        }
    };

    let mut loaded = 0usize;
    let mut out_of_range = 0usize;
    for (addr, word) in image.iter() {
        if addr < console.machine.memory.len() as u32 {
            console.machine.memory.write(addr, word);
            loaded += 1;
        } else {
            out_of_range += 1;
        }
    }
    println!("Loaded {loaded} words");
    if out_of_range > 0 {
        println!("{out_of_range} words out of range, skipped");
    }

    if disassemble {
        let list_path = Path::new(path).with_extension("lst");
        if let Some(list) = list_path.to_str() {
            if let Err(err) = write_listing(&image, list) {
                println!("Could not write {list}: {err}");
            }
        }
    }

    false
}

fn write_listing(image: &pdp8_asm::Image, path: &str) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = fs::File::create(path)?;
    for (addr, word) in image.iter() {
        let addr16 = addr as u16;
        let inst = pdp8_cpu::decode(addr16, word);
        writeln!(file, "{addr16:05o}  {word:04o}  {}\t{}", inst.mnemonic, inst.args)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_argv_splits_on_whitespace() {
        assert_eq!(make_argv("run 0200 10\n").unwrap(), vec!["run", "0200", "10"]);
    }

    #[test]
    fn make_argv_honors_quoted_strings() {
        assert_eq!(
            make_argv(r#"assign 1 "my file.pt""#).unwrap(),
            vec!["assign", "1", "my file.pt"]
        );
    }

    #[test]
    fn make_argv_handles_blank_line() {
        assert_eq!(make_argv("\n").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn find_command_resolves_unambiguous_prefix() {
        assert!(matches!(find_command("bp"), Lookup::Found(c) if c.name == "bp"));
    }

    #[test]
    fn find_command_flags_ambiguous_prefix() {
        assert!(matches!(find_command("s"), Lookup::Ambiguous));
    }

    #[test]
    fn find_command_exact_match_wins_over_prefix_collision() {
        assert!(matches!(find_command("run"), Lookup::Found(c) if c.name == "run"));
    }

    #[test]
    fn find_command_reports_unknown() {
        assert!(matches!(find_command("zzz"), Lookup::None));
    }

    #[test]
    fn octal_args_rejects_out_of_range_value() {
        let argv = vec!["deposit".to_string(), "77777".to_string(), "0".to_string()];
        assert!(octal_args(&argv, 2, 2, 0o7777).is_none());
    }

    #[test]
    fn octal_args_rejects_wrong_arg_count() {
        let argv = vec!["bp".to_string()];
        assert!(octal_args(&argv, 1, 1, 0o7777).is_none());
    }
}
