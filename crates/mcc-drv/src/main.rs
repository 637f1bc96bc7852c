use std::io::Write;

use mcc_drv::run;

const USAGE: &str = "usage: mcc [-v|--verbose] <source>";

fn main() {
    let mut verbose = false;
    let mut source_arg = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-v" | "--verbose" => verbose = true,
            _ if source_arg.is_none() => source_arg = Some(arg),
            _ => {
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
        }
    }

    let Some(source) = source_arg else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    match run(&source, verbose) {
        Ok(asm) => {
            print!("{asm}");
            let _ = std::io::stdout().flush();
        }
        Err(err) => {
            if let Some(diag) = err.downcast_ref::<mcc_util::Diagnostic>() {
                eprintln!("{}", mcc_util::render(&source, diag));
            } else {
                eprintln!("error: {err}");
            }
            std::process::exit(2);
        }
    }
}
