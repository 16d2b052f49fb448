use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use lix::builtins;
use lix::env::Env;
use lix::error::LixResult;
use lix::eval;
use lix::printer;
use lix::reader::Reader;
use lix::value::Value;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Process command-line flags
    let mut load_files: Vec<String> = Vec::new();
    let mut use_prelude = true;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--load" => {
                if i + 1 < args.len() {
                    load_files.push(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("--load requires a file path");
                    std::process::exit(1);
                }
            }
            "--no-prelude" => {
                use_prelude = false;
                i += 1;
            }
            "--help" | "-h" => {
                println!("Usage: lix [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --load <file>    Load a lix source file before starting the REPL");
                println!("  --no-prelude     Skip loading the user prelude at startup");
                println!("  --help, -h       Show this help message");
                println!();
                println!("Environment variables:");
                println!("  RUST_LOG    Evaluator tracing filter (e.g. RUST_LOG=lix=trace)");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("Try 'lix --help' for usage information.");
                std::process::exit(1);
            }
        }
    }

    let mut env = Env::root();
    builtins::install(&mut env);

    // The prelude must at least be locatable; failing to resolve the
    // profile directory is the one fatal startup condition.
    if use_prelude {
        if let Err(e) = load_prelude(&mut env) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    for path in &load_files {
        load_file(&mut env, path);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        if load_files.is_empty() {
            println!("Lix v0.1.0");
        } else {
            println!("Lix v0.1.0 (loaded: {})", load_files.join(", "));
        }
        println!("Press Ctrl+C to exit.\n");
        run_interactive(&mut env);
    } else {
        run_piped(&mut env);
    }
}

/// Resolve the user's prelude path and load it. A missing profile
/// variable is fatal; a missing prelude *file* is reported by `load` as an
/// ordinary error value and the REPL still starts.
fn load_prelude(env: &mut Env) -> LixResult<()> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    let home = std::env::var(var).map_err(|_| lix::error::LixError::MissingProfileDir(var))?;

    let path: PathBuf = [home.as_str(), ".lix", "stdlib", "prelude.lx"].iter().collect();
    let path = path.to_string_lossy().into_owned();
    debug!(path = %path, "loading prelude");

    load_file(env, &path);
    Ok(())
}

/// Evaluate `(load "path")` in the given environment, printing any error.
fn load_file(env: &mut Env, path: &str) {
    let expr = Value::Sexpr(vec![Value::sym("load"), Value::string(path)]);
    let result = eval::eval(env, expr);
    if result.is_err() {
        printer::println(&result);
    }
}

/// Interactive REPL: accumulate lines until brackets are balanced.
fn run_interactive(env: &mut Env) {
    let stdin = io::stdin();
    let mut buf = String::new();
    let mut depth: i32 = 0;

    loop {
        if depth == 0 {
            print!("lix> ");
        } else {
            print!("  ");
        }
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("Read error: {}", e);
                break;
            }
        }

        // Track bracket depth (naive but sufficient for well-formed input)
        for ch in line.chars() {
            match ch {
                '(' | '{' => depth += 1,
                ')' | '}' => depth -= 1,
                _ => {}
            }
        }

        buf.push_str(&line);

        if depth <= 0 {
            depth = 0;
            let input = buf.trim().to_string();
            buf.clear();

            if input.is_empty() {
                continue;
            }

            eval_and_print(&input, env);
        }
    }
}

/// Piped mode: read all input, then evaluate one expression at a time.
fn run_piped(env: &mut Env) {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Read error: {}", e);
        return;
    }
    eval_and_print(&input, env);
}

/// Evaluate every expression in a string and print each result.
fn eval_and_print(input: &str, env: &mut Env) {
    let mut reader = Reader::new(input);
    loop {
        match reader.read() {
            Ok(Some(expr)) => {
                let result = eval::eval(env, expr);
                printer::println(&result);
            }
            Ok(None) => break,
            Err(e) => {
                eprintln!("{}", e);
                break;
            }
        }
    }
}
