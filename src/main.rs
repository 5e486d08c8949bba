mod ast;
mod collect;
mod config;
mod emit;
mod link;
mod location;
mod scope;
mod syntax;
mod types;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(
    name = "hcsc",
    about = "Compile HCS scripts to native executables",
    version,
    long_about = "hcsc compiles a single HCS source file to a standalone native \
                  executable by transpiling it to C (with static type inference, \
                  class lowering, and interpolated-string code generation) and \
                  driving the system C compiler over the result."
)]
struct Cli {
    /// HCS source file to compile.
    input: PathBuf,

    /// Output binary path. Defaults to the project config's binary_name
    /// if present, else the input file stem.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the generated C to stdout instead of invoking the C compiler.
    #[arg(long)]
    emit_c: bool,

    /// Print the parse tree as JSON and exit.
    #[arg(long)]
    emit_ast: bool,
}

fn main() {
    let cli = Cli::parse();

    // ── read input ────────────────────────────────────────────────────────────
    let source = match std::fs::read_to_string(&cli.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!(
                "{}: cannot read {}: {e}",
                "error".red().bold(),
                cli.input.display()
            );
            process::exit(2);
        }
    };

    // ── parse (the one strict boundary) ───────────────────────────────────────
    let program = match syntax::parse(&source) {
        Ok(program) => program,
        Err(e) => {
            let pos = location::Position::of(e.offset as usize, &source);
            eprintln!(
                "{}: {}:{pos}: {e}",
                "error".red().bold(),
                cli.input.display()
            );
            process::exit(1);
        }
    };

    if cli.emit_ast {
        println!(
            "{}",
            serde_json::to_string_pretty(&program).expect("parse tree is always serialisable")
        );
        return;
    }

    // ── collect + emit ────────────────────────────────────────────────────────
    let classes = collect::collect(&program);
    let c_code = emit::emit_program(&program, &classes);

    if cli.emit_c {
        print!("{c_code}");
        return;
    }

    // ── resolve the output name and link ──────────────────────────────────────
    let output = cli.output.unwrap_or_else(|| {
        match config::load_for(&cli.input).binary_name {
            Some(name) => PathBuf::from(name),
            None => PathBuf::from(
                cli.input
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "a.out".to_string()),
            ),
        }
    });

    if let Err(e) = link::build_binary(&c_code, &output) {
        eprintln!("{}: {e:#}", "error".red().bold());
        process::exit(1);
    }

    println!(
        "{}",
        format!("Compiled {} to {}", cli.input.display(), output.display()).green()
    );
}
