use rigel_starlark::toolchain;
use rigel_starlark::toolchain::diagnostics::DiagnosticConsumer;

const HELP: &str = "\
    starc - the Rigel Starlark compiler

    USAGE:
        starc [--phase PHASE] [--quiet] FILENAME

    OPTIONS:
        --phase PHASE       Which compilation phase to take the compilation through. PHASE must
                            currently be 'lex'.
        --quiet             If present, all non-error output is suppressed.

    ARGS:
        FILENAME            The path to the Starlark file to compile.
";

#[derive(Debug, Eq, PartialEq)]
enum CompilationPhase {
    Lex,
}

#[derive(Debug, Eq, PartialEq)]
struct StarcArgs {
    phase: Option<CompilationPhase>,
    quiet: bool,
    source_file: std::path::PathBuf,
}

fn main() {
    let args = match parse_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            std::process::exit(1);
        }
    };

    let source = toolchain::source::SourceBuffer::new_from_file(&args.source_file);
    if source.is_err() {
        eprintln!(
            "Error opening source file {}: {}",
            args.source_file.display(),
            source.err().unwrap()
        );
        std::process::exit(1);
    }
    let source = source.unwrap();

    let mut diags = toolchain::diagnostics::diagnostic_emitter::console_diagnostic_consumer();
    let options = toolchain::lexer::LexOptions::default();
    let tb = toolchain::lexer::TokenizedBuffer::tokenize(&source, options, &mut diags);
    if args.phase == Some(CompilationPhase::Lex) || args.phase.is_none() {
        if !args.quiet {
            println!("TokenizedBuffer [");
            tb.print_tokens();
            println!("]");
        }
    }
    diags.flush();
}

fn parse_args() -> Result<StarcArgs, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        std::process::exit(0);
    }

    let args = StarcArgs {
        phase: pargs.opt_value_from_fn("--phase", parse_phase)?,
        quiet: pargs.contains("--quiet"),
        source_file: pargs.free_from_str()?,
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        eprintln!("Error: unused arguments left: {:?}.", remaining);
        std::process::exit(1);
    }
    Ok(args)
}

fn parse_phase(s: &str) -> Result<CompilationPhase, &'static str> {
    match s {
        "lex" => Ok(CompilationPhase::Lex),
        _ => Err("unrecognized compilation phase."),
    }
}
