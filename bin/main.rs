#[macro_use]
extern crate log;

use clap::{Parser, Subcommand, ValueEnum};
use log::{LevelFilter, Metadata, Record};
use ripple::analysis::ai::interpreter::entry_state;
use ripple::analysis::ai::{Domain, IntervalDomain, Interpreter, LogObserver, SignDomain};
use ripple::analysis::build_call_graph;
use ripple::il::{MethodSignature, Program, ProgramCounter};
use ripple::loader::load_program;
use ripple::prediction::{AbstractPredictor, CallGraphPredictor, TestPredictor};
use ripple::Error;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process;

/// Predict which tests of a JVM program a change may affect.
#[derive(Parser, Debug)]
#[command(name = "ripple", version)]
struct Cli {
    /// Log more, `-vv` for traces of the interpreter
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tests of the new snapshot which may be affected
    Predict {
        #[arg(value_enum)]
        predictor: PredictorKind,
        #[arg(long, value_name = "DIR")]
        old: PathBuf,
        #[arg(long, value_name = "DIR")]
        new: PathBuf,
        /// Print predictions as a JSON array
        #[arg(long)]
        json: bool,
    },
    /// Interpret methods of a snapshot and print what they reach
    Interpret {
        #[arg(value_enum)]
        domain: DomainKind,
        #[arg(long, value_name = "DIR")]
        program: PathBuf,
        /// Only interpret methods whose signature contains this text
        #[arg(long, value_name = "TEXT")]
        select: Option<String>,
    },
    /// Print the static call graph of a snapshot
    CallGraph {
        #[arg(long, value_name = "DIR")]
        program: PathBuf,
        /// Print the graph in graphviz dot format
        #[arg(long)]
        dot: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PredictorKind {
    Callgraph,
    Sign,
    Interval,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DomainKind {
    Sign,
    Interval,
}

/// Logs to stderr, stdout carries results.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{} - {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn load(path: &Path) -> Result<Program, Error> {
    info!("loading {}", path.display());
    load_program(path)
}

fn predict(
    kind: PredictorKind,
    old: &Path,
    new: &Path,
    json: bool,
) -> Result<(), Error> {
    let old = load(old)?;
    let new = load(new)?;

    let predictor: Box<dyn TestPredictor> = match kind {
        PredictorKind::Callgraph => Box::new(CallGraphPredictor::new()),
        PredictorKind::Sign => Box::new(AbstractPredictor::sign()),
        PredictorKind::Interval => Box::new(AbstractPredictor::interval()),
    };
    let predictions = predictor.predict(&old, &new)?;

    if json {
        let names = predictions
            .iter()
            .map(|test| test.to_string())
            .collect::<Vec<String>>();
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for test in &predictions {
            println!("{}", test);
        }
    }

    Ok(())
}

fn interpret_method<D: Domain>(
    program: &Program,
    signature: &MethodSignature,
    domain: D,
) -> Result<(), Error> {
    let initial = entry_state(signature, &domain)?;
    let mut interpreter = Interpreter::with_observer(program, domain, LogObserver);
    let touched = interpreter.analyse(ProgramCounter::entry(signature.clone()), initial)?;

    println!("{}", signature);
    for (method, offsets) in &touched {
        let offsets = offsets
            .iter()
            .map(|offset| offset.to_string())
            .collect::<Vec<String>>();
        println!("  reaches {} at {}", method, offsets.join(" "));
    }
    for (pc, state) in interpreter.terminal_states() {
        println!("  ends at {} in {}", pc, state);
    }
    for error in interpreter.errors() {
        println!("  may fail with {}", error);
    }
    println!("  {} states generated", interpreter.generated());

    Ok(())
}

fn interpret(kind: DomainKind, path: &Path, select: Option<&str>) -> Result<(), Error> {
    let program = load(path)?;

    let signatures = program
        .all_methods()
        .map(|method| method.signature().clone())
        .filter(|signature| select.map_or(true, |text| signature.to_string().contains(text)))
        .collect::<BTreeSet<MethodSignature>>();

    for signature in &signatures {
        let result = match kind {
            DomainKind::Sign => interpret_method(&program, signature, SignDomain::new()),
            DomainKind::Interval => {
                interpret_method(&program, signature, IntervalDomain::for_program(&program))
            }
        };
        match result {
            Ok(()) => {}
            Err(error) if error.is_unsupported() => warn!("skipping {}: {}", signature, error),
            Err(error) => return Err(error),
        }
    }

    Ok(())
}

fn call_graph(path: &Path, dot: bool) -> Result<(), Error> {
    let program = load(path)?;
    let call_graph = build_call_graph(&program)?;

    if dot {
        println!("{}", call_graph.dot_graph());
        return Ok(());
    }

    for method in call_graph.methods() {
        println!("{}", method);
        for callee in call_graph.callees(method)? {
            println!("  -> {}", callee);
        }
    }

    Ok(())
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Predict {
            predictor,
            old,
            new,
            json,
        } => predict(predictor, &old, &new, json),
        Command::Interpret {
            domain,
            program,
            select,
        } => interpret(domain, &program, select.as_deref()),
        Command::CallGraph { program, dot } => call_graph(&program, dot),
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }

    if let Err(error) = run(cli) {
        eprintln!("error: {}", error);
        process::exit(1);
    }
}
