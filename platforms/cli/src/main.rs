use clap::Parser;
use std::{
    error::Error,
    io::{self, Read, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};
use tmsim::{
    evaluate_with_limit, EngineConfig, Program, ProgramLoader, ProgramManager, Step,
    TuringMachine, Verdict, MAX_BATCH_STEPS,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// The Turing machine program file to execute
    #[clap(short, long, conflicts_with = "builtin")]
    program: Option<PathBuf>,

    /// Name of a built-in program to execute
    #[clap(short, long)]
    builtin: Option<String>,

    /// An input to run; repeat for several inputs
    #[clap(short, long)]
    input: Vec<String>,

    /// Print each step of the execution
    #[clap(short, long)]
    trace: bool,

    /// Step budget per input; runs that exceed it are rejected
    #[clap(long, default_value_t = MAX_BATCH_STEPS)]
    max_steps: usize,

    /// List the built-in programs and exit
    #[clap(short, long)]
    list: bool,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    if cli.list {
        for (index, name) in ProgramManager::list_program_names().iter().enumerate() {
            println!("{index}\t{name}");
        }
        return ExitCode::SUCCESS;
    }

    let program = match load(&cli) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let config = EngineConfig {
        max_steps: cli.max_steps,
        ..EngineConfig::default()
    };

    // No inputs means a single run on the blank tape
    let inputs = if cli.input.is_empty() {
        vec![String::new()]
    } else {
        cli.input.clone()
    };

    let mut stdout = io::stdout().lock();
    for input in &inputs {
        if cli.trace {
            if let Err(e) = trace(&mut stdout, &program, config, input) {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        } else {
            let verdict = evaluate_with_limit(&program.table, input, config.max_steps);
            if let Err(e) = writeln!(stdout, "{input}\t{verdict}") {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Resolves the program from `--program`, `--builtin`, piped stdin, or the default.
fn load(cli: &Cli) -> Result<Arc<Program>, Box<dyn Error>> {
    if let Some(path) = &cli.program {
        return Ok(Arc::new(ProgramLoader::load_program(path)?));
    }

    if let Some(name) = &cli.builtin {
        return Ok(Arc::clone(&ProgramManager::get_program_by_name(name)?.program));
    }

    if !atty::is(atty::Stream::Stdin) {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(Arc::new(ProgramLoader::load_program_from_string(&source)?));
    }

    Ok(Arc::clone(&ProgramManager::default_program()?.program))
}

/// Steps a machine on `input`, writing every state and the final verdict to `out`.
fn trace(
    out: &mut impl Write,
    program: &Arc<Program>,
    config: EngineConfig,
    input: &str,
) -> io::Result<()> {
    let mut machine = TuringMachine::with_config(Arc::clone(program), config);
    machine.load_input(input);

    write_state(out, &machine)?;

    let mut verdict = None;
    for _ in 0..config.max_steps {
        let steps = machine.step_count();
        match machine.step() {
            Step::Continue => write_state(out, &machine)?,
            Step::Halt(v) => {
                // Entering `ha` applies a rule, so the final position is new
                if machine.step_count() > steps {
                    write_state(out, &machine)?;
                }
                writeln!(out, "\nMachine halted.")?;
                verdict = Some(v);
                break;
            }
        }
    }

    let verdict = verdict.unwrap_or(Verdict::Rejected);
    match machine.last_error() {
        Some(e) => writeln!(out, "{input}\t{verdict}\t{e}"),
        None if machine.verdict().is_none() => writeln!(
            out,
            "{input}\t{verdict}\tstep budget of {} exhausted",
            config.max_steps
        ),
        None => writeln!(out, "{input}\t{verdict}"),
    }
}

fn write_state(out: &mut impl Write, machine: &TuringMachine) -> io::Result<()> {
    let end = machine
        .tape()
        .last_index()
        .map_or(machine.head(), |last| last.max(machine.head()))
        .saturating_add(1);
    let rule = machine
        .active_rule()
        .map_or_else(|| "-".to_string(), |rule| rule.label);

    writeln!(
        out,
        "Step: {}, State: {}, Head: {}, Tape: {}, Rule: {}",
        machine.step_count(),
        machine.state(),
        machine.head(),
        machine.tape().render(0, end),
        rule
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmsim::compile;

    fn trace_output(source: &str, input: &str) -> Vec<String> {
        let program = Arc::new(compile(source).unwrap());
        let mut out = Vec::new();
        trace(&mut out, &program, EngineConfig::default(), input).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_trace_shows_final_state_after_entering_ha() {
        let lines = trace_output("q0 a/b,R q0\nq0 _/x,R ha", "a");

        assert_eq!(
            lines,
            vec![
                "Step: 0, State: q0, Head: 0, Tape: a, Rule: a/b,R",
                "Step: 1, State: q0, Head: 1, Tape: b_, Rule: _/x,R",
                "Step: 2, State: ha, Head: 2, Tape: bx_, Rule: -",
                "",
                "Machine halted.",
                "a\tACCEPTED",
            ]
        );
    }

    #[test]
    fn test_trace_does_not_repeat_state_on_implicit_halt() {
        let lines = trace_output("q0 a/a,S q1", "a");

        assert_eq!(
            lines,
            vec![
                "Step: 0, State: q0, Head: 0, Tape: a, Rule: a/a,S",
                "Step: 1, State: q1, Head: 0, Tape: a, Rule: -",
                "",
                "Machine halted.",
                "a\tREJECTED\tNo transition for (q1, a)",
            ]
        );
    }
}
