use std::io::{self, stdin};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use crossterm::tty::IsTty;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use typer::{
    cli::Cli,
    config::{ConfigStore, FileConfigStore, Settings},
    error::TyperError,
    report,
    runtime::{InputSource, ReaderSource, Runner, SystemClock, TerminalSource},
    session,
};

fn main() -> ExitCode {
    init_logging();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            let _ = Cli::command().print_help();
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(err),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("typer=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn fail(err: TyperError) -> ExitCode {
    let _ = report::error(&mut io::stderr(), &err);
    ExitCode::from(err.exit_code())
}

fn run(cli: &Cli) -> typer::Result<()> {
    let store = cli
        .config_path
        .as_ref()
        .map(FileConfigStore::with_path)
        .unwrap_or_default();
    let config = cli.apply(store.load());
    let settings = config.validate(cli.seed)?;

    if cli.save_config {
        match store.save(&config) {
            Ok(()) => debug!(path = %store.path().display(), "defaults saved"),
            Err(err) => warn!(path = %store.path().display(), %err, "could not save defaults"),
        }
    }

    let dictionary = settings.dictionary.load(settings.dictionary_size)?;

    if stdin().is_tty() {
        test_with(&settings, &dictionary, TerminalSource::terminal())
    } else {
        test_with(&settings, &dictionary, ReaderSource::new(stdin().lock()))
    }
}

fn test_with<S: InputSource>(
    settings: &Settings,
    dictionary: &typer::dictionary::Dictionary,
    source: S,
) -> typer::Result<()> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut runner = Runner::new(source, SystemClock);
    session::run(settings, dictionary, &mut rng, &mut runner, &mut io::stdout().lock())?;
    Ok(())
}
