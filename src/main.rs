use std::io::{self, Write};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use salmon_rules::{EnPassantPolicy, Session};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// When a pawn becomes capturable en passant
    #[arg(long, value_enum, default_value_t = EnPassantRule::DoubleStep)]
    en_passant: EnPassantRule,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EnPassantRule {
    /// Only right after a two-square advance (standard rules)
    DoubleStep,
    /// After every pawn move, until another pawn moves
    EveryPawnMove,
}

impl From<EnPassantRule> for EnPassantPolicy {
    fn from(rule: EnPassantRule) -> Self {
        match rule {
            EnPassantRule::DoubleStep => EnPassantPolicy::DoubleStepOnly,
            EnPassantRule::EveryPawnMove => EnPassantPolicy::EveryPawnMove,
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .target(env_logger::Target::Stderr)
    .init();

    if let Err(e) = run(args.en_passant.into()) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

fn run(policy: EnPassantPolicy) -> Result<()> {
    log::info!("starting with en passant policy {:?}", policy);
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(policy).run(stdin.lock(), stdout.lock())
}
