use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use mimalloc::MiMalloc;
use tracing_subscriber::EnvFilter;

use rs1brc::{run_with, Backend, Config, Result, Strategy};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "rs1brc")]
#[command(about = "Per-station min/mean/max of a `<station>;<reading>` file")]
#[command(version)]
struct Cli {
    #[arg(default_value = "measurements.txt")]
    input: PathBuf,

    #[arg(short, long, default_value = "fixed", help = "Accumulator: fixed or float")]
    backend: Backend,

    #[arg(short, long, default_value = "stream", help = "Reader: stream or mmap")]
    strategy: Strategy,

    #[arg(long, default_value_t = rs1brc::config::DEFAULT_WINDOW_SIZE)]
    window_size: usize,

    #[arg(short, long, env = "THREADS", default_value_t = num_cpus::get())]
    threads: usize,

    #[arg(long, help = "Chunks held by workers at once [default: 2 x threads]")]
    max_in_flight: Option<usize>,

    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(long, help = "Print elapsed time to stderr")]
    timing: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::default()
        .with_window_size(cli.window_size)
        .with_workers(cli.threads)
        .with_max_in_flight(cli.max_in_flight.unwrap_or(cli.threads * 2))
        .with_backend(cli.backend)
        .with_strategy(cli.strategy);

    let start = Instant::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with(&config, &cli.input, &mut out)?;
    writeln!(out)?;

    if cli.timing {
        eprintln!("{:?}", start.elapsed());
    }
    Ok(())
}
