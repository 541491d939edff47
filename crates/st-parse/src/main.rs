use clap::Parser;
use tracing_subscriber::EnvFilter;

use st_parse::{run, Args};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(&args, &mut out) {
        Ok(summary) if summary.success() => {}
        Ok(_) => std::process::exit(1),
        Err(err) => {
            eprintln!("st-parse: {err:#}");
            std::process::exit(2);
        }
    }
}
