use std::io::Write;

use clap::Parser;
use nmea_cksum::{Classifier, Config, charcode};
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "\
Invalid sentences are marked with '#' signs.

Usage examples:
  cat DATA0001.DAT | nmea-cksum | grep -v '#'   # filter invalid data
  cat DATA0001.DAT | nmea-cksum -a              # append missing checksums";

/// Validate or append NMEA checksums in OpenSeaMap logger files
#[derive(Parser, Debug)]
#[command(version, after_help = EXAMPLES)]
struct Args {
    /// Append missing checksums instead of marking them with '##'
    #[arg(short, long)]
    append: bool,
    /// Write a trace line per input byte to stderr
    #[arg(short, long, value_name = "LEVEL", default_value_t = 0)]
    debug: u32,
    /// Separator between binary message header and body
    #[arg(short, long)]
    separator: Option<String>,
    /// Print the character code of an argument and exit
    #[arg(short = 'c', long, value_name = "STR")]
    code: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging();

    if let Some(code) = &args.code {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&charcode::describe(code))?;
        stdout.flush()?;
        return Ok(());
    }

    let config = Config::default()
        .append(args.append)
        .debug_level(args.debug)
        .separator(args.separator);

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    let stderr = std::io::stderr().lock();
    match Classifier::new(config).run(stdin, stdout, stderr) {
        Ok(stats) => {
            tracing::info!(
                bytes = stats.bytes,
                sentences = stats.sentences,
                verified = stats.verified,
                flagged = stats.flagged(),
                appended = stats.appended,
                "done"
            );
            Ok(())
        }
        // reader went away, e.g. `| head`
        Err(e) if is_broken_pipe(&e) => Ok(()),
        Err(e) => Err(e),
    }
}

// `-d` traces go to stderr too, so the filter only follows RUST_LOG
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

fn is_broken_pipe(e: &anyhow::Error) -> bool {
    e.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|e| e.kind() == std::io::ErrorKind::BrokenPipe)
    })
}
