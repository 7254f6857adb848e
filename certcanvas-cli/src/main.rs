//! # certcanvas
//!
//! Command-line tool for certificate templates.

use certcanvas_cli::{run, CliArgs, LogFormat};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_format);

    tracing::debug!("Running {:?}", args.command);
    let stdout = std::io::stdout();
    run(args, &mut stdout.lock())
}

/// Initialize tracing on stderr.
///
/// Set `RUST_LOG` to control log levels (default: `certcanvas=info`).
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "certcanvas=info,certcanvas_cli=info,certcanvas_core=info,certcanvas_renderer=info",
        )
    });

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init(),
        LogFormat::Plain => tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init(),
    }
}
