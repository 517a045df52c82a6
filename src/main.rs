mod cli;
mod path_de;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // stdout carries the documents, so logs go to stderr
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "schema_clarify=warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
