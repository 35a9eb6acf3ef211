use anyhow::Result;
use clap::Parser;
use zipkart_dash::app;
use zipkart_dash::cli::{Cli, handle_command};
use zipkart_dash::tracing_setup::{Verbosity, init_subscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    init_subscriber(Verbosity::from_flags(cli.verbose, cli.quiet), cli.no_color);
    colored::control::set_override(!cli.no_color);

    if let Some(command) = cli.command.take() {
        return handle_command(command, &cli.layout, cli.viewport).await;
    }

    app::run(cli).await
}
