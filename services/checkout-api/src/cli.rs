use crate::decision::{run_decide, run_explain, DecideArgs, ExplainArgs};
use crate::server;
use checkout_decision::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Checkout Decision Engine",
    about = "Rank payment cards for a checkout and explain approval scores",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank catalog cards for a checkout context
    Decide(DecideArgs),
    /// Explain the approval score of a checkout context
    Explain(ExplainArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Decide(args) => run_decide(args),
        Command::Explain(args) => run_explain(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["checkout-api"]).expect("no arguments parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn decide_requires_a_context() {
        assert!(Cli::try_parse_from(["checkout-api", "decide"]).is_err());

        let cli = Cli::try_parse_from([
            "checkout-api",
            "decide",
            "--context",
            "config/context.sample.json",
            "--catalog",
            "config/cards.sample.csv",
        ])
        .expect("decide arguments parse");
        match cli.command {
            Some(Command::Decide(args)) => {
                assert!(args.catalog.is_some());
                assert!(args.weights.is_none());
                assert!(!args.json);
            }
            other => panic!("expected decide command, got {other:?}"),
        }
    }

    #[test]
    fn json_flag_switches_explain_output() {
        let cli = Cli::try_parse_from([
            "checkout-api",
            "explain",
            "--context",
            "config/context.sample.json",
            "--json",
        ])
        .expect("explain arguments parse");
        match cli.command {
            Some(Command::Explain(args)) => assert!(args.json),
            other => panic!("expected explain command, got {other:?}"),
        }
    }
}
