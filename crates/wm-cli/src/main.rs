mod commands;
mod opts;
mod output;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::access::{ActivateArgs, OnboardArgs, RouteArgs};
use commands::ask::AskCommand;
use commands::backup::{BackupCommand, CsvCommand};
use commands::goal::GoalCommand;
use commands::investment::InvestmentCommand;
use commands::prefs::{LanguageCommand, MoodCommand};
use commands::serve::ServeArgs;
use commands::tx::TxCommand;
use commands::wheel::{ReflectCommand, WheelCommand};
use opts::GlobalOpts;

#[derive(Parser, Debug)]
#[command(name = "wealthmap", version, about = "The Wealth Map: personal finance coach")]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Activate a license key
    Activate(ActivateArgs),

    /// Choose the display name
    Onboard(OnboardArgs),

    /// Show session state and a short summary
    Status,

    /// Forget the license key (data is kept)
    SignOut,

    /// Show what the route guard does for a path
    Route(RouteArgs),

    /// Financial goals
    #[command(subcommand)]
    Goal(GoalCommand),

    /// Income and expenses
    #[command(subcommand)]
    Tx(TxCommand),

    /// Wealth wheel self-assessment
    #[command(subcommand)]
    Wheel(WheelCommand),

    /// Money story reflections
    #[command(subcommand)]
    Reflect(ReflectCommand),

    /// Investment holdings
    #[command(subcommand)]
    Investment(InvestmentCommand),

    /// Daily money mood
    #[command(subcommand)]
    Mood(MoodCommand),

    /// Interface language
    #[command(subcommand)]
    Language(LanguageCommand),

    /// Backup and restore
    #[command(subcommand)]
    Backup(BackupCommand),

    /// Spreadsheet export
    #[command(subcommand)]
    Csv(CsvCommand),

    /// AI coaching through the proxy
    #[command(subcommand)]
    Ask(AskCommand),

    /// Run the AI proxy server
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let opts = &cli.opts;
    util::setup_logging();
    util::load_data_env(&opts.data_root()?)?;

    match &cli.command {
        Command::Activate(args) => commands::access::cmd_activate(opts, args),
        Command::Onboard(args) => commands::access::cmd_onboard(opts, args),
        Command::Status => commands::access::cmd_status(opts),
        Command::SignOut => commands::access::cmd_sign_out(opts),
        Command::Route(args) => commands::access::cmd_route(opts, args),
        Command::Goal(cmd) => commands::goal::cmd_goal(opts, cmd),
        Command::Tx(cmd) => commands::tx::cmd_tx(opts, cmd),
        Command::Wheel(cmd) => commands::wheel::cmd_wheel(opts, cmd),
        Command::Reflect(cmd) => commands::wheel::cmd_reflect(opts, cmd),
        Command::Investment(cmd) => commands::investment::cmd_investment(opts, cmd),
        Command::Mood(cmd) => commands::prefs::cmd_mood(opts, cmd),
        Command::Language(cmd) => commands::prefs::cmd_language(opts, cmd),
        Command::Backup(cmd) => commands::backup::cmd_backup(opts, cmd),
        Command::Csv(cmd) => commands::backup::cmd_csv(opts, cmd),
        Command::Ask(cmd) => commands::ask::cmd_ask(opts, cmd).await,
        Command::Serve(args) => commands::serve::cmd_serve(opts, args).await,
    }
}
