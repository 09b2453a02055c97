use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use flexi_logger::{Logger, LoggerHandle};

use spofeed::{
    cli::{self, host::LocalHost},
    config::{self, SpotifyConfig},
    error,
    extension::Extension,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify (PKCE)
    Auth,

    /// Show channel metadata of a Spotify show
    Show(ShowOptions),

    /// Fetch the episodes of a Spotify show
    Episodes(EpisodesOptions),

    /// Drop a show from the metadata cache
    Forget(ShowOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ShowOptions {
    /// Show URL, e.g. https://open.spotify.com/show/<id>
    url: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EpisodesOptions {
    /// Show URL, e.g. https://open.spotify.com/show/<id>
    url: String,

    /// Maximum number of episodes (1-50, 0 for the maximum)
    #[clap(long, default_value_t = 0)]
    max: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_logging() -> Option<LoggerHandle> {
    Logger::try_with_env_or_str("info")
        .and_then(|logger| logger.log_to_stderr().start())
        .map_err(|e| eprintln!("Cannot start logger: {e}"))
        .ok()
}

fn main() {
    let _logger = init_logging();

    if let Err(e) = config::load_env() {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command_for_update();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let mut host = LocalHost::new();
    let mut extension = Extension::from_config(SpotifyConfig::from_env());
    extension.on_load(&mut host);

    match cli.command {
        Command::Auth => cli::auth(&mut extension),
        Command::Show(opt) => cli::show(&host, &opt.url),
        Command::Episodes(opt) => cli::episodes(&extension, &host, &opt.url, opt.max),
        Command::Forget(opt) => cli::forget(&extension, &opt.url),
        Command::Completions(_) => {}
    }

    extension.on_unload(&mut host);
}
