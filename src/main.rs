use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio_util::sync::CancellationToken;

use spotlib::{cli, config, error, logging, management::SessionManager, warning};

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
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in to Spotify in the browser
    Login,

    /// Show the current session
    Status,

    /// Forget the stored token
    Logout,

    /// List your playlists
    Playlists,

    /// List your saved tracks
    Saved(OutputOptions),

    /// Show a playlist and its tracks
    Playlist(PlaylistOptions),

    /// Show or override the Spotify client credentials
    Credentials(CredentialsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct OutputOptions {
    /// Print canonical track records as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistOptions {
    /// Spotify playlist id
    id: String,

    /// Print the playlist and its tracks as JSON
    #[clap(long)]
    json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CredentialsOptions {
    /// Client id override; pass an empty string to clear it
    #[clap(long)]
    client_id: Option<String>,

    /// Client secret override; pass an empty string to clear it
    #[clap(long)]
    client_secret: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }
    if let Err(e) = logging::init() {
        warning!("{}", e);
    }

    let cli = Cli::parse();

    let session = SessionManager::new(config::Config::from_env());
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    match cli.command {
        Command::Login => cli::login(&session, &cancel).await,
        Command::Status => cli::status(&session, &cancel).await,
        Command::Logout => cli::logout(&session).await,
        Command::Playlists => cli::playlists(&session, &cancel).await,
        Command::Saved(opt) => cli::saved(&session, &cancel, opt.json).await,
        Command::Playlist(opt) => cli::playlist(&session, &cancel, &opt.id, opt.json).await,
        Command::Credentials(opt) => {
            cli::credentials(session.config(), opt.client_id, opt.client_secret).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
