#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::sync::Arc;

#[cfg(feature = "std")]
use battleship_client::{
    init_logging, service::http::DEFAULT_BASE_URL, ClientError, GameService, HttpGameService,
    MatchRequest, Opponent, RetryPolicy, SessionConfig, SessionController, TerminalPresenter,
};
#[cfg(feature = "std")]
use clap::{Parser, Subcommand};
#[cfg(feature = "std")]
use log::{error, info};
#[cfg(feature = "std")]
use tokio::time::Duration;
#[cfg(feature = "std")]
use tokio_util::sync::CancellationToken;

/// Pause before a failed session is set up again.
#[cfg(feature = "std")]
const RESTART_DELAY: Duration = Duration::from_secs(3);

#[derive(Parser)]
#[command(author, version, about = "Play battleship against a remote game server", long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    /// Base URL of the game server API.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    server: String,
    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,
    #[arg(long, default_value = "rust_player")]
    nick: String,
    #[arg(long, default_value = "Plays from the terminal")]
    desc: String,
    /// Stop after this many games instead of rematching forever.
    #[arg(long)]
    games: Option<u32>,
    /// Attempts per service call.
    #[arg(long, default_value_t = 3)]
    retries: u32,
    /// Give up after this many failed session setups.
    #[arg(long, default_value_t = 5)]
    max_restarts: u32,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[cfg(feature = "std")]
enum Commands {
    /// Play against the server's bot.
    Bot,
    /// Challenge a player waiting in the lobby.
    Challenge { opponent: String },
    /// Wait in the lobby until someone challenges us.
    Wait,
    /// List players waiting in the lobby.
    Lobby,
    /// Show the leaderboard.
    Leaderboard,
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let service = Arc::new(HttpGameService::new(
        cli.server.clone(),
        Duration::from_secs(cli.timeout),
    )?);
    let retry = RetryPolicy::new(cli.retries);

    let opponent = match cli.command {
        Commands::Lobby => {
            let players = retry.run("lobby", || service.waiting_players()).await?;
            if players.is_empty() {
                println!("Nobody is waiting right now.");
            }
            for p in players {
                println!("{:<20} {}", p.nick, p.status);
            }
            return Ok(());
        }
        Commands::Leaderboard => {
            let stats = retry.run("leaderboard", || service.leaderboard()).await?;
            println!("{:>4}  {:<20} {:>6} {:>6} {:>6}", "rank", "nick", "games", "wins", "points");
            for s in stats {
                println!(
                    "{:>4}  {:<20} {:>6} {:>6} {:>6}",
                    s.rank, s.nick, s.games, s.wins, s.points
                );
            }
            return Ok(());
        }
        Commands::Bot => Opponent::Bot,
        Commands::Challenge { opponent } => Opponent::Player(opponent),
        Commands::Wait => Opponent::AnyChallenger,
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, leaving the game");
            on_signal.cancel();
        }
    });

    let mut config = SessionConfig::default().with_retry(retry);
    if let Some(games) = cli.games {
        config = config.with_max_games(games);
    }
    let request = MatchRequest::new(cli.nick, cli.desc, opponent);
    let service: Arc<dyn GameService> = service;
    let presenter = Arc::new(TerminalPresenter::new());

    let mut failures = 0;
    loop {
        let mut controller =
            SessionController::new(Arc::clone(&service), presenter.clone(), request.clone(), config.clone());
        match controller.run(&cancel).await {
            Ok(summaries) => {
                let wins = summaries
                    .iter()
                    .filter(|s| s.outcome == battleship_client::GameOutcome::Win)
                    .count();
                println!("Played {} games, won {}.", summaries.len(), wins);
                return Ok(());
            }
            Err(ClientError::Cancelled) => return Ok(()),
            Err(e) => {
                failures += 1;
                error!("Session failed ({}/{}): {}", failures, cli.max_restarts, e);
                if failures >= cli.max_restarts {
                    return Err(e.into());
                }
            }
        }
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            _ = tokio::time::sleep(RESTART_DELAY) => {}
        }
    }
}
