use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use brawlpick::api::state::AppState;
use brawlpick::calculate::{brawler_view, rank_maps, retain_popular, team_view, StatsView};
use brawlpick::config::AppConfig;
use brawlpick::models::{
    display_map_name, format_games, format_win_rate, parse_selected, Bucket,
    CharacterStatRecord, GameMode, MinGames, RankTier, TeamStatRecord, TrophyTier, ViewKind,
};
use brawlpick::session::{fetch_ticket, Applied, FetchTicket, Fetched, Rendered, ViewSession};
use brawlpick::storage::DatasetKey;

#[derive(Parser)]
#[command(name = "brawlpick")]
#[command(about = "Per-map brawler and team win rates from a static stats dataset")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Per-map timeout for the popularity scan (e.g. "5s", "1m")
    #[arg(long)]
    scan_timeout: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// List a mode's maps, most played first
    Maps {
        /// Game mode (e.g. "gemgrab")
        #[arg(long)]
        mode: String,

        /// Hide maps with fewer baseline games than this
        #[arg(long)]
        min_total: Option<u64>,
    },

    /// Per-brawler win rates for one map
    View {
        #[arg(long)]
        mode: String,

        #[arg(long)]
        map: String,

        /// Trophy tier (700, 800, 900, 1000)
        #[arg(long, conflicts_with = "rank")]
        trophies: Option<u32>,

        /// Rank tier (10, 13, 16, 19)
        #[arg(long)]
        rank: Option<u32>,

        /// Minimum games for the main list (100, 250, 500, 1000, 2000)
        #[arg(long)]
        min_games: Option<u64>,
    },

    /// Team win rates for one map
    Teams {
        #[arg(long)]
        mode: String,

        #[arg(long)]
        map: String,

        /// Trophy tier (700, 800, 900, 1000)
        #[arg(long)]
        trophies: Option<u32>,

        #[arg(long)]
        min_games: Option<u64>,

        /// Only teams containing this brawler (repeat up to three times)
        #[arg(long = "brawler")]
        brawlers: Vec<String>,
    },

    /// Interactive map page driven from stdin
    Browse {
        #[arg(long)]
        mode: String,

        #[arg(long)]
        map: String,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load_or_default(Path::new(&cli.config))
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(raw) = &cli.scan_timeout {
        let timeout = match brawlpick::parse_duration(raw) {
            Some(d) => d,
            None => bail!("Invalid --scan-timeout: {}", raw),
        };
        config.listing.scan_timeout_seconds = timeout.as_secs();
    }
    if let Commands::Serve { host, port } = &cli.command {
        if let Some(host) = host {
            config.server.host = host.clone();
        }
        if let Some(port) = port {
            config.server.port = *port;
        }
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(&config.log_level, cli.json_logs);

    tracing::info!("Starting brawlpick v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(&config)?;
    tracing::info!("Dataset source: {}", state.accessor.describe());

    match cli.command {
        Commands::Serve { .. } => {
            let app = brawlpick::api::build_router(state);
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Maps { mode, min_total } => {
            let mode: GameMode = mode.parse()?;
            let ranked = rank_maps(
                mode,
                state.lister.as_ref(),
                &state.accessor,
                &state.settings.scan,
            )
            .await;
            let total = ranked.len();
            let kept = retain_popular(ranked, min_total.unwrap_or(state.settings.min_total_games));

            println!("=== {} maps ===", mode.label());
            if kept.is_empty() {
                println!("No maps found.");
            }
            for (i, map) in kept.iter().enumerate() {
                println!(
                    "{:>3}. {:<28} {:>12} games",
                    i + 1,
                    display_map_name(&map.map),
                    format_games(map.total_games_played)
                );
            }
            if kept.len() < total {
                println!("\n({} maps hidden below the minimum total)", total - kept.len());
            }
        }
        Commands::View {
            mode,
            map,
            trophies,
            rank,
            min_games,
        } => {
            let mode: GameMode = mode.parse()?;
            let bucket = Bucket::from_parts(trophies, rank)?;
            let min_games = match min_games {
                Some(v) => MinGames::try_from(v)?,
                None => state.settings.default_min_games,
            };
            let key = DatasetKey::brawlers(mode, &map, bucket)?;
            let load = state.accessor.load_brawlers(&key).await;

            print_header(&key, min_games);
            print_brawlers(&brawler_view(&load.records, min_games), min_games);
        }
        Commands::Teams {
            mode,
            map,
            trophies,
            min_games,
            brawlers,
        } => {
            let mode: GameMode = mode.parse()?;
            let bucket = Bucket::from_parts(trophies, None)?;
            let min_games = match min_games {
                Some(v) => MinGames::try_from(v)?,
                None => state.settings.default_min_games,
            };
            let selected = parse_selected(&brawlers)?;
            let key = DatasetKey::teams(mode, &map, bucket)?;
            let load = state.accessor.load_teams(&key).await;

            print_header(&key, min_games);
            if !selected.is_empty() {
                println!("Containing: {}", selected.join(", "));
            }
            print_teams(&team_view(&load.records, min_games, &selected), min_games);
        }
        Commands::Browse { mode, map } => {
            let mode: GameMode = mode.parse()?;
            let session = ViewSession::new(mode, &map)?;
            browse(session, state).await?;
        }
    }

    Ok(())
}

fn print_header(key: &DatasetKey, min_games: MinGames) {
    println!(
        "\n=== {} / {} ({}) ===",
        key.mode.label(),
        display_map_name(&key.map),
        key.bucket
    );
    println!("Minimum games:    {}", format_games(min_games.value()));
}

fn print_brawlers(view: &StatsView<CharacterStatRecord>, min_games: MinGames) {
    if view.no_data {
        println!("\nNo data for this selection.");
        return;
    }
    let row = |r: &CharacterStatRecord| {
        println!(
            "  {:<16} {:>7} {:>12}",
            r.brawler,
            format_win_rate(r.win_rate),
            format_games(r.games_played)
        );
    };
    println!();
    view.primary.iter().for_each(row);
    if !view.underplayed.is_empty() {
        println!("\nLess than {} games:", format_games(min_games.value()));
        view.underplayed.iter().for_each(row);
    }
}

fn print_teams(view: &StatsView<TeamStatRecord>, min_games: MinGames) {
    if view.no_data {
        println!("\nNo data for this selection.");
        return;
    }
    let row = |r: &TeamStatRecord| {
        println!(
            "  {:<42} {:>7} {:>12}",
            r.team.join(" + "),
            format_win_rate(r.win_rate),
            format_games(r.games_played)
        );
    };
    println!();
    if view.is_empty() {
        println!("No teams match the selected brawlers.");
        return;
    }
    view.primary.iter().for_each(row);
    if !view.underplayed.is_empty() {
        println!("\nLess than {} games:", format_games(min_games.value()));
        view.underplayed.iter().for_each(row);
    }
}

const BROWSE_HELP: &str = "\
Commands:
  trophies <700|800|900|1000>   per-brawler view for a trophy tier
  rank <10|13|16|19>            per-brawler view for a rank tier
  team                          team view (trophy tier)
  min <100|250|500|1000|2000>   minimum games for the main list
  select <brawler>              add a brawler to the team filter
  deselect <brawler>            remove a brawler from the team filter
  help                          show this help
  quit                          exit";

/// Read one stdin command and turn it into a fetch for the new selection.
fn apply_command(session: &mut ViewSession, line: &str) -> Result<Option<FetchTicket>> {
    let (cmd, arg) = match line.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (line, ""),
    };

    let ticket = match cmd {
        "trophies" => {
            let tier = TrophyTier::try_from(arg.parse::<u32>()?)?;
            session.set_trophy_tier(tier);
            Some(session.set_kind(ViewKind::ByTrophies))
        }
        "rank" => {
            let tier = RankTier::try_from(arg.parse::<u32>()?)?;
            session.set_rank_tier(tier);
            Some(session.set_kind(ViewKind::ByRank))
        }
        "team" => Some(session.set_kind(ViewKind::ByTeam)),
        "min" => Some(session.set_min_games(MinGames::try_from(arg.parse::<u64>()?)?)),
        "select" => {
            let ticket = session.select(arg);
            if ticket.is_none() {
                println!("{} not added (already selected or filter full)", arg);
            }
            ticket
        }
        "deselect" => session.deselect(arg),
        "help" => {
            println!("{}", BROWSE_HELP);
            None
        }
        other => bail!("Unknown command: {} (try \"help\")", other),
    };
    Ok(ticket)
}

fn spawn_fetch(state: &AppState, ticket: FetchTicket, tx: mpsc::Sender<(FetchTicket, Fetched)>) {
    let accessor = state.accessor.clone();
    tokio::spawn(async move {
        let fetched = fetch_ticket(&accessor, &ticket).await;
        // Receiver gone means the session ended.
        let _ = tx.send((ticket, fetched)).await;
    });
}

async fn browse(mut session: ViewSession, state: AppState) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<(FetchTicket, Fetched)>(16);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "{} / {}. Type \"help\" for commands.",
        session.mode().label(),
        display_map_name(session.map())
    );
    spawn_fetch(&state, session.set_min_games(state.settings.default_min_games), tx.clone());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    break;
                }
                match apply_command(&mut session, line) {
                    Ok(Some(ticket)) => spawn_fetch(&state, ticket, tx.clone()),
                    Ok(None) => {}
                    Err(e) => println!("{}", e),
                }
            }
            Some((ticket, fetched)) = rx.recv() => {
                match session.complete(&ticket, fetched) {
                    Applied::Rendered => {
                        print_header(&ticket.key, session.selection().min_games);
                        match session.rendered() {
                            Some(Rendered::Brawlers(view)) => {
                                print_brawlers(view, session.selection().min_games)
                            }
                            Some(Rendered::Teams(view)) => {
                                let selected = session.selection().selected();
                                if !selected.is_empty() {
                                    println!("Containing: {}", selected.join(", "));
                                }
                                print_teams(view, session.selection().min_games)
                            }
                            None => {}
                        }
                    }
                    Applied::Stale => {
                        tracing::debug!(
                            "Discarding stale result for {} (generation {})",
                            ticket.key,
                            ticket.generation
                        );
                    }
                }
            }
        }
    }

    Ok(())
}
