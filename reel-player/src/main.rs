//! Reel Player (reel-player) - Main entry point
//!
//! Terminal driver for the reel playback engine: loads an article feed,
//! narrates it with the simulated speech engine and maps stdin commands to
//! taps, scrolls and feed changes.
//!
//! Commands:
//! - `t`: tap (play/pause)
//! - `s N`: scroll to reel N
//! - `c CATEGORY`: switch category (`c` alone shows every category)
//! - `/ TEXT`: search (`/` alone clears the search)
//! - `v`: print the current view
//! - `q`: quit

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use reel_common::feed::{is_known_category, FeedQuery, CATEGORIES};
use reel_common::item::load_articles;
use reel_common::{Article, ReelEvent, ReelSet};
use reel_player::config::{ConfigOverrides, PlayerConfig};
use reel_player::narration::SimulatedSpeech;
use reel_player::viewport::ViewportTracker;
use reel_player::{ReelEngine, ReelHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Height of one reel (and of the viewport) in the simulated layout
const REEL_HEIGHT: f64 = 800.0;

/// Command-line arguments for reel-player
#[derive(Parser, Debug)]
#[command(name = "reel-player")]
#[command(about = "Narrated news reels in the terminal")]
#[command(version)]
struct Args {
    /// JSON file holding the article feed
    #[arg(short, long, env = "REELS_ARTICLES")]
    articles: PathBuf,

    /// Configuration file (overrides REELS_CONFIG and the default location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial category filter
    #[arg(long)]
    category: Option<String>,

    /// Initial search text
    #[arg(long)]
    search: Option<String>,

    /// Country code filter
    #[arg(long, env = "REELS_COUNTRY")]
    country: Option<String>,

    /// Gap between narrations in milliseconds
    #[arg(long)]
    advance_delay_ms: Option<u64>,

    /// Simulated speaking rate
    #[arg(long)]
    words_per_minute: Option<u32>,

    /// Locale used when the script of a reel is not recognised
    #[arg(long)]
    locale: Option<String>,

    /// Log level for the reels crates
    #[arg(long, env = "REELS_LOG_LEVEL")]
    log_level: Option<String>,
}

fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("reel_player={level},reel_common={level}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise start at info and switch to the configured
    // level once the config file has been read
    let from_env = EnvFilter::try_from_default_env().ok();
    let env_override = from_env.is_some();
    let (filter, filter_handle) = reload::Layer::new(
        from_env.unwrap_or_else(|| level_filter(args.log_level.as_deref().unwrap_or("info"))),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PlayerConfig::load(
        args.config.as_deref(),
        ConfigOverrides {
            auto_advance_delay_ms: args.advance_delay_ms,
            words_per_minute: args.words_per_minute,
            default_locale: args.locale.clone(),
            log_level: args.log_level.clone(),
        },
    )
    .context("Failed to load configuration")?;

    if !env_override {
        if let Err(e) = filter_handle.reload(level_filter(&config.log_level)) {
            warn!("Could not apply log level {}: {}", config.log_level, e);
        }
    }

    let articles = load_articles(&args.articles)
        .with_context(|| format!("Failed to load articles from {}", args.articles.display()))?;
    info!("Loaded {} articles from {}", articles.len(), args.articles.display());

    let mut query = FeedQuery::default();
    if let Some(category) = args.category {
        query = query.with_category(category);
    }
    if let Some(search) = args.search {
        query = query.with_search(search);
    }
    if let Some(country) = args.country {
        query = query.with_country(country);
    }

    let (engine, handle) = ReelEngine::new(SimulatedSpeech::new(config.words_per_minute), &config);
    let events = handle.subscribe();
    let engine_task = tokio::spawn(engine.run());

    let (scroll_tx, scroll_rx) = mpsc::unbounded_channel();
    let presenter = tokio::spawn(present(
        handle.clone(),
        events,
        scroll_rx,
        config.visibility_threshold,
    ));

    handle.replace_reels(reel_set(&articles, &query));
    print_help();

    tokio::select! {
        result = read_commands(&handle, &articles, &mut query, &scroll_tx) => {
            result.context("Failed to read commands")?;
        }
        _ = shutdown_signal() => {}
    }

    handle.dispose();
    drop(handle);
    engine_task.await.context("Reel engine task failed")?;
    presenter.abort();

    info!("Reel player stopped");
    Ok(())
}

fn reel_set(articles: &[Article], query: &FeedQuery) -> ReelSet {
    let reels = ReelSet::from_articles(query.apply(articles));
    info!(
        "Feed {:?} / {:?}: {} narratable reels",
        query.category, query.search, reels.len()
    );
    for (index, reel) in reels.iter().enumerate() {
        debug!("  [{}] {} ({})", index, reel.title, reel.identity);
    }
    reels
}

/// Map stdin lines onto handle commands until `q` or end of input
async fn read_commands(
    handle: &ReelHandle,
    articles: &[Article],
    query: &mut FeedQuery,
    scroll_tx: &mpsc::UnboundedSender<usize>,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(c, r)| (c, r.trim()))
            .unwrap_or((line, ""));

        match command {
            "" => {}
            "t" => handle.toggle_play_pause(),
            "s" => match rest.parse::<usize>() {
                Ok(index) => {
                    if scroll_tx.send(index).is_err() {
                        debug!("Presenter stopped; dropping scroll to {}", index);
                    }
                }
                Err(_) => println!("usage: s <reel number>"),
            },
            "c" if rest.is_empty() => {
                query.category = None;
                handle.replace_reels(reel_set(articles, query));
            }
            "c" if is_known_category(rest) => {
                query.category = Some(rest.to_lowercase());
                handle.replace_reels(reel_set(articles, query));
            }
            "c" => println!("unknown category; one of: {}", CATEGORIES.join(", ")),
            "/" => {
                *query = query.clone().with_search(rest);
                handle.replace_reels(reel_set(articles, query));
            }
            "v" => match serde_json::to_string(&handle.view()) {
                Ok(view) => println!("{}", view),
                Err(e) => warn!("Could not render view: {}", e),
            },
            "q" => break,
            _ => print_help(),
        }
    }

    Ok(())
}

fn print_help() {
    println!("commands: t (play/pause) | s N (scroll) | c [CATEGORY] | / [TEXT] | v (view) | q (quit)");
}

/// Stand-in presentation layer
///
/// Owns the viewport: honours scroll requests from the engine and from the
/// user, and reports what settles into view back to the engine.
async fn present(
    handle: ReelHandle,
    mut events: broadcast::Receiver<ReelEvent>,
    mut user_scrolls: mpsc::UnboundedReceiver<usize>,
    threshold: f64,
) {
    let mut viewport = ViewportTracker::new(REEL_HEIGHT, threshold);

    loop {
        let target = tokio::select! {
            event = events.recv() => match event {
                Ok(ReelEvent::ReelSetLoaded { item_count, .. }) => {
                    viewport = ViewportTracker::uniform(item_count, REEL_HEIGHT, REEL_HEIGHT, threshold);
                    println!("{} reels loaded", item_count);
                    continue;
                }
                Ok(ReelEvent::NoNarratableContent { .. }) => {
                    println!("No news found");
                    continue;
                }
                Ok(ReelEvent::ScrollRequested { index, .. }) => index,
                Ok(ReelEvent::ActiveReelChanged { index: Some(index), identity, .. }) => {
                    println!("> reel {} {}", index, identity.unwrap_or_default());
                    continue;
                }
                Ok(ReelEvent::IconVisibilityChanged { visible: true, .. }) => {
                    let glyph = if handle.view().is_playing { "||" } else { ">" };
                    println!("[{}]", glyph);
                    continue;
                }
                Ok(ReelEvent::Disposed { .. }) | Err(broadcast::error::RecvError::Closed) => break,
                Ok(other) => {
                    debug!("Presenter event: {:?}", other);
                    continue;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Presenter lagged {} events", skipped);
                    continue;
                }
            },
            Some(index) = user_scrolls.recv() => index,
        };

        let Some(offset) = viewport.offset_of(target) else {
            println!("no reel {}", target);
            continue;
        };
        if let Some(visible) = viewport.observe(offset) {
            handle.on_scroll_to_index(visible);
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
