/// Melo - headless music client
use anyhow::Context;
use clap::{Parser, Subcommand};
use melo_catalog::{AlbumDetails, CatalogClient};
use melo_core::{TracklistContext, TracklistRef, UserId};
use melo_cli::{CliError, MeloConfig, SimulatedDevice};
use melo_playback::{PlaybackEvent, PlaybackStatus};
use melo_session::{SessionManager, SessionServices, UserSession};
use melo_sync::MemoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long `play --save` waits for the library to confirm the new members
const LIBRARY_ECHO_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "melo")]
#[command(about = "Browse the Melo catalog and play albums headlessly", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the home feed sections
    Home,
    /// Search albums by keyword
    Search {
        keyword: String,
        /// Catalog language
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Show an album and its tracks
    Album {
        /// Album page URL
        url: String,
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Show trending albums and top directors for a language
    Language {
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Play an album from its first track to its end
    Play {
        /// Album page URL
        url: String,
        #[arg(short, long)]
        lang: Option<String>,
        /// User to sign in as (defaults to session.user_id, then "local")
        #[arg(short, long)]
        user: Option<String>,
        /// Simulated length of every track in milliseconds
        #[arg(long, default_value_t = 3000)]
        track_ms: u64,
        /// Add the album's tracks to the library before playing
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "melo=info,melo_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = MeloConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let catalog = CatalogClient::new(config.catalog_config())?;

    match cli.command {
        Commands::Home => home(&catalog).await,
        Commands::Search { keyword, lang } => search(&catalog, &keyword, lang.as_deref()).await,
        Commands::Album { url, lang } => {
            let album = fetch_album(&catalog, &url, lang.as_deref()).await?;
            print_album(&album);
            Ok(())
        }
        Commands::Language { lang } => language(&catalog, lang.as_deref()).await,
        Commands::Play {
            url,
            lang,
            user,
            track_ms,
            save,
        } => {
            let user = user
                .or_else(|| config.session.user_id.clone())
                .unwrap_or_else(|| "local".to_string());
            let album = fetch_album(&catalog, &url, lang.as_deref()).await?;
            play(&config, album, &url, UserId::new(user), track_ms, save).await
        }
    }
}

async fn home(catalog: &CatalogClient) -> anyhow::Result<()> {
    let feed = catalog
        .home_feed()
        .await
        .context("Home feed is not available")?;

    for (section, albums) in feed {
        println!("{}", section);
        for album in albums {
            println!("  {}  ({})", album.title, album.page_url);
        }
    }
    Ok(())
}

async fn search(catalog: &CatalogClient, keyword: &str, lang: Option<&str>) -> anyhow::Result<()> {
    let results = catalog.search(keyword, lang).await;
    if results.is_empty() {
        println!("No albums found for {:?}", keyword);
    }
    for album in results {
        println!("{}  ({})", album.title, album.page_url);
    }
    Ok(())
}

async fn language(catalog: &CatalogClient, lang: Option<&str>) -> anyhow::Result<()> {
    let home = catalog
        .language_home(lang)
        .await
        .context("Language home is not available")?;

    println!("Trending");
    for link in home.trending {
        println!("  {}  ({})", link.title, link.path);
    }
    println!("Top directors");
    for link in home.top_directors {
        println!("  {}  ({})", link.title, link.path);
    }
    Ok(())
}

async fn fetch_album(
    catalog: &CatalogClient,
    url: &str,
    lang: Option<&str>,
) -> Result<AlbumDetails, CliError> {
    catalog
        .album_details(url, lang)
        .await
        .ok_or_else(|| CliError::AlbumUnavailable(url.to_string()))
}

fn print_album(album: &AlbumDetails) {
    println!("{} [{}]", album.display_name(), album.lang);
    for (index, track) in album.tracks.iter().enumerate() {
        println!("  {:>2}. {}  {}", index + 1, track.title, track.artists);
    }
}

async fn play(
    config: &MeloConfig,
    album: AlbumDetails,
    url: &str,
    user: UserId,
    track_ms: u64,
    save: bool,
) -> anyhow::Result<()> {
    let Some(first) = album.tracks.first().cloned() else {
        println!("{} has no playable tracks", album.display_name());
        return Ok(());
    };

    let services = SessionServices {
        device: Arc::new(SimulatedDevice::new(
            Duration::from_millis(track_ms),
            Duration::from_millis(250),
        )),
        store: Arc::new(MemoryStore::new()),
    };
    let manager = SessionManager::new(services, config.session_config());
    let session = manager.sign_in(user).await?;
    info!(user = %session.user(), album = %album.title, "Signed in");

    if save {
        save_to_library(&session, &album).await;
    }

    let context = TracklistContext::new(
        album.tracks.clone(),
        Some(TracklistRef::new(url, album.lang.clone())),
    );
    session
        .controller()
        .load(first, Some(context))
        .await
        .map_err(CliError::from)?;

    follow_playback(&session).await;

    println!("Recently heard");
    for entry in session.recent() {
        println!(
            "  {}  {}",
            entry.last_heard_at.format("%H:%M:%S"),
            entry.track.title
        );
    }

    manager.sign_out().await;
    Ok(())
}

async fn save_to_library(session: &UserSession, album: &AlbumDetails) {
    let library = session.library();
    let mut view = library.subscribe();

    for track in &album.tracks {
        if let Err(e) = library.add(track).await {
            warn!(track_id = %track.id, error = %e, "Could not save track");
        }
    }

    let expected = album.tracks.len();
    let confirmed = tokio::time::timeout(LIBRARY_ECHO_TIMEOUT, async {
        while view.borrow_and_update().len() < expected {
            if view.changed().await.is_err() {
                break;
            }
        }
    })
    .await;

    if confirmed.is_err() {
        warn!("Library did not confirm all saved tracks in time");
    }
    println!("Library holds {} tracks", library.len());
}

/// Print playback events until the tracklist runs out
async fn follow_playback(session: &UserSession) {
    let controller = session.controller();
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    loop {
        ticker.tick().await;

        for event in controller.drain_events().await {
            match event {
                PlaybackEvent::TrackChanged { track_id, .. } => {
                    let title = controller
                        .session()
                        .await
                        .current_track
                        .map(|t| t.title)
                        .unwrap_or_default();
                    println!("Now playing: {} ({})", title, track_id);
                }
                PlaybackEvent::LoadFailed { track_id, message } => {
                    println!("Could not play {}: {}", track_id, message);
                }
                PlaybackEvent::EndOfList => {
                    println!("End of album");
                    return;
                }
                _ => {}
            }
        }

        let snapshot = controller.session().await;
        if snapshot.status == PlaybackStatus::Idle && !controller.is_loading() {
            return;
        }
    }
}
