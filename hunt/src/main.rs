//! Scavenger-hunt terminal frontend.
//!
//! Drives a hunt session from the command line: loads a story (and
//! optionally a theme) from a file or URL, restores saved progress,
//! then reads position updates line by line.
//!
//! ```bash
//! cargo run -p hunt -- --story ./story.json --theme ./theme.json
//! echo "45.0 2.0" | cargo run -p hunt -- --story https://example.org/story.json
//! ```

mod repl;

use hunt_core::story::{load_spots, RawStory, RawTheme};
use hunt_core::{FileStore, HuntConfig, HuntSession};
use story_client::StoryClient;
use tracing_subscriber::EnvFilter;

/// Command-line configuration.
#[derive(Debug, Clone)]
struct CliConfig {
    story: Option<String>,
    theme: Option<String>,
    hunt_name: String,
    storage_key: Option<String>,
    progress_dir: String,
}

impl CliConfig {
    fn from_env() -> Self {
        Self {
            story: std::env::var("HUNT_STORY").ok(),
            theme: std::env::var("HUNT_THEME").ok(),
            hunt_name: "Scavenger Hunt".to_string(),
            storage_key: None,
            progress_dir: std::env::var("HUNT_PROGRESS_DIR")
                .unwrap_or_else(|_| ".hunt-progress".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let config = parse_config_from_args(&args);

    let Some(story_source) = config.story.clone() else {
        eprintln!("Error: no story given.");
        eprintln!("Pass --story <path-or-url> or set HUNT_STORY in the environment.");
        std::process::exit(1);
    };

    let story = match load_story(&story_source).await {
        Ok(story) => story,
        Err(e) => {
            eprintln!("Failed to load story from {story_source}: {e}");
            std::process::exit(1);
        }
    };
    let theme = match config.theme.as_deref() {
        Some(source) => load_theme(source).await,
        None => RawTheme::default(),
    };

    let spots = load_spots(&story, &theme);
    tracing::info!(source = %story_source, spots = spots.len(), "story loaded");
    if spots.is_empty() {
        eprintln!("Warning: the story contains no usable spots.");
    }

    let mut hunt_config = HuntConfig::new(config.hunt_name.clone());
    if let Some(key) = config.storage_key.clone() {
        hunt_config = hunt_config.with_storage_key(key);
    }

    let store = FileStore::new(config.progress_dir.clone());
    let session = HuntSession::new(hunt_config, spots, Box::new(store))
        .with_notifier(Box::new(repl::PrintNotifier));

    repl::run(session)?;
    Ok(())
}

/// Load a story from a URL or a local path.
async fn load_story(source: &str) -> Result<RawStory, story_client::FetchError> {
    if is_url(source) {
        StoryClient::new().fetch_story(source).await
    } else {
        story_client::read_story_file(source)
    }
}

/// Load a theme from a URL or a local path. Failures degrade to the
/// default theme inside the client.
async fn load_theme(source: &str) -> RawTheme {
    if is_url(source) {
        StoryClient::new().fetch_theme(source).await
    } else {
        story_client::read_theme_file(source)
    }
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Parse configuration from command line arguments, on top of the
/// environment defaults.
fn parse_config_from_args(args: &[String]) -> CliConfig {
    let mut config = CliConfig::from_env();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--story" => {
                if let Some(story) = args.get(i + 1) {
                    config.story = Some(story.clone());
                    i += 1;
                }
            }
            "--theme" => {
                if let Some(theme) = args.get(i + 1) {
                    config.theme = Some(theme.clone());
                    i += 1;
                }
            }
            "--name" => {
                if let Some(name) = args.get(i + 1) {
                    config.hunt_name = name.clone();
                    i += 1;
                }
            }
            "--key" => {
                if let Some(key) = args.get(i + 1) {
                    config.storage_key = Some(key.clone());
                    i += 1;
                }
            }
            "--progress-dir" => {
                if let Some(dir) = args.get(i + 1) {
                    config.progress_dir = dir.clone();
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_help() {
    println!("hunt - location-based scavenger hunt runner");
    println!();
    println!("USAGE:");
    println!("  hunt --story <path-or-url> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help            Show this help message");
    println!("  --story <SOURCE>      Story document (file path or http(s) URL)");
    println!("  --theme <SOURCE>      Theme document (file path or http(s) URL)");
    println!("  --name <NAME>         Hunt display name (default: Scavenger Hunt)");
    println!("  --key <KEY>           Storage key for saved progress");
    println!("  --progress-dir <DIR>  Directory for saved progress (default: .hunt-progress)");
    println!();
    println!("ENVIRONMENT:");
    println!("  HUNT_STORY            Default story source");
    println!("  HUNT_THEME            Default theme source");
    println!("  HUNT_PROGRESS_DIR     Default progress directory");
    println!();
    println!("Positions are read from stdin, one 'lat lng' pair per line.");
    println!("Type #help inside the session for commands.");
}
