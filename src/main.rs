use clap::Parser;
use ragchat::core::config::{RagChatConfig, load_config, resolve};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "ragchat", about = "Terminal chat client for a retrieval-augmented generation service")]
struct Args {
    /// Base URL of the generation service (overrides RAGCHAT_BASE_URL and the config file)
    #[arg(short, long)]
    base_url: Option<String>,

    /// Open a conversation by id or path (e.g. 3, /chat/3, /chat) instead of the landing page
    #[arg(short, long)]
    conversation: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to ragchat.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("ragchat.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let config = load_config().unwrap_or_else(|e| {
        log::warn!("Failed to load config, using defaults: {}", e);
        RagChatConfig::default()
    });
    let resolved = resolve(
        &config,
        args.base_url.as_deref(),
        args.conversation.as_deref(),
    );

    log::info!(
        "ragchat starting up: endpoint={}, route={}",
        resolved.base_url,
        resolved.initial_route
    );

    ragchat::tui::run(resolved)
}
