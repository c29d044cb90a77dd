mod headless;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use parley::api::ApiClient;
use parley::config::{self, AppConfig};
use parley::network::ChatClient;
use parley::storage::SessionDatabase;
use parley::ui::ChatApp;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "parley", version, about = "Desktop client for the chat service")]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// REST API base URL (overrides the config file)
    #[arg(long, env = "PARLEY_API_URL", value_name = "URL")]
    api_url: Option<String>,
    /// WebSocket base URL (overrides the config file)
    #[arg(long, env = "PARLEY_WS_URL", value_name = "URL")]
    ws_url: Option<String>,
    /// SQLite file holding the session token
    #[arg(long, env = "PARLEY_SESSION_DB", value_name = "FILE")]
    session_db: Option<String>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

/// Headless commands; without one the desktop window starts.
#[derive(Subcommand, Clone)]
pub enum Mode {
    /// Authenticate and store the access token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List the chat rooms of the logged-in user
    Rooms,
    /// Print the message history of a room
    History { room: String },
    /// Post a message to a room over REST
    Send { room: String, content: String },
    /// Print the user id decoded from the stored token
    Whoami,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let app_config =
        config::load_config(&cli.config).with_overrides(cli.api_url, cli.ws_url, cli.session_db);

    let api = ApiClient::new(&app_config.api_base_url)?;
    let sessions = SessionDatabase::with_path(&app_config.session_db_path)?;

    match cli.mode {
        Some(mode) => headless::run(mode, &api, &sessions).await,
        None => run_full_client(app_config, api, sessions).await.map_err(Into::into),
    }
}

async fn run_full_client(
    app_config: AppConfig,
    api: ApiClient,
    sessions: SessionDatabase,
) -> Result<(), eframe::Error> {
    // 1. Tạo các kênh giao tiếp (Channels)
    // UI -> Network
    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    // Network -> UI
    let (event_tx, event_rx) = mpsc::channel(100);

    // 2. Khởi chạy Network Task (Chạy ngầm)
    let ws_base_url = app_config.ws_base_url.clone();
    tokio::spawn(async move {
        let client = ChatClient::new(event_tx, cmd_rx, api, ws_base_url, sessions);
        client.run().await;
    });

    // 3. Khởi chạy UI (Chạy trên Main Thread)
    let options = eframe::NativeOptions::default();
    let mut event_rx = Some(event_rx);

    eframe::run_native(
        "Parley",
        options,
        Box::new(move |cc| {
            let event_receiver = event_rx
                .take()
                .expect("ChatApp should only be initialized once");

            log::info!(
                "Client started (api: {}, ws: {})",
                app_config.api_base_url,
                app_config.ws_base_url
            );

            Ok(Box::new(ChatApp::new(cc, cmd_tx.clone(), event_receiver)))
        }),
    )
}
