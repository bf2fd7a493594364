//! A terminal client for in-between boards.
//!
//! The client enters a board over HTTP, follows its event stream over a
//! WebSocket, renders the table as text and forwards typed commands.

use anyhow::{Context, Result};
use ib_client::{
    api_client::ApiClient,
    config::{ClientConfig, LobbyConfig, Overrides},
    console::{LoopExit, run_prompt},
    display::{BoardsDisplay, display_notice, display_table_view},
    logging,
    signer::CommandSigner,
    subscription::WsSubscriber,
};
use in_between::{
    net::authority::{Authority, BoardQuery},
    seat::Orchestrator,
    table::{Notice, OpenTable, SystemClock, TableView, open_table},
};
use pico_args::Arguments;
use std::sync::Arc;
use tokio::{
    io::BufReader,
    sync::{mpsc, watch},
};

const HELP: &str = "\
Join an in-between board from the terminal

USAGE:
  ib_client [OPTIONS]

OPTIONS:
  --board ID            Board to join  [env: BOARD_ID]
  --api-url URL         Game API URL  [env: API_URL, default: http://localhost:8080]
  --events-url URL      Event server URL  [env: EVENTS_URL, default: derived from API URL]
  --page N              Listing page  [default: 1]
  --min-players N       Only list boards with at least N players

ENVIRONMENT:
  ACCESS_TOKEN          Bearer token for the game API (required)
  SIGNER_CMD            Program that signs transactions (required)
  SIGNER_PROVIDER       Wallet provider handle  [default: default]
  RUST_LOG              Log filter, logs go to stderr

FLAGS:
  --list-boards         Print the open boards and exit
  -h, --help            Print help information
";

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    if pargs.contains("--list-boards") {
        let query = BoardQuery {
            page: pargs.opt_value_from_str("--page")?.unwrap_or(1),
            min_players: pargs.opt_value_from_str("--min-players")?.unwrap_or(0),
            ..Default::default()
        };
        let api_url = pargs.opt_value_from_str("--api-url")?;
        logging::init();
        let lobby = LobbyConfig::from_env(api_url).context("Failed to load configuration")?;
        return list_boards(lobby, query).await;
    }

    let overrides = Overrides {
        board_id: pargs.opt_value_from_str("--board")?,
        api_url: pargs.opt_value_from_str("--api-url")?,
        events_url: pargs.opt_value_from_str("--events-url")?,
    };

    logging::init();

    let config = ClientConfig::from_env(overrides).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    run(config).await
}

async fn run(config: ClientConfig) -> Result<()> {
    let authority = Arc::new(ApiClient::new(&config.api_url, &config.access_token));
    let signer = Arc::new(CommandSigner::new(&config.signer.command));
    let subscriber = WsSubscriber::new(&config.events_url);
    let orchestrator = Arc::new(Orchestrator::new(
        &config.board_id,
        &config.signer.provider,
        authority,
        signer,
    ));

    println!("Entering board {}...", config.board_id);
    let OpenTable {
        actor,
        handle,
        notices,
        events,
    } = open_table(orchestrator, &subscriber, Arc::new(SystemClock), config.table)
        .await
        .context("Failed to open board")?;

    let mut actor_task = tokio::spawn(actor.run(events));
    let render_task = tokio::spawn(render(handle.subscribe(), notices));

    let stdin = BufReader::new(tokio::io::stdin());
    match run_prompt(stdin, &handle, &mut actor_task).await {
        LoopExit::Quit => {}
        LoopExit::TableStopped(finished) => {
            render_task.abort();
            // The pending stdin read cannot be cancelled, so exit without waiting on it.
            let outcome = finished
                .context("Table task panicked")
                .and_then(|result| result.context("Board connection lost"));
            match outcome {
                Ok(()) => {
                    println!("\nBoard closed.");
                    std::process::exit(0);
                }
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    std::process::exit(1);
                }
            }
        }
    }

    // The actor stops once its last handle is gone.
    drop(handle);
    let result = actor_task.await.context("Table task panicked")?;
    render_task.abort();

    result.context("Board connection lost")?;
    println!("\nDisconnected from board.");
    Ok(())
}

async fn list_boards(lobby: LobbyConfig, query: BoardQuery) -> Result<()> {
    let client = ApiClient::new(&lobby.api_url, &lobby.access_token);
    let page = client.boards(&query).await.context("Failed to list boards")?;
    print!("{}", BoardsDisplay { page: &page, number: query.page });
    Ok(())
}

/// Redraw on every view change and print notices as they arrive
async fn render(mut view: watch::Receiver<TableView>, mut notices: mpsc::Receiver<Notice>) {
    display_table_view(&view.borrow_and_update().clone());

    loop {
        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = view.borrow_and_update().clone();
                display_table_view(&current);
            }
            Some(notice) = notices.recv() => display_notice(&notice),
        }
    }
}
