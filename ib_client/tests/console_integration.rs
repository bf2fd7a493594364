//! Integration tests for the prompt loop against a real table actor.

use futures_util::stream;
use ib_client::{
    api_client::ApiClient,
    console::{LoopExit, run_prompt},
    signer::CommandSigner,
};
use in_between::{
    net::{
        authority::EventStream,
        errors::{ClientError, ClientResult},
    },
    seat::{Entry, Orchestrator, Session},
    table::{SystemClock, TableActor, TableConfig, TableHandle},
};
use std::{sync::Arc, time::Duration};
use tokio::{io::BufReader, task::JoinHandle, time::timeout};

fn start_table(events: EventStream) -> (TableHandle, JoinHandle<ClientResult<()>>) {
    let orchestrator = Arc::new(Orchestrator::new(
        "b1",
        "default",
        Arc::new(ApiClient::new("http://127.0.0.1:1", "secret")),
        Arc::new(CommandSigner::new("false")),
    ));
    let entry = Entry {
        session: Session {
            session_id: "s1".to_string(),
            board_id: "b1".to_string(),
            ..Default::default()
        },
        limit: 1_000_000_000,
        seat: None,
    };
    let (actor, handle, _notices) =
        TableActor::new(orchestrator, entry, Arc::new(SystemClock), TableConfig::default());
    (handle, tokio::spawn(actor.run(events)))
}

#[tokio::test]
async fn test_lost_connection_ends_prompt_without_input() {
    let events: EventStream = Box::pin(stream::iter(vec![Err(ClientError::Subscription(
        "connection reset".to_string(),
    ))]));
    let (handle, mut task) = start_table(events);

    // The writer stays open, so the read never completes.
    let (_writer, reader) = tokio::io::duplex(64);
    let exit = timeout(
        Duration::from_secs(5),
        run_prompt(BufReader::new(reader), &handle, &mut task),
    )
    .await
    .expect("prompt kept waiting for input");

    assert!(matches!(
        exit,
        LoopExit::TableStopped(Ok(Err(ClientError::Subscription(_))))
    ));
}

#[tokio::test]
async fn test_quit_leaves_table_running() {
    let (handle, mut task) = start_table(Box::pin(stream::pending::<ClientResult<Vec<u8>>>()));

    let input = BufReader::new(&b"help\n\nnonsense\nquit\nstake 1\n"[..]);
    let exit = timeout(Duration::from_secs(5), run_prompt(input, &handle, &mut task))
        .await
        .unwrap();

    assert!(matches!(exit, LoopExit::Quit));
    assert!(!task.is_finished());

    drop(handle);
    let result = timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_end_of_input_quits() {
    let (handle, mut task) = start_table(Box::pin(stream::pending::<ClientResult<Vec<u8>>>()));

    let exit = timeout(
        Duration::from_secs(5),
        run_prompt(BufReader::new(&b""[..]), &handle, &mut task),
    )
    .await
    .unwrap();
    assert!(matches!(exit, LoopExit::Quit));
}
