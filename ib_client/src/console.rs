//! The prompt loop feeding typed commands to a running table.

use crate::commands::{COMMANDS_HELP, Input, parse_command};
use in_between::{net::errors::ClientResult, table::TableHandle};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    task::{JoinError, JoinHandle},
};

/// Why the prompt loop stopped.
#[derive(Debug)]
pub enum LoopExit {
    /// The player quit, input ended, or the table refused a command
    Quit,
    /// The table task finished while the player was still typing
    TableStopped(Result<ClientResult<()>, JoinError>),
}

/// Read commands from `input` until the player quits or the table stops.
///
/// The table task is watched alongside the input, so a lost board
/// connection ends the loop without waiting for another line.
pub async fn run_prompt<R>(
    mut input: R,
    handle: &TableHandle,
    table_task: &mut JoinHandle<ClientResult<()>>,
) -> LoopExit
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();

    loop {
        line.clear();
        let read = tokio::select! {
            read = input.read_line(&mut line) => read,
            finished = &mut *table_task => return LoopExit::TableStopped(finished),
        };

        match read {
            Ok(0) => return LoopExit::Quit, // EOF
            Ok(_) => {
                let typed = line.trim();
                if typed.is_empty() {
                    continue;
                }

                match parse_command(typed) {
                    Ok(Input::Table(command)) => {
                        if let Err(e) = handle.send(command).await {
                            eprintln!("Error: {}", e);
                            return LoopExit::Quit;
                        }
                    }
                    Ok(Input::Help) => println!("{COMMANDS_HELP}"),
                    Ok(Input::Quit) => {
                        println!("Leaving board...");
                        return LoopExit::Quit;
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                return LoopExit::Quit;
            }
        }
    }
}
