//! Transaction signing through an external wallet program.

use async_trait::async_trait;
use in_between::net::{
    authority::Signer,
    errors::{ClientError, ClientResult},
};
use std::process::Stdio;
use tokio::{io::AsyncWriteExt, process::Command};

/// Signs by running a wallet program
///
/// The program receives the provider handle as its only argument and the
/// unsigned transaction on stdin, and prints the signed transaction on
/// stdout. Any non-zero exit is treated as the user declining.
pub struct CommandSigner {
    program: String,
}

impl CommandSigner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Signer for CommandSigner {
    async fn sign(&self, tx: &str, provider: &str) -> ClientResult<String> {
        let mut child = Command::new(&self.program)
            .arg(provider)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ClientError::Request(format!("Failed to start signer {}: {}", self.program, e)))?;

        // Dropping stdin closes the pipe so the program sees EOF. A program
        // that exits without reading it is judged by its exit status alone.
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(tx.as_bytes()).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => {
                    return Err(ClientError::Request(format!("Failed to write to signer: {}", e)));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ClientError::Request(format!("Signer failed: {}", e)))?;

        if !output.status.success() {
            return Err(ClientError::SigningCancelled(output.status.to_string()));
        }

        let signed = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if signed.is_empty() {
            return Err(ClientError::SigningCancelled("signer printed nothing".to_string()));
        }

        Ok(signed)
    }
}
