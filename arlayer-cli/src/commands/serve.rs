//! Serve command - answer JSON-line requests on stdin or from a script.
//!
//! Each input line is one request:
//!
//! ```text
//! {"method":"initialize","arguments":{"credential":"..."}}
//! {"channel":"database","method":"getDatabaseStats"}
//! ```
//!
//! Each request produces exactly one response line on stdout. Blank lines
//! and lines starting with `#` are skipped.

use std::path::PathBuf;

use arlayer::protocol::{Dispatcher, ErrorKind, Request, Response};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the serve command.
pub struct ServeArgs {
    /// Read requests from this file instead of stdin.
    pub script: Option<PathBuf>,
    pub verbose: bool,
}

/// Run the serve command.
pub fn run(args: ServeArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("serve");
    let dispatcher = runner.dispatcher();

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        eprintln!("Received shutdown signal, disposing session...");
        shutdown_clone.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    runner.runtime().block_on(async {
        let handled = match &args.script {
            Some(path) => {
                let file = tokio::fs::File::open(path).await?;
                serve_lines(&dispatcher, BufReader::new(file), tokio::io::stdout(), &shutdown)
                    .await?
            }
            None => {
                serve_lines(
                    &dispatcher,
                    BufReader::new(tokio::io::stdin()),
                    tokio::io::stdout(),
                    &shutdown,
                )
                .await?
            }
        };

        dispatcher.dispose().await;
        info!(requests = handled, "Serve finished");
        Ok::<(), CliError>(())
    })
}

/// Answer every request line from `reader` on `writer`.
///
/// Stops at end of input or when `shutdown` fires. Returns the number of
/// requests answered.
pub async fn serve_lines<R, W>(
    dispatcher: &Dispatcher,
    reader: R,
    mut writer: W,
    shutdown: &CancellationToken,
) -> Result<usize, CliError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => {
                debug!(channel = %request.channel, method = %request.method, "Request received");
                dispatcher.dispatch(request).await
            }
            Err(e) => Response::failure(
                ErrorKind::InvalidArgument,
                format!("malformed request: {}", e),
            ),
        };

        let mut encoded = serde_json::to_string(&response)
            .map_err(|e| CliError::Runtime(format!("failed to encode response: {}", e)))?;
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
        writer.flush().await?;
        handled += 1;
    }

    Ok(handled)
}
