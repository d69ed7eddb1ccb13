//! Line-oriented operator console
//!
//! Each input line is one scan. Barcode and RFID readers in keyboard mode
//! terminate scans with Enter, so a plain line reader is all they need.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::error::Result;
use crate::workflow::{Outcome, Workflow};

/// Run the workflow over `reader`, printing outcomes to stdout
pub async fn run<R>(workflow: Workflow, reader: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    run_with_output(workflow, reader, tokio::io::stdout()).await
}

/// Run the workflow over `reader`, writing outcomes to `output`
///
/// Returns on the exit token or end of input. The beacon is shut down either
/// way.
pub async fn run_with_output<R, W>(mut workflow: Workflow, reader: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    let result = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Input closed");
                break Ok(());
            }
            Err(e) => break Err(e.into()),
        };

        debug!(input = %line.trim(), "Scan received");
        let outcome = workflow.handle(&line).await;

        if !matches!(outcome, Outcome::Ignored) {
            if let Err(e) = write_line(&mut output, &outcome.to_string()).await {
                break Err(e);
            }
        }

        if matches!(outcome, Outcome::ExitRequested) {
            break Ok(());
        }
    };

    workflow.shutdown().await;
    info!("Console stopped");
    result
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
