//! Line Protocol Server
//!
//! Accepts TCP connections and serves one command per line on each.

use std::future::Future;
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::error::{CacheError, Result};
use crate::protocol::Command;

/// Longest accepted request line in bytes, excluding the terminator.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Runs the accept loop until `shutdown` resolves.
///
/// Each connection gets its own task. Once shutdown begins, idle sessions
/// are told to close and commands already read run to completion; this
/// returns only after every session has ended.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    let (closing_tx, closing_rx) = watch::channel(false);
    let mut sessions = JoinSet::new();
    tokio::pin!(shutdown);

    info!("Line protocol listening on {}", listener.local_addr()?);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!("Accepted connection from {}", peer);
                        let state = state.clone();
                        let closing = closing_rx.clone();
                        sessions.spawn(async move {
                            if let Err(err) = handle_session(stream, state, closing).await {
                                warn!("Session with {} ended with error: {}", peer, err);
                            }
                        });
                    }
                    Err(err) => warn!("Failed to accept connection: {}", err),
                }
            }
            Some(joined) = sessions.join_next() => {
                if let Err(err) = joined {
                    warn!("Session task failed: {}", err);
                }
            }
            _ = &mut shutdown => break,
        }
    }

    drop(listener);
    let _ = closing_tx.send(true);
    info!("Line protocol draining {} open sessions", sessions.len());
    while let Some(joined) = sessions.join_next().await {
        if let Err(err) = joined {
            warn!("Session task failed: {}", err);
        }
    }

    info!("Line protocol listener stopped");
    Ok(())
}

// == Session ==
/// Reads commands from `stream` and writes one reply line per command.
///
/// The session ends on `exit`, on EOF, or when the server shuts down. A
/// line longer than [`MAX_LINE_LENGTH`] is skipped and answered with an
/// error; the session stays open.
pub async fn handle_session(
    stream: TcpStream,
    state: AppState,
    mut closing: watch::Receiver<bool>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        let frame = tokio::select! {
            frame = read_frame(&mut reader, MAX_LINE_LENGTH) => frame?,
            _ = closing.changed() => break,
        };

        let reply = match frame {
            None => break,
            Some(Frame::TooLong) => CacheError::LineTooLong(MAX_LINE_LENGTH).to_string(),
            Some(Frame::Line(line)) => match line.parse::<Command>() {
                Ok(command) => {
                    let exit = command.is_exit();
                    let reply = state.run(move |cache| command.execute(cache)).await?;
                    if exit {
                        writer.write_all(format!("{}\n", reply).as_bytes()).await?;
                        break;
                    }
                    reply
                }
                Err(err) => err.to_string(),
            },
        };
        writer.write_all(format!("{}\n", reply).as_bytes()).await?;
    }

    writer.shutdown().await?;
    Ok(())
}

// == Framing ==
enum Frame {
    Line(String),
    TooLong,
}

/// Reads one `\n`-terminated line of at most `max_len` bytes.
///
/// An overlong line is consumed up to its terminator without being
/// buffered. Returns `None` at EOF.
async fn read_frame<R>(reader: &mut R, max_len: usize) -> io::Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(max_len as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
    } else if buf.len() > max_len {
        skip_line(reader).await?;
        return Ok(Some(Frame::TooLong));
    }
    Ok(Some(Frame::Line(String::from_utf8_lossy(&buf).into_owned())))
}

async fn skip_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|byte| *byte == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}
