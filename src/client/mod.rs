//! CLI front-end for the resolver.
//!
//! `resolve` runs one handle to completion. `watch` keeps a session
//! open, reads replacement handles from stdin one per line, and prints
//! updates as they are published.

mod format;

use std::sync::Arc;

use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};

use crate::cli::Command;
use crate::resolver;
use crate::session::{Session, SessionError};
use crate::stream::{ChannelHandle, HandleError};
use crate::upstream::Upstream;

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid handle: {0}")]
    Handle(#[from] HandleError),
    #[error("session: {0}")]
    Session(#[from] SessionError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run a CLI command against `upstream`.
pub async fn run(command: Command, upstream: Arc<dyn Upstream>) -> Result<(), ClientError> {
    match command {
        Command::Resolve { handle, follow } => {
            let handle = ChannelHandle::parse(&handle)?;
            resolve(upstream, handle, follow).await;
        }
        Command::Watch {
            youtube,
            twitch,
            chat_domain,
        } => {
            let handle = ChannelHandle::parse(&youtube)?;
            if let Some(channel) = &twitch {
                format::print_chat(channel, &chat_domain);
            }
            watch(upstream, handle).await?;
        }
    }
    Ok(())
}

async fn resolve(upstream: Arc<dyn Upstream>, handle: ChannelHandle, follow: bool) {
    if !follow {
        let update = resolver::resolve_to_end(upstream, handle).await;
        format::print_decision(&update);
        return;
    }

    let mut updates = Box::pin(resolver::resolve(upstream, handle));
    while let Some(update) = updates.next().await {
        if update.is_terminal() {
            format::print_decision(&update);
        } else {
            format::print_update(&update);
        }
    }
}

/// Follow handles read from stdin until EOF or SIGINT/SIGTERM.
async fn watch(upstream: Arc<dyn Upstream>, initial: ChannelHandle) -> Result<(), ClientError> {
    let session = Session::spawn(upstream);
    let stdin = BufReader::new(tokio::io::stdin());
    let shutdown = shutdown_signal()?;

    let result = follow(&session, initial, stdin, shutdown).await;

    if let Some(update) = session.current() {
        tracing::debug!(handle = %update.handle, state = %update.state, "stopping watch");
    }
    session.shutdown().await;
    result
}

/// Resolves on the first SIGTERM or SIGINT.
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => tracing::info!("received SIGINT, shutting down"),
        }
    })
}

/// Drive `session` from `input`, one handle per line, printing updates.
///
/// On EOF the active handle is allowed to finish resolving. `shutdown`
/// ends the loop at any point, including while draining.
async fn follow<R>(
    session: &Session,
    initial: ChannelHandle,
    input: R,
    shutdown: impl Future<Output = ()>,
) -> Result<(), ClientError>
where
    R: AsyncBufRead + Unpin,
{
    let mut active = initial.clone();
    session.set_handle(initial)?;

    let mut updates = session.updates();
    let mut lines = input.lines();
    let mut last_printed = None;
    let mut draining = false;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line(), if !draining => {
                let Some(line) = line? else {
                    draining = true;
                    let finished = session
                        .current()
                        .filter(|u| u.handle == active && u.is_terminal());
                    if let Some(update) = finished {
                        if last_printed.as_ref() != Some(&update) {
                            format::print_decision(&update);
                        }
                        break;
                    }
                    tracing::debug!(handle = %active, "input closed, waiting for resolution");
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match ChannelHandle::parse(&line) {
                    Ok(handle) => {
                        active = handle.clone();
                        session.set_handle(handle)?;
                    }
                    Err(e) => eprintln!("adrift watch: {e}"),
                }
            }

            update = updates.next() => {
                let Some(update) = update else {
                    return Err(SessionError::Closed.into());
                };
                let Some(update) = update else { continue };
                if !update.is_terminal() {
                    format::print_update(&update);
                    continue;
                }
                if last_printed.as_ref() != Some(&update) {
                    format::print_decision(&update);
                }
                let done = draining && update.handle == active;
                last_printed = Some(update);
                if done {
                    break;
                }
            }

            _ = &mut shutdown => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::upstream::fake::{FakeUpstream, Op, Reply};

    fn handle(raw: &str) -> ChannelHandle {
        ChannelHandle::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn eof_waits_for_active_handle() {
        let fake = Arc::new(FakeUpstream::new().reply("alice", Op::Scrape, Reply::Id("UC1")));
        let session = Session::spawn(fake.clone());

        let done = tokio::time::timeout(
            Duration::from_secs(2),
            follow(&session, handle("alice"), &b""[..], std::future::pending()),
        )
        .await;

        assert!(matches!(done, Ok(Ok(()))));
        assert!(session.current().unwrap().is_terminal());
        session.shutdown().await;
    }

    #[tokio::test]
    async fn eof_drain_follows_last_line() {
        let fake = Arc::new(FakeUpstream::new().reply("bob", Op::Scrape, Reply::Id("UC2")));
        let session = Session::spawn(fake.clone());

        let done = tokio::time::timeout(
            Duration::from_secs(2),
            follow(&session, handle("alice"), &b"\n@bob\n"[..], std::future::pending()),
        )
        .await;

        assert!(matches!(done, Ok(Ok(()))));
        let current = session.current().unwrap();
        assert_eq!(current.handle, handle("bob"));
        assert!(current.is_terminal());
        session.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_interrupts_drain() {
        let fake = Arc::new(FakeUpstream::new());
        let _held = fake.gate("stuck");
        let session = Session::spawn(fake.clone());

        let shutdown = tokio::time::sleep(Duration::from_millis(50));
        let done = tokio::time::timeout(
            Duration::from_secs(2),
            follow(&session, handle("stuck"), &b""[..], shutdown),
        )
        .await;

        assert!(matches!(done, Ok(Ok(()))));
        assert_eq!(fake.calls().len(), 1);
        assert!(!session.current().unwrap().is_terminal());
        session.shutdown().await;
    }
}
