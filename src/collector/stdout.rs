// src/collector/stdout.rs

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use super::{Collector, CollectorError, ForwardMessage, Outbound};

/// Writes every message as one line to stdout (or any async writer).
pub struct StdoutCollector<W = tokio::io::Stdout> {
    writer: W,
}

impl StdoutCollector {
    pub fn new() -> Self {
        Self {
            writer: tokio::io::stdout(),
        }
    }
}

impl Default for StdoutCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> StdoutCollector<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }
}

impl<W> Collector for StdoutCollector<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn start(self, capacity: usize) -> Outbound {
        let (packets_tx, mut packets_rx) = mpsc::channel::<ForwardMessage>(capacity.max(1));
        let (errors_tx, errors_rx) = mpsc::channel::<CollectorError>(16);
        let mut writer = self.writer;

        tokio::spawn(async move {
            while let Some(msg) = packets_rx.recv().await {
                let line = format!("{msg}\n");
                let res = async {
                    writer.write_all(line.as_bytes()).await?;
                    writer.flush().await
                }
                .await;

                if let Err(e) = res {
                    // Error reporting must not block forwarding; drop the
                    // report if nobody is draining.
                    let _ = errors_tx.try_send(CollectorError::Write(e));
                }
            }
            debug!("packet channel closed; stdout collector exiting");
            let _ = errors_tx
                .send(CollectorError::Stopped("packet channel closed".to_string()))
                .await;
        });

        Outbound {
            packets: packets_tx,
            errors: errors_rx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Facility, Severity};

    #[tokio::test]
    async fn writes_one_line_per_message() {
        let (client, mut server) = tokio::io::duplex(1024);
        let Outbound { packets, errors: _errors } =
            StdoutCollector::with_writer(client).start(4);

        packets
            .send(ForwardMessage::now(
                Severity::Info,
                Facility::User,
                "host",
                "tag",
                "grp: cat: hello",
            ))
            .await
            .unwrap();
        drop(packets);

        let mut out = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut server, &mut out)
            .await
            .unwrap();
        assert!(out.ends_with(" host tag[user.info]: grp: cat: hello\n"), "{out}");
        assert_eq!(out.lines().count(), 1);
    }

    #[tokio::test]
    async fn write_failures_surface_on_error_stream() {
        let (client, server) = tokio::io::duplex(64);
        drop(server);
        let Outbound { packets, mut errors } = StdoutCollector::with_writer(client).start(4);

        packets
            .send(ForwardMessage::now(Severity::Info, Facility::User, "h", "t", "m"))
            .await
            .unwrap();

        let err = errors.recv().await.unwrap();
        assert!(matches!(err, CollectorError::Write(_)), "{err:?}");
    }
}
