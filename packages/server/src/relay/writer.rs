//! Outbound half of a member's connection.

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::mpsc::UnboundedReceiver,
};

use crate::domain::SendFailure;

/// Drain `inbox` into `writer`, one stream write per payload.
///
/// Returns `Ok(())` once every sender of the inbox is gone (the member was
/// evicted or the registry was closed) and the write half has been shut down.
/// Returns the first write error otherwise; the caller treats either outcome
/// as the end of the connection.
pub async fn run_writer<W>(
    mut writer: W,
    mut inbox: UnboundedReceiver<String>,
) -> Result<(), SendFailure>
where
    W: AsyncWrite + Unpin,
{
    while let Some(payload) = inbox.recv().await {
        writer.write_all(payload.as_bytes()).await?;
        writer.flush().await?;
    }

    // The peer may already be gone; a failed shutdown changes nothing.
    if let Err(e) = writer.shutdown().await {
        tracing::debug!("Write half shutdown failed: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio::{io::AsyncReadExt, sync::mpsc};

    use super::*;

    #[tokio::test]
    async fn test_writer_forwards_payloads_in_order() {
        // テスト項目: チャネルに積まれたペイロードが順番どおりソケットに書き込まれる
        // given (前提条件):
        let (client, server) = tokio::io::duplex(1024);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("Alice: one".to_string()).unwrap();
        tx.send("Alice: two".to_string()).unwrap();
        drop(tx);

        // when (操作):
        let result = run_writer(server, rx).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let mut received = String::new();
        let mut client = client;
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "Alice: oneAlice: two");
    }

    #[tokio::test]
    async fn test_writer_finishes_when_channel_closes() {
        // テスト項目: 送信側が全て破棄されると writer は正常終了し、相手側は EOF を受け取る
        // given (前提条件):
        let (mut client, server) = tokio::io::duplex(64);
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let handle = tokio::spawn(run_writer(server, rx));

        // when (操作):
        drop(tx);

        // then (期待する結果):
        assert!(handle.await.unwrap().is_ok());
        let mut buf = [0u8; 8];
        assert_eq!(client.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_writer_reports_write_failure() {
        // テスト項目: 相手側が閉じている場合は書き込みエラーが返る
        // given (前提条件):
        let (client, server) = tokio::io::duplex(64);
        drop(client);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send("Bob: hello".to_string()).unwrap();

        // when (操作):
        let result = run_writer(server, rx).await;

        // then (期待する結果):
        assert!(matches!(result, Err(SendFailure::Write(_))));
    }
}
