//! Process-level tests of the `chat-relay-server` binary.

use std::{net::SocketAddr, process::Stdio, time::Duration};

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, Lines},
    net::TcpStream,
    process::{Child, ChildStdin, ChildStdout, Command},
    time::timeout,
};

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Server process killed on drop
struct TestServer {
    process: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    addr: SocketAddr,
}

impl TestServer {
    async fn start(extra_args: &[&str]) -> Self {
        let mut process = Command::new(env!("CARGO_BIN_EXE_chat-relay-server"))
            .args(["--host", "127.0.0.1", "--port", "0"])
            .args(extra_args)
            .env("RUST_LOG_STYLE", "never")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("Failed to start server");

        let stdin = process.stdin.take().expect("stdin is piped");
        let stdout = process.stdout.take().expect("stdout is piped");
        let mut stdout = BufReader::new(stdout).lines();

        let banner = next_line(&mut stdout).await;
        assert!(banner.contains("Server started on"), "banner: {}", banner);
        let addr = banner
            .split_whitespace()
            .last()
            .and_then(|token| token.parse().ok())
            .expect("banner ends with the listening address");

        TestServer {
            process,
            stdin,
            stdout,
            addr,
        }
    }

    async fn send_line(&mut self, line: &str) {
        self.stdin.write_all(line.as_bytes()).await.unwrap();
        self.stdin.write_all(b"\n").await.unwrap();
        self.stdin.flush().await.unwrap();
    }

    /// Read stdout until a line containing `needle` shows up.
    async fn wait_for_output(&mut self, needle: &str) -> String {
        timeout(READ_TIMEOUT, async {
            loop {
                let line = next_line(&mut self.stdout).await;
                if line.contains(needle) {
                    return line;
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("server never printed {:?}", needle))
    }
}

async fn next_line(stdout: &mut Lines<BufReader<ChildStdout>>) -> String {
    timeout(READ_TIMEOUT, stdout.next_line())
        .await
        .expect("Timed out waiting for server output")
        .expect("Failed to read server output")
        .expect("Server closed stdout")
}

#[tokio::test]
async fn test_console_lists_users_and_quits() {
    // テスト項目: コンソールの /users で接続中ユーザーが表示され、/quit でサーバーが終了しクライアントが切断される
    // given (前提条件):
    let mut server = TestServer::start(&[]).await;
    let mut alice = TcpStream::connect(server.addr).await.unwrap();
    alice.write_all(b"Alice").await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    // when (操作):
    server.send_line("/users").await;
    let users = server.wait_for_output("Connected users").await;
    server.send_line("/quit").await;

    // then (期待する結果):
    assert!(users.ends_with("Connected users (1): Alice"), "got: {}", users);
    let status = timeout(READ_TIMEOUT, server.process.wait())
        .await
        .expect("Server did not exit after /quit")
        .unwrap();
    assert!(status.success());

    let mut buf = [0u8; 64];
    let n = timeout(READ_TIMEOUT, alice.read(&mut buf))
        .await
        .expect("Client was not disconnected")
        .unwrap_or(0);
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_console_message_is_announced() {
    // テスト項目: コンソールに入力した文はサーバー名義で全員に届く
    // given (前提条件):
    let mut server = TestServer::start(&[]).await;
    let mut alice = TcpStream::connect(server.addr).await.unwrap();
    alice.write_all(b"Alice").await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    // when (操作):
    server.send_line("hello everyone").await;

    // then (期待する結果):
    let mut buf = [0u8; 64];
    let n = timeout(READ_TIMEOUT, alice.read(&mut buf))
        .await
        .expect("Timed out waiting for the announcement")
        .unwrap();
    assert_eq!(&buf[..n], b"Server: hello everyone");
    server.wait_for_output("You: hello everyone").await;
}

#[tokio::test]
async fn test_console_shows_chat_transcript() {
    // テスト項目: サーバーのコンソールに入退室 (オンライン人数付き) と中継されたチャットが表示される
    // given (前提条件):
    let mut server = TestServer::start(&[]).await;
    let mut alice = TcpStream::connect(server.addr).await.unwrap();
    alice.write_all(b"Alice").await.unwrap();
    let joined = server
        .wait_for_output("Alice joined the chat (Users online: 1)")
        .await;

    // when (操作):
    alice.write_all(b"hello server").await.unwrap();
    let chat = server.wait_for_output("Alice: hello server").await;
    drop(alice);
    let left = server
        .wait_for_output("Alice left the chat (Users online: 0)")
        .await;

    // then (期待する結果):
    assert!(joined.contains("] System: Alice joined"), "got: {}", joined);
    assert!(chat.ends_with("] Alice: hello server"), "got: {}", chat);
    assert!(left.contains("] System: Alice left"), "got: {}", left);
}

#[tokio::test]
async fn test_console_end_of_input_stops_server() {
    // テスト項目: コンソールの入力終端 (EOF) は /quit と同じくサーバーを終了させる
    // given (前提条件):
    let server = TestServer::start(&[]).await;
    let TestServer {
        mut process, stdin, ..
    } = server;

    // when (操作):
    drop(stdin);

    // then (期待する結果):
    let status = timeout(READ_TIMEOUT, process.wait())
        .await
        .expect("Server did not exit on end of input")
        .unwrap();
    assert!(status.success());
}

#[tokio::test]
async fn test_port_in_use_exits_with_failure() {
    // テスト項目: 使用中のポートを指定するとエラー終了する
    // given (前提条件):
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port().to_string();

    // when (操作):
    let status = timeout(
        READ_TIMEOUT,
        Command::new(env!("CARGO_BIN_EXE_chat-relay-server"))
            .args(["--host", "127.0.0.1", "--port", &port, "--headless"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status(),
    )
    .await
    .expect("Server did not exit")
    .unwrap();

    // then (期待する結果):
    assert_eq!(status.code(), Some(1));
}
