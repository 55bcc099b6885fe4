use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};

use rax_chat_server::client::ClientRegistry;
use rax_chat_server::server::AdmissionControl;
use rax_chat_server::{Server, ServerConfig};

const WAIT: Duration = Duration::from_secs(5);

struct TestServer {
    addr: std::net::SocketAddr,
    registry: Arc<ClientRegistry>,
    admission: Arc<AdmissionControl>,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(max_clients: usize) -> Self {
        // Port 0 lets the OS pick; validation only applies to loaded configs.
        let config = ServerConfig {
            port: 0,
            max_clients,
            ..ServerConfig::default()
        };

        let server = Server::bind(&config).expect("Failed to bind test server");
        let addr = server.local_addr().unwrap();
        let registry = server.registry();
        let admission = server.admission();
        let task = tokio::spawn(async move { server.run().await });

        TestServer {
            addr,
            registry,
            admission,
            task,
        }
    }

    async fn connect(&self) -> TcpStream {
        TcpStream::connect(self.addr)
            .await
            .expect("Failed to connect")
    }

    /// Connects and completes the handshake, waiting until the server has
    /// recorded the name.
    async fn join(&self, name: &str) -> TcpStream {
        let mut stream = self.connect().await;
        stream.write_all(name.as_bytes()).await.unwrap();
        self.wait_for(|names| names.iter().any(|n| n == name)).await;
        stream
    }

    async fn wait_for<F>(&self, condition: F)
    where
        F: Fn(&[String]) -> bool,
    {
        timeout(WAIT, async {
            loop {
                if condition(&self.registry.names().await) {
                    return;
                }
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Timed out waiting for registry state");
    }

    async fn wait_until_empty(&self) {
        timeout(WAIT, async {
            loop {
                if self.registry.is_empty().await && self.admission.live_count() == 0 {
                    return;
                }
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("Timed out waiting for clients to leave");
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_text(stream: &mut TcpStream) -> String {
    let mut buf = [0u8; 2048];
    let n = timeout(WAIT, stream.read(&mut buf))
        .await
        .expect("Timed out reading")
        .unwrap();
    String::from_utf8_lossy(&buf[..n]).into_owned()
}

/// Reads until `expected` bytes have arrived; messages may coalesce on the wire.
async fn read_exact_text(stream: &mut TcpStream, expected: &str) {
    let mut received = String::new();
    while received.len() < expected.len() {
        let chunk = read_text(stream).await;
        assert!(!chunk.is_empty(), "connection closed after {:?}", received);
        received.push_str(&chunk);
    }
    assert_eq!(received, expected);
}

async fn assert_silent(stream: &mut TcpStream) {
    let mut buf = [0u8; 64];
    let result = timeout(Duration::from_millis(200), stream.read(&mut buf)).await;
    assert!(result.is_err(), "unexpected data: {:?}", result);
}

async fn assert_closed(stream: &mut TcpStream) {
    let mut buf = [0u8; 64];
    let n = timeout(WAIT, stream.read(&mut buf))
        .await
        .expect("Timed out waiting for close")
        .unwrap_or(0);
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_end_to_end_chat() {
    let server = TestServer::start(10).await;

    let mut alice = server.join("alice").await;

    let mut bob = server.connect().await;
    bob.write_all(b"bob").await.unwrap();
    read_exact_text(&mut alice, "bob has joined\n").await;

    alice.write_all(b"hello\n").await.unwrap();
    read_exact_text(&mut bob, "hello\n").await;
    assert_silent(&mut alice).await;

    bob.write_all(b"exit").await.unwrap();
    read_exact_text(&mut alice, "bob has left\n").await;
    assert_closed(&mut bob).await;

    server.wait_for(|names| names == ["alice".to_string()]).await;
    assert_eq!(server.registry.len().await, 1);
}

#[tokio::test]
async fn test_every_other_client_gets_one_copy() {
    let server = TestServer::start(10).await;

    let mut sender = server.join("sender").await;
    let mut first = server.join("first").await;
    let mut second = server.join("second").await;

    // Drain join announcements.
    read_exact_text(&mut sender, "first has joined\nsecond has joined\n").await;
    read_exact_text(&mut first, "second has joined\n").await;

    sender.write_all(b"one copy\n").await.unwrap();
    read_exact_text(&mut first, "one copy\n").await;
    read_exact_text(&mut second, "one copy\n").await;

    assert_silent(&mut first).await;
    assert_silent(&mut second).await;
    assert_silent(&mut sender).await;
}

#[tokio::test]
async fn test_exit_again_is_an_ordinary_message() {
    let server = TestServer::start(10).await;

    let mut alice = server.join("alice").await;
    let mut bob = server.join("bob").await;
    read_exact_text(&mut alice, "bob has joined\n").await;

    bob.write_all(b"exit again").await.unwrap();
    read_exact_text(&mut alice, "exit again").await;
    assert_eq!(server.registry.len().await, 2);

    bob.write_all(b"exit\n").await.unwrap();
    read_exact_text(&mut alice, "exit\n").await;
    assert_eq!(server.registry.len().await, 2);

    bob.write_all(b"exit").await.unwrap();
    read_exact_text(&mut alice, "bob has left\n").await;
    assert_closed(&mut bob).await;
}

#[tokio::test]
async fn test_bad_handshakes_never_join() {
    let server = TestServer::start(10).await;
    let mut watcher = server.join("watcher").await;

    let too_long = "x".repeat(40);
    for payload in ["a", too_long.as_str()] {
        let mut client = server.connect().await;
        client.write_all(payload.as_bytes()).await.unwrap();
        assert_closed(&mut client).await;
    }

    // A client that hangs up before naming itself.
    let client = server.connect().await;
    drop(client);

    server.wait_for(|names| names == ["watcher".to_string()]).await;
    timeout(WAIT, async {
        while server.registry.len().await != 1 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_silent(&mut watcher).await;
}

#[tokio::test]
async fn test_connection_past_capacity_is_rejected() {
    let server = TestServer::start(2).await;

    let mut alice = server.join("alice").await;
    let _bob = server.join("bob").await;
    read_exact_text(&mut alice, "bob has joined\n").await;
    assert_eq!(server.admission.live_count(), 2);

    let mut rejected = server.connect().await;
    assert_closed(&mut rejected).await;
    assert_eq!(server.admission.live_count(), 2);
    assert_eq!(server.registry.len().await, 2);

    // The slot is usable again once someone leaves.
    alice.write_all(b"exit").await.unwrap();
    assert_closed(&mut alice).await;
    timeout(WAIT, async {
        while server.admission.live_count() != 1 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let _carol = server.join("carol").await;
    assert_eq!(server.admission.live_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_churn_while_broadcasting_returns_to_zero() {
    let server = Arc::new(TestServer::start(50).await);

    let mut speaker = server.join("speaker").await;
    let chatter = tokio::spawn(async move {
        for i in 0..200 {
            if speaker
                .write_all(format!("tick {}\n", i).as_bytes())
                .await
                .is_err()
            {
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        speaker
    });

    let mut clients = Vec::new();
    for worker in 0..8 {
        let server = Arc::clone(&server);
        clients.push(tokio::spawn(async move {
            for round in 0..10 {
                let name = format!("w{}r{}", worker, round);
                let mut stream = server.connect().await;
                stream.write_all(name.as_bytes()).await.unwrap();
                sleep(Duration::from_millis(2)).await;
                if round % 2 == 0 {
                    let _ = stream.write_all(b"exit").await;
                }
                drop(stream);
            }
        }));
    }
    for client in clients {
        client.await.unwrap();
    }

    let speaker = chatter.await.unwrap();
    drop(speaker);

    server.wait_until_empty().await;
}
