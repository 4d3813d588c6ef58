//! # Server Tests
//!
//! Real listener on an ephemeral port, real client.

use std::io::Cursor;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use missive::client::Client;
use missive::queue::QueueStore;
use missive::server::{self, ImageSettings, IngestState, SecurityConfig, ServerConfig, Submission};

struct Running {
    port: u16,
    store: QueueStore,
    stop: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<()>,
    _dir: tempfile::TempDir,
}

impl Running {
    async fn stop(self) {
        let _ = self.stop.send(());
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .unwrap()
            .unwrap();
    }
}

async fn start(max_line_bytes: usize) -> Running {
    start_with_timeout(max_line_bytes, Duration::from_secs(30)).await
}

async fn start_with_timeout(max_line_bytes: usize, read_timeout: Duration) -> Running {
    let dir = tempfile::tempdir().unwrap();
    let store = QueueStore::open(dir.path()).unwrap();

    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        max_line_bytes,
        read_timeout_secs: 30,
    };
    let listener = server::bind(&config).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let state = IngestState {
        store: store.clone(),
        security: SecurityConfig {
            allow_unauthenticated: false,
            valid_api_keys: vec!["secret".into()],
        },
        image: ImageSettings {
            max_width: 64,
            ..ImageSettings::default()
        },
        max_line_bytes,
        read_timeout,
    };

    let (stop, stopped) = oneshot::channel::<()>();
    let handle = tokio::spawn(server::serve(listener, state, async {
        let _ = stopped.await;
    }));

    Running {
        port,
        store,
        stop,
        handle,
        _dir: dir,
    }
}

fn submission(text: &str) -> Submission {
    Submission {
        api_key: Some("secret".into()),
        sender: Some("Alice".into()),
        text: Some(text.into()),
        ..Submission::default()
    }
}

#[tokio::test]
async fn test_submission_is_stored() {
    let server = start(1024 * 1024).await;

    let reply = Client::new("127.0.0.1", server.port)
        .send(&submission("<b>hello</b>"))
        .await
        .unwrap();
    assert_eq!(reply, "Message stored.");

    let messages = server.store.all().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "<b>hello</b>");
    assert_eq!(messages[0].sender.as_deref(), Some("Alice"));
    assert!(messages[0].dt_received.is_some());

    server.stop().await;
}

#[tokio::test]
async fn test_wrong_key_is_rejected() {
    let server = start(1024 * 1024).await;

    let mut bad = submission("x");
    bad.api_key = Some("wrong".into());
    let reply = Client::new("127.0.0.1", server.port).send(&bad).await.unwrap();

    assert_eq!(reply, "Unauthorized.");
    assert!(server.store.is_empty().unwrap());
    server.stop().await;
}

#[tokio::test]
async fn test_image_is_prepared_and_linked() {
    let server = start(1024 * 1024).await;

    let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 16, Rgba([0, 0, 0, 128])));
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png).unwrap();

    let mut with_image = submission("caption");
    with_image.image = Some(STANDARD.encode(png));
    let reply = Client::new("127.0.0.1", server.port)
        .send(&with_image)
        .await
        .unwrap();
    assert_eq!(reply, "Message stored.");

    let message = server.store.all().unwrap().remove(0);
    let path = message.image_path.unwrap();
    assert_eq!(path, server.store.image_dir().join(format!("{}.jpg", message.id)));

    let saved = image::open(&path).unwrap();
    assert_eq!((saved.width(), saved.height()), (64, 32));
    server.stop().await;
}

#[tokio::test]
async fn test_garbage_line_gets_error_and_server_keeps_running() {
    let server = start(1024 * 1024).await;

    let stream = TcpStream::connect(("127.0.0.1", server.port)).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    writer.write_all(b"this is not json\n").await.unwrap();
    let mut reply = String::new();
    BufReader::new(reader).read_line(&mut reply).await.unwrap();
    assert!(reply.starts_with("Error: "), "{}", reply);
    assert!(reply.ends_with('\n'));

    let reply = Client::new("127.0.0.1", server.port)
        .send(&submission("still here"))
        .await
        .unwrap();
    assert_eq!(reply, "Message stored.");
    server.stop().await;
}

#[tokio::test]
async fn test_oversized_line_is_rejected() {
    let server = start(64).await;

    let reply = Client::new("127.0.0.1", server.port)
        .send(&submission(&"x".repeat(200)))
        .await
        .unwrap();
    assert!(reply.starts_with("Error: submission exceeds 64 bytes"), "{}", reply);
    assert!(server.store.is_empty().unwrap());
    server.stop().await;
}

#[tokio::test]
async fn test_concurrent_clients() {
    let server = start(1024 * 1024).await;

    let mut tasks = Vec::new();
    for i in 0..8 {
        let client = Client::new("127.0.0.1", server.port);
        tasks.push(tokio::spawn(async move {
            client.send(&submission(&format!("message {}", i))).await
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), "Message stored.");
    }

    assert_eq!(server.store.len().unwrap(), 8);
    server.stop().await;
}

#[tokio::test]
async fn test_silent_client_times_out() {
    let server = start_with_timeout(1024, Duration::from_millis(200)).await;

    let stream = TcpStream::connect(("127.0.0.1", server.port)).await.unwrap();
    let (reader, mut writer) = stream.into_split();
    writer.write_all(b"{\"text\":\"never finished").await.unwrap();

    let mut reply = String::new();
    let mut reader = BufReader::new(reader);
    tokio::time::timeout(Duration::from_secs(5), reader.read_line(&mut reply))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply, "Error: read timed out\n");
    assert!(server.store.is_empty().unwrap());

    drop(writer);
    server.stop().await;
}
