//! Integration tests for the sync engine workflow:
//! - full sync: reset, materialization, download fan-out, session persistence
//! - per-file completions and the terminal drained event
//! - restart reconciliation from file-system truth
//! - failure paths (bad address, HTTP error, malformed manifest)

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::{
    BackgroundTransferClient, HttpClient, HttpResponse, TransferUpdate, TransferUpdateStream,
};
use bridge_traits::storage::{MediaFileStore, MemoryFileStore, MemorySettingsStore, SettingsStore};
use bytes::Bytes;
use core_library::CatalogStore;
use core_runtime::events::EventBus;
use core_sync::session::{DOWNLOAD_IN_PROGRESS_KEY, EXPECTED_FILE_COUNT_KEY};
use core_sync::{DownloadSession, SyncEngine, SyncError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

// ============================================================================
// Mock Implementations
// ============================================================================

/// HTTP client that always serves one canned response
struct StaticHttpClient {
    status: u16,
    body: Bytes,
}

impl StaticHttpClient {
    fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    fn status(status: u16) -> Self {
        Self {
            status,
            body: Bytes::new(),
        }
    }
}

#[async_trait]
impl HttpClient for StaticHttpClient {
    async fn get(&self, _url: &str) -> BridgeResult<HttpResponse> {
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// HTTP client whose requests never reach a server
struct UnreachableHttpClient;

#[async_trait]
impl HttpClient for UnreachableHttpClient {
    async fn get(&self, url: &str) -> BridgeResult<HttpResponse> {
        Err(BridgeError::OperationFailed(format!(
            "Connection refused: {}",
            url
        )))
    }
}

/// Transfer client that records submissions and never delivers anything
struct RecordingTransferClient {
    submissions: AsyncMutex<Vec<(String, String)>>,
}

impl RecordingTransferClient {
    fn new() -> Self {
        Self {
            submissions: AsyncMutex::new(Vec::new()),
        }
    }

    async fn submitted(&self) -> Vec<(String, String)> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl BackgroundTransferClient for RecordingTransferClient {
    async fn submit(&self, url: &str, tag: &str) -> BridgeResult<()> {
        self.submissions
            .lock()
            .await
            .push((url.to_string(), tag.to_string()));
        Ok(())
    }

    async fn subscribe_updates(&self) -> BridgeResult<Box<dyn TransferUpdateStream>> {
        Ok(Box::new(ClosedStream))
    }
}

struct ClosedStream;

#[async_trait]
impl TransferUpdateStream for ClosedStream {
    async fn next(&mut self) -> Option<TransferUpdate> {
        None
    }
}

// ============================================================================
// Fixtures
// ============================================================================

struct Fixture {
    settings: Arc<MemorySettingsStore>,
    files: Arc<MemoryFileStore>,
    catalog: Arc<CatalogStore>,
    transfers: Arc<RecordingTransferClient>,
    engine: SyncEngine,
}

fn fixture(http: impl HttpClient + 'static) -> Fixture {
    let settings = Arc::new(MemorySettingsStore::new());
    let files = Arc::new(MemoryFileStore::new());
    let event_bus = Arc::new(EventBus::default());
    let catalog = Arc::new(CatalogStore::new(
        settings.clone(),
        files.clone(),
        event_bus.clone(),
    ));
    let transfers = Arc::new(RecordingTransferClient::new());
    let engine = SyncEngine::new(
        Arc::new(http),
        transfers.clone(),
        catalog.clone(),
        files.clone(),
        settings.clone(),
        event_bus,
    );

    Fixture {
        settings,
        files,
        catalog,
        transfers,
        engine,
    }
}

/// Manifest with two albums for one artist, three songs total.
const MANIFEST: &str = r#"[
    {
        "name": "Absolution",
        "artist": "Muse",
        "songs": [
            {"id": "s1", "title": "Hysteria", "artist": "Muse", "album": "Absolution",
             "relativePath": "Muse/Absolution/Hysteria.mp3"},
            {"id": "s2", "title": "Apocalypse Please", "artist": "Muse", "album": "Absolution",
             "relativePath": "Muse/Absolution/Apocalypse Please.mp3"}
        ]
    },
    {
        "name": "Showbiz",
        "artist": "Muse",
        "songs": [
            {"id": "s3", "title": "Muscle Museum", "artist": "Muse", "album": "Showbiz",
             "relativePath": "Muse/Showbiz/Muscle Museum.mp3"}
        ]
    }
]"#;

async fn stage_file(name: &str, contents: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join("sync-engine-tests");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join(name);
    tokio::fs::write(&path, contents).await.unwrap();
    path
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn full_sync_materializes_catalog_and_fans_out() {
    let fx = fixture(StaticHttpClient::ok(MANIFEST));

    fx.engine
        .start_sync("http://media.local/index.json")
        .await
        .unwrap();

    // One artist, two albums, three songs
    let artists = fx.catalog.artists().await;
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].name, "Muse");
    assert_eq!(artists[0].albums.len(), 2);
    assert_eq!(artists[0].songs().count(), 3);

    // One download per song, tagged by relative path, URL-encoded
    let submitted = fx.transfers.submitted().await;
    assert_eq!(submitted.len(), 3);
    assert!(submitted
        .iter()
        .any(|(url, tag)| tag == "Muse/Showbiz/Muscle Museum.mp3"
            && url == "http://media.local/Muse/Showbiz/Muscle%20Museum.mp3"));

    // Durable session record: in progress, three expected files
    let session = DownloadSession::load(fx.settings.as_ref()).await.unwrap();
    assert!(session.in_progress);
    assert_eq!(session.total_expected, 3);

    let progress = fx.engine.progress().await;
    assert!(progress.in_progress);
    assert_eq!(progress.total, 3);
    assert_eq!(progress.completed, 0);
}

#[tokio::test]
async fn completions_then_drain_reset_the_session() {
    let fx = fixture(StaticHttpClient::ok(MANIFEST));
    fx.engine
        .start_sync("http://media.local/index.json")
        .await
        .unwrap();

    let tags = [
        "Muse/Absolution/Hysteria.mp3",
        "Muse/Absolution/Apocalypse Please.mp3",
        "Muse/Showbiz/Muscle Museum.mp3",
    ];
    for (i, tag) in tags.iter().enumerate() {
        let staged = stage_file(&format!("delivered-{}.part", i), b"audio").await;
        fx.engine
            .handle_update(TransferUpdate::Delivered {
                tag: tag.to_string(),
                staged_at: staged,
            })
            .await;
    }

    // All three landed in the media store and were counted
    for tag in &tags {
        assert!(fx.files.exists(tag).await.unwrap());
    }
    assert_eq!(fx.engine.progress().await.completed, 3);

    // Terminal drain event clears the durable record and resets counters
    fx.engine.handle_update(TransferUpdate::SessionDrained).await;

    let session = DownloadSession::load(fx.settings.as_ref()).await.unwrap();
    assert!(!session.in_progress);
    assert_eq!(session.total_expected, 0);
    assert_eq!(fx.engine.progress().await, Default::default());
}

#[tokio::test]
async fn reconciliation_recounts_from_disk_without_resubmitting() {
    let fx = fixture(StaticHttpClient::ok(MANIFEST));
    fx.engine
        .start_sync("http://media.local/index.json")
        .await
        .unwrap();

    // Simulate a process restart mid-download: two of three files landed.
    fx.files
        .write("Muse/Absolution/Hysteria.mp3", Bytes::from_static(b"x"))
        .await
        .unwrap();
    fx.files
        .write("Muse/Showbiz/Muscle Museum.mp3", Bytes::from_static(b"x"))
        .await
        .unwrap();

    let relaunched = SyncEngine::new(
        Arc::new(UnreachableHttpClient),
        fx.transfers.clone(),
        fx.catalog.clone(),
        fx.files.clone(),
        fx.settings.clone(),
        Arc::new(EventBus::default()),
    );
    let submitted_before = fx.transfers.submitted().await.len();

    relaunched.reconcile_on_launch().await.unwrap();

    let progress = relaunched.progress().await;
    assert!(progress.in_progress);
    assert_eq!(progress.total, 3);
    assert_eq!(progress.completed, 2);

    // Reconciliation never issues new downloads
    assert_eq!(fx.transfers.submitted().await.len(), submitted_before);
}

#[tokio::test]
async fn reconciliation_is_a_noop_without_a_session() {
    let fx = fixture(StaticHttpClient::ok(MANIFEST));
    fx.engine.reconcile_on_launch().await.unwrap();
    assert_eq!(fx.engine.progress().await, Default::default());
}

#[tokio::test]
async fn invalid_address_fails_and_clears_the_flag() {
    let fx = fixture(StaticHttpClient::ok(MANIFEST));

    let err = fx.engine.start_sync("not a url").await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidUrl(_)));

    assert_eq!(
        fx.settings.get_bool(DOWNLOAD_IN_PROGRESS_KEY).await.unwrap(),
        Some(false)
    );
    assert!(!fx.engine.progress().await.in_progress);
}

#[tokio::test]
async fn http_error_status_maps_to_download_failed() {
    let fx = fixture(StaticHttpClient::status(503));

    let err = fx
        .engine
        .start_sync("http://media.local/index.json")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::DownloadFailed { status: 503 }));

    let session = DownloadSession::load(fx.settings.as_ref()).await.unwrap();
    assert!(!session.in_progress);
}

#[tokio::test]
async fn malformed_manifest_maps_to_decoding_failed() {
    let fx = fixture(StaticHttpClient::ok("these are not albums"));

    let err = fx
        .engine
        .start_sync("http://media.local/index.json")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::DecodingFailed(_)));
}

#[tokio::test]
async fn transport_failure_maps_to_request_failed() {
    let fx = fixture(UnreachableHttpClient);

    let err = fx
        .engine
        .start_sync("http://media.local/index.json")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::RequestFailed(_)));
}

#[tokio::test]
async fn reset_phase_destroys_the_previous_library_even_on_failure() {
    let fx = fixture(UnreachableHttpClient);

    // Seed a previous library
    fx.files
        .write("Old/Old/old.mp3", Bytes::from_static(b"x"))
        .await
        .unwrap();
    fx.catalog
        .replace(vec![core_library::Artist::new(
            "Old",
            vec![core_library::Album::new(
                "Old",
                vec![core_library::Song {
                    id: core_library::SongId::new("old"),
                    title: "Old".to_string(),
                    artist: "Old".to_string(),
                    album: "Old".to_string(),
                    relative_path: "Old/Old/old.mp3".to_string(),
                }],
            )],
        )])
        .await
        .unwrap();

    let _ = fx.engine.start_sync("http://media.local/index.json").await;

    // The reset ran before the fetch failed: no rollback to the old state.
    assert!(fx.catalog.artists().await.is_empty());
    assert!(!fx.files.exists("Old/Old/old.mp3").await.unwrap());
}

#[tokio::test]
async fn failed_downloads_are_counted_but_not_stored() {
    let fx = fixture(StaticHttpClient::ok(MANIFEST));
    fx.engine
        .start_sync("http://media.local/index.json")
        .await
        .unwrap();

    fx.engine
        .handle_update(TransferUpdate::Failed {
            tag: "Muse/Absolution/Hysteria.mp3".to_string(),
            message: "HTTP 404".to_string(),
        })
        .await;

    let progress = fx.engine.progress().await;
    assert_eq!(progress.completed, 0);
    assert_eq!(progress.failed, 1);
    assert!(!fx
        .files
        .exists("Muse/Absolution/Hysteria.mp3")
        .await
        .unwrap());
}

#[tokio::test]
async fn delete_library_clears_everything() {
    let fx = fixture(StaticHttpClient::ok(MANIFEST));
    fx.engine
        .start_sync("http://media.local/index.json")
        .await
        .unwrap();

    fx.engine.delete_library().await.unwrap();

    assert!(fx.catalog.artists().await.is_empty());
    assert_eq!(
        fx.settings.get_i64(EXPECTED_FILE_COUNT_KEY).await.unwrap(),
        Some(0)
    );
    assert_eq!(fx.engine.progress().await, Default::default());
}
