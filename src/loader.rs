use crate::diagnostics::Diagnostics;
use crate::glacier::GlacierRecord;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use simd_json::OwnedValue;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

/// Why a glacier collection could not be retrieved
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("glacier server responded with {0}")]
    Status(StatusCode),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode glacier collection: {0}")]
    Decode(#[from] simd_json::Error),
    #[error("loader worker exited without a result")]
    Disconnected,
}

/// Somewhere a glacier collection can be fetched from
pub trait GlacierSource: Send + 'static {
    fn fetch(&self) -> Result<Vec<GlacierRecord>, LoadError>;

    /// Human-readable origin, used in diagnostics
    fn describe(&self) -> String;
}

/// Decode a JSON array of glacier records.
///
/// The array itself must parse. Elements that do not match the record
/// shape are dropped one by one so the rest of the collection still loads.
pub fn decode_collection(mut bytes: Vec<u8>) -> Result<Vec<GlacierRecord>, LoadError> {
    let values: Vec<OwnedValue> = simd_json::serde::from_slice(&mut bytes)?;
    let total = values.len();

    let glaciers: Vec<GlacierRecord> = values
        .into_iter()
        .filter_map(|value| match simd_json::serde::from_owned_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("Dropping malformed glacier record: {}", e);
                None
            }
        })
        .collect();

    if glaciers.len() < total {
        log::warn!("Dropped {} of {} malformed glacier records", total - glaciers.len(), total);
    }
    Ok(glaciers)
}

/// Unauthenticated GET against the glacier endpoint
pub struct HttpSource {
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl GlacierSource for HttpSource {
    fn fetch(&self) -> Result<Vec<GlacierRecord>, LoadError> {
        let response = Client::new().get(&self.url).send()?;
        if !response.status().is_success() {
            return Err(LoadError::Status(response.status()));
        }
        let bytes = response.bytes()?.to_vec();
        decode_collection(bytes)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// A glacier collection saved to disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GlacierSource for FileSource {
    fn fetch(&self) -> Result<Vec<GlacierRecord>, LoadError> {
        let bytes = fs::read(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;
        decode_collection(bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

enum State {
    Pending(Receiver<Result<Vec<GlacierRecord>, LoadError>>),
    Finished,
}

/// One-shot retrieval running on a worker thread.
///
/// The UI loop calls [`Loader::poll`] every frame; the collection is
/// handed out exactly once and a failure is reported exactly once.
pub struct Loader {
    state: State,
    origin: String,
}

impl Loader {
    /// Start the single retrieval. There is no retry and no cancellation.
    pub fn spawn<S: GlacierSource>(source: S) -> Self {
        let origin = source.describe();
        log::debug!("Fetching glaciers from {}", origin);

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // Receiver may already be gone if the app quit early
            let _ = tx.send(source.fetch());
        });

        Self {
            state: State::Pending(rx),
            origin,
        }
    }

    /// Check for the retrieval result without blocking
    pub fn poll(&mut self, diagnostics: &mut Diagnostics) -> Option<Vec<GlacierRecord>> {
        let result = match &self.state {
            State::Pending(rx) => match rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err(LoadError::Disconnected),
            },
            State::Finished => return None,
        };

        self.state = State::Finished;
        match result {
            Ok(glaciers) => {
                log::debug!("Received {} glacier records from {}", glaciers.len(), self.origin);
                Some(glaciers)
            }
            Err(e) => {
                diagnostics.error(format!("API error ({}): {}", self.origin, e));
                None
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct StaticSource(&'static str);

    impl GlacierSource for StaticSource {
        fn fetch(&self) -> Result<Vec<GlacierRecord>, LoadError> {
            decode_collection(self.0.as_bytes().to_vec())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct FailingSource {
        calls: Arc<AtomicUsize>,
    }

    impl GlacierSource for FailingSource {
        fn fetch(&self) -> Result<Vec<GlacierRecord>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LoadError::Status(StatusCode::SERVICE_UNAVAILABLE))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    /// Poll like the UI loop does until the loader settles
    fn poll_until_finished(loader: &mut Loader, diag: &mut Diagnostics) -> Option<Vec<GlacierRecord>> {
        for _ in 0..2500 {
            if let Some(glaciers) = loader.poll(diag) {
                return Some(glaciers);
            }
            if loader.is_finished() {
                return None;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("loader never finished");
    }

    #[test]
    fn test_success_hands_over_collection_once() {
        let mut diag = Diagnostics::new();
        let mut loader = Loader::spawn(StaticSource(
            r#"[{"glacier_id":"G1","lat":30.1,"lon":79.2,"risk_level":"High"}]"#,
        ));

        let glaciers = poll_until_finished(&mut loader, &mut diag).unwrap();
        assert_eq!(glaciers.len(), 1);
        assert!(loader.poll(&mut diag).is_none());
        assert!(diag.entries().is_empty());
    }

    #[test]
    fn test_failure_logs_exactly_one_error_and_never_retries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut diag = Diagnostics::new();
        let mut loader = Loader::spawn(FailingSource { calls: calls.clone() });

        assert!(poll_until_finished(&mut loader, &mut diag).is_none());
        for _ in 0..5 {
            assert!(loader.poll(&mut diag).is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(diag.entries().len(), 1);
        assert_eq!(diag.entries()[0].level, Level::Error);
        assert!(diag.entries()[0].message.contains("503"));
    }

    #[test]
    fn test_decode_error_is_reported() {
        let mut diag = Diagnostics::new();
        let mut loader = Loader::spawn(StaticSource("{not json"));
        assert!(poll_until_finished(&mut loader, &mut diag).is_none());
        assert_eq!(diag.at_level(Level::Error).count(), 1);
        assert!(diag.entries()[0].message.contains("decode"));
    }

    #[test]
    fn test_malformed_records_are_dropped_individually() {
        let glaciers = decode_collection(
            br#"[{"glacier_id":"G1","lat":30.1,"lon":79.2,"risk_level":"High"},
                {"glacier_id":"G2","lat":30.2,"lon":79.3,"area_km2":"12.3"},
                {"glacier_id":null,"lat":30.3,"lon":79.4},
                {"glacier_id":7,"lat":30.4,"lon":79.5}]"#
                .to_vec(),
        )
        .unwrap();

        let ids: Vec<&str> = glaciers.iter().map(|g| g.glacier_id.as_str()).collect();
        assert_eq!(ids, vec!["G1", "7"]);
    }

    #[test]
    fn test_non_array_payload_is_a_decode_error() {
        let err = decode_collection(br#"{"glacier_id":"G1"}"#.to_vec()).unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)));
    }

    /// Answer a single HTTP request on a local port with a canned response
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/api/glaciers", addr)
    }

    #[test]
    fn test_http_source_decodes_response_body() {
        let url = serve_once(
            "200 OK",
            r#"[{"glacier_id":"G1","lat":30.1,"lon":79.2,"area_km2":5.5,"risk_level":"High"}]"#,
        );
        let mut diag = Diagnostics::new();
        let mut loader = Loader::spawn(HttpSource::new(url));

        let glaciers = poll_until_finished(&mut loader, &mut diag).unwrap();
        assert_eq!(glaciers.len(), 1);
        assert_eq!(glaciers[0].glacier_id, "G1");
        assert_eq!(glaciers[0].area_km2, Some(5.5));
        assert!(diag.entries().is_empty());
    }

    #[test]
    fn test_http_server_error_is_reported_once() {
        let url = serve_once("500 Internal Server Error", "oops");
        let mut diag = Diagnostics::new();
        let mut loader = Loader::spawn(HttpSource::new(url.clone()));

        assert!(poll_until_finished(&mut loader, &mut diag).is_none());
        assert!(loader.poll(&mut diag).is_none());
        assert_eq!(diag.entries().len(), 1);
        assert_eq!(diag.entries()[0].level, Level::Error);
        assert!(diag.entries()[0].message.contains("500"));
        assert!(diag.entries()[0].message.contains(&url));
    }

    #[test]
    fn test_http_connection_refused_is_reported_once() {
        // Bind then release a port so nothing is listening on it
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
        let mut diag = Diagnostics::new();
        let mut loader = Loader::spawn(HttpSource::new(format!("http://{}/api/glaciers", addr)));

        assert!(poll_until_finished(&mut loader, &mut diag).is_none());
        assert!(loader.poll(&mut diag).is_none());
        assert_eq!(diag.entries().len(), 1);
        assert_eq!(diag.entries()[0].level, Level::Error);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = FileSource::new("/nonexistent/glaciers.json").fetch().unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
