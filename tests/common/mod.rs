//! Shared mocks for integration tests
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use schema_inspector::application::services::{BrowserIo, SchemaBrowser, ViewerOptions};
use schema_inspector::domain::SchemaFormat;
use schema_inspector::infrastructure::traits::{
    DisplayFrame, HttpClient, HttpResponse, KeyValueStore, Navigation, Navigator, RealFileSystem,
};

pub const BASE_URL: &str = "http://inspector.test/inspector";
pub const VIEWER_PAGE: &str = "swagger/editor/index.html";
pub const VIEWER_MARKUP: &str =
    "<html><head><title>editor</title></head><body><div id=\"editor\"></div></body></html>";

/// In-memory store that can be told to fail writes.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.lock().unwrap();
            for (k, v) in entries {
                map.insert(k.to_string(), v.to_string());
            }
        }
        store
    }

    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Canned responses by server-relative path; every request is recorded.
#[derive(Default)]
pub struct MockHttp {
    responses: Mutex<BTreeMap<String, HttpResponse>>,
    requests: Mutex<Vec<String>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, path: &str, response: HttpResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), response);
    }

    pub fn respond_text(&self, path: &str, body: &str) {
        self.respond(path, HttpResponse::ok(body));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|p| *p == path).count()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl HttpClient for MockHttp {
    fn resolve(&self, path: &str) -> String {
        format!("{}/{}", BASE_URL, path)
    }

    fn get(&self, path: &str) -> io::Result<HttpResponse> {
        self.requests.lock().unwrap().push(path.to_string());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or(HttpResponse {
                status: 404,
                body: b"not found".to_vec(),
                content_disposition: None,
            }))
    }
}

/// Records navigations instead of saving anything.
#[derive(Default)]
pub struct RecordingNavigator {
    pub navigations: Mutex<Vec<Navigation>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, navigation: &Navigation) -> io::Result<PathBuf> {
        self.navigations.lock().unwrap().push(navigation.clone());
        Ok(PathBuf::from("/downloads").join(&navigation.fallback_name))
    }
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        self.navigations
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.path.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shown {
    Url(String),
    Document(PathBuf),
}

/// Records what the display was asked to show.
#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Mutex<Vec<Shown>>,
}

impl RecordingDisplay {
    pub fn shown(&self) -> Vec<Shown> {
        self.shown.lock().unwrap().clone()
    }
}

impl DisplayFrame for RecordingDisplay {
    fn open_url(&self, url: &str) -> io::Result<()> {
        self.shown.lock().unwrap().push(Shown::Url(url.to_string()));
        Ok(())
    }

    fn open_document(&self, path: &Path) -> io::Result<()> {
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Document(path.to_path_buf()));
        Ok(())
    }
}

/// A browser wired to mocks, plus handles on every mock.
pub struct Harness {
    pub temp: TempDir,
    pub http: Arc<MockHttp>,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub display: Arc<RecordingDisplay>,
}

impl Harness {
    /// Server offering `ids`, each with a small body per format.
    pub fn new(ids: &[&str]) -> Self {
        Self::with_store(ids, MemoryStore::new())
    }

    pub fn with_store(ids: &[&str], store: MemoryStore) -> Self {
        let http = MockHttp::new();
        let list = serde_json::to_string(ids).unwrap();
        http.respond_text("schemas", &list);
        http.respond_text(VIEWER_PAGE, VIEWER_MARKUP);
        for id in ids {
            for format in ["SWAGGER", "HTML"] {
                http.respond_text(
                    &format!("schemas/{id}?download=false&format={format}"),
                    &format!("{id} as {format}"),
                );
            }
        }
        Self {
            temp: TempDir::new().unwrap(),
            http: Arc::new(http),
            store: Arc::new(store),
            navigator: Arc::new(RecordingNavigator::default()),
            display: Arc::new(RecordingDisplay::default()),
        }
    }

    pub fn document(&self) -> PathBuf {
        self.temp.path().join("swagger-viewer.html")
    }

    pub fn browser(&self, formats: Vec<SchemaFormat>) -> SchemaBrowser {
        let io = BrowserIo {
            http: self.http.clone(),
            store: self.store.clone(),
            navigator: self.navigator.clone(),
            display: self.display.clone(),
            fs: Arc::new(RealFileSystem),
        };
        let viewer = ViewerOptions {
            page: VIEWER_PAGE.to_string(),
            style: ".topbar { display: none; }".to_string(),
            document: self.document(),
        };
        SchemaBrowser::new(io, formats, viewer)
    }

    pub fn default_browser(&self) -> SchemaBrowser {
        self.browser(vec![SchemaFormat::Swagger, SchemaFormat::Html])
    }
}
