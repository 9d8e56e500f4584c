//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace file content atomically (temp file + rename in the same directory).
    fn write_atomic(&self, path: &Path, content: &[u8]) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Persistent key-value storage shared by every UI component.
///
/// Writes are synchronous; a successful `set` is on disk when it returns.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> io::Result<()>;
}

/// Response of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Raw `Content-Disposition` header, if any
    pub content_disposition: Option<String>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_disposition: None,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// `filename` parameter of the `Content-Disposition` header.
    pub fn attachment_name(&self) -> Option<String> {
        let header = self.content_disposition.as_deref()?;
        header.split(';').map(str::trim).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("filename") {
                return None;
            }
            let name = value.trim().trim_matches('"');
            // Never let a server-provided name escape the download directory
            let name = Path::new(name).file_name()?.to_str()?.to_string();
            (!name.is_empty()).then_some(name)
        })
    }
}

/// HTTP client resolving paths against the inspection server root.
pub trait HttpClient: Send + Sync {
    /// Absolute URL for a server-relative path.
    fn resolve(&self, path: &str) -> String;

    /// GET a server-relative path. Non-2xx statuses are returned, not raised.
    fn get(&self, path: &str) -> io::Result<HttpResponse>;
}

/// A full navigation that ends in a file save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Server-relative path including the query
    pub path: String,
    /// File name used when the server does not provide one
    pub fallback_name: String,
}

/// Performs navigations (downloads) on behalf of the UI.
pub trait Navigator: Send + Sync {
    /// Returns where the result was saved.
    fn navigate(&self, navigation: &Navigation) -> io::Result<PathBuf>;
}

/// The frame schema views are shown in.
pub trait DisplayFrame: Send + Sync {
    /// Point the frame at an absolute URL.
    fn open_url(&self, url: &str) -> io::Result<()>;

    /// Load a generated local document.
    fn open_document(&self, path: &Path) -> io::Result<()>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output>;
}

/// Item for FZF-style selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Display text shown in selector
    pub display: String,
    /// Actual value (e.g., schema id)
    pub value: String,
}

/// Interactive FZF-style selector abstraction.
pub trait Selector: Send + Sync {
    /// Present items to user and return selected one.
    /// Returns None if user cancels (Esc/Ctrl-C).
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, content: &[u8]) -> io::Result<()> {
        self.ensure_parent(path)?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Key-value store persisted as one JSON object file.
///
/// The whole map is rewritten on every `set`.
pub struct JsonFileStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store; a missing or malformed file starts empty.
    pub fn open(fs: Arc<dyn FileSystem>, path: PathBuf) -> Self {
        let entries = if fs.exists(&path) {
            match fs.read_to_string(&path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    warn!("ignoring malformed state file {}: {}", path.display(), e);
                    BTreeMap::new()
                }),
                Err(e) => {
                    warn!("cannot read state file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        debug!("opened store {} ({} keys)", path.display(), entries.len());
        Self {
            path,
            fs,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        let json = serde_json::to_vec_pretty(&updated)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.fs.write_atomic(&self.path, &json)?;
        *entries = updated;
        Ok(())
    }
}

/// Blocking reqwest client bound to the server root.
pub struct ReqwestHttpClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ReqwestHttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> io::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(io::Error::other)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn resolve(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get(&self, path: &str) -> io::Result<HttpResponse> {
        let url = self.resolve(path);
        debug!("GET {}", url);
        let response = self.client.get(&url).send().map_err(io::Error::other)?;
        let status = response.status().as_u16();
        let content_disposition = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().map_err(io::Error::other)?.to_vec();
        Ok(HttpResponse {
            status,
            body,
            content_disposition,
        })
    }
}

/// Navigator that saves responses into a download directory.
pub struct DownloadNavigator {
    http: Arc<dyn HttpClient>,
    fs: Arc<dyn FileSystem>,
    download_dir: PathBuf,
}

impl DownloadNavigator {
    pub fn new(http: Arc<dyn HttpClient>, fs: Arc<dyn FileSystem>, download_dir: PathBuf) -> Self {
        Self {
            http,
            fs,
            download_dir,
        }
    }
}

impl Navigator for DownloadNavigator {
    fn navigate(&self, navigation: &Navigation) -> io::Result<PathBuf> {
        let response = self.http.get(&navigation.path)?;
        if !response.is_success() {
            return Err(io::Error::other(format!(
                "GET {} returned status {}",
                self.http.resolve(&navigation.path),
                response.status
            )));
        }
        let name = response
            .attachment_name()
            .unwrap_or_else(|| flat_file_name(&navigation.fallback_name));
        let target = self.download_dir.join(name);
        self.fs.write_atomic(&target, &response.body)?;
        Ok(target)
    }
}

/// Single path component for `name`: separators become `_`, dot-only names
/// become `download`.
pub fn flat_file_name(name: &str) -> String {
    let flat: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    if flat.trim_matches('.').is_empty() {
        "download".to_string()
    } else {
        flat
    }
}

/// Display frame backed by an external browser command.
pub struct BrowserFrame {
    browser: String,
    cmd: Arc<dyn CommandRunner>,
}

impl BrowserFrame {
    pub fn new(browser: impl Into<String>, cmd: Arc<dyn CommandRunner>) -> Self {
        Self {
            browser: browser.into(),
            cmd,
        }
    }

    fn launch(&self, target: &str) -> io::Result<()> {
        let output = self.cmd.run(&self.browser, &[target])?;
        if output.status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "{} exited with status: {}",
                self.browser, output.status
            )))
        }
    }
}

impl DisplayFrame for BrowserFrame {
    fn open_url(&self, url: &str) -> io::Result<()> {
        self.launch(url)
    }

    fn open_document(&self, path: &Path) -> io::Result<()> {
        self.launch(&path.to_string_lossy())
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        std::process::Command::new(cmd).args(args).output()
    }
}

/// Real selector implementation using skim (FZF-like).
#[derive(Debug, Default)]
pub struct SkimSelector;

impl Selector for SkimSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        use skim::prelude::*;
        use std::io::Cursor;

        if items.is_empty() {
            return Ok(None);
        }

        // Build input as newline-separated display strings
        let input = items
            .iter()
            .map(|i| i.display.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(false)
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let item_reader = SkimItemReader::default();
        let items_arc = item_reader.of_bufread(Cursor::new(input));

        match Skim::run_with(&options, Some(items_arc)) {
            Some(out) if out.is_abort => Ok(None),
            Some(out) => Ok(out.selected_items.first().and_then(|selected| {
                let display = selected.output().to_string();
                items.iter().find(|i| i.display == display).cloned()
            })),
            None => Ok(None),
        }
    }
}
