//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{BrowserIo, SchemaBrowser, ViewerOptions};
use crate::config::Settings;
use crate::infrastructure::traits::{
    BrowserFrame, CommandRunner, DownloadNavigator, FileSystem, HttpClient, JsonFileStore,
    KeyValueStore, RealCommandRunner, RealFileSystem, ReqwestHttpClient,
};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding the I/O implementations shared by all services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Persistent UI state
    pub store: Arc<dyn KeyValueStore>,

    /// Inspection server client
    pub http: Arc<dyn HttpClient>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(JsonFileStore::open(fs.clone(), settings.state_file()));
        let http = ReqwestHttpClient::new(&settings.server_url, settings.timeout())
            .map_err(|e| InfraError::io("create HTTP client", e))?;

        Ok(Self::with_deps(
            settings,
            fs,
            Arc::new(RealCommandRunner),
            store,
            Arc::new(http),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        store: Arc<dyn KeyValueStore>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            cmd,
            store,
            http,
        }
    }

    /// Build the schema browser (not yet initialized).
    pub fn schema_browser(&self) -> InfraResult<SchemaBrowser> {
        let formats = self.settings.schema_formats()?;
        let io = BrowserIo {
            http: self.http.clone(),
            store: self.store.clone(),
            navigator: Arc::new(DownloadNavigator::new(
                self.http.clone(),
                self.fs.clone(),
                self.settings.download_dir.clone(),
            )),
            display: Arc::new(BrowserFrame::new(
                self.settings.browser.clone(),
                self.cmd.clone(),
            )),
            fs: self.fs.clone(),
        };
        let viewer = ViewerOptions {
            page: self.settings.viewer_page.clone(),
            style: self.settings.viewer_style.clone(),
            document: self.settings.viewer_document(),
        };
        Ok(SchemaBrowser::new(io, formats, viewer))
    }
}
