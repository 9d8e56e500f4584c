//! Schema browser controller
//!
//! Populates the schema tree from the inspection server and turns node
//! activations into views (embedded spec viewer, server-rendered HTML) and
//! downloads.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::services::tree_widget::{TreeEvent, TreeWidget};
use crate::application::viewer_markup::{base_href, rewrite_bootstrap};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    download_all_path, schema_id_from_node, schema_node_id, schema_path, schemas_path,
    sorted_schema_ids, Click, DomainError, FormatSelector, NodeSpec, SchemaFormat, TreeArena,
    SCHEMAS_NODE_ID,
};
use crate::infrastructure::traits::{
    DisplayFrame, FileSystem, HttpClient, HttpResponse, KeyValueStore, Navigation, Navigator,
};

/// Container id of the schema tree.
pub const TREE_CONTAINER_ID: &str = "schemas";
/// Store key of the selected format index.
pub const FORMAT_INDEX_KEY: &str = "schemaFormatIdx";
/// Store key naming the schema handed to the spec viewer.
pub const VIEWER_SCHEMA_ID_KEY: &str = "schemaId";
/// Store key holding the content handed to the spec viewer.
pub const VIEWER_CONTENT_KEY: &str = "swagger-editor-content";

/// I/O the browser talks to.
#[derive(Clone)]
pub struct BrowserIo {
    pub http: Arc<dyn HttpClient>,
    pub store: Arc<dyn KeyValueStore>,
    pub navigator: Arc<dyn Navigator>,
    pub display: Arc<dyn DisplayFrame>,
    pub fs: Arc<dyn FileSystem>,
}

/// Where the spec viewer comes from and where its generated page goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerOptions {
    /// Server-relative path of the viewer bootstrap page
    pub page: String,
    /// CSS injected into the bootstrap page
    pub style: String,
    /// Local file the rewritten page is written to
    pub document: PathBuf,
}

/// What a view request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOutcome {
    /// Viewer page generated and loaded into the display
    SpecViewerLoaded { schema_id: String, document: PathBuf },
    /// Viewer already loaded; content replaced in place
    SpecViewerUpdated { schema_id: String, document: PathBuf },
    /// Display pointed at the server's own rendering
    FrameNavigated { schema_id: String, url: String },
    /// Nothing to show for this format
    Skipped { schema_id: String, format: SchemaFormat },
}

pub struct SchemaBrowser {
    io: BrowserIo,
    widget: TreeWidget,
    selector: FormatSelector,
    viewer: ViewerOptions,
    /// Bootstrap markup of the loaded spec viewer
    viewer_markup: Option<String>,
    schema_ids: Vec<String>,
    /// Cleared while restoring state without showing anything
    views_enabled: bool,
}

impl SchemaBrowser {
    pub fn new(io: BrowserIo, formats: Vec<SchemaFormat>, viewer: ViewerOptions) -> Self {
        let widget = TreeWidget::new(TreeArena::new(TREE_CONTAINER_ID), io.store.clone());
        Self {
            io,
            widget,
            selector: FormatSelector::new(formats),
            viewer,
            viewer_markup: None,
            schema_ids: Vec::new(),
            views_enabled: true,
        }
    }

    pub fn widget(&self) -> &TreeWidget {
        &self.widget
    }

    pub fn selector(&self) -> &FormatSelector {
        &self.selector
    }

    /// Schema ids currently in the tree, sorted.
    pub fn schema_ids(&self) -> &[String] {
        &self.schema_ids
    }

    pub fn is_viewer_loaded(&self) -> bool {
        self.viewer_markup.is_some()
    }

    /// Apply the persisted format, fetch the schema list and populate the tree.
    pub fn initialize(&mut self) -> ApplicationResult<Option<ViewOutcome>> {
        self.load_format_preference();
        let ids = self.fetch_schema_ids()?;
        self.populate_tree(ids)
    }

    /// Same as [`Self::initialize`] but the re-activated node is not viewed.
    pub fn restore(&mut self) -> ApplicationResult<()> {
        self.views_enabled = false;
        let result = self.initialize();
        self.views_enabled = true;
        result.map(|_| ())
    }

    /// Apply the persisted format index to the selector.
    pub fn load_format_preference(&mut self) {
        let stored = self.io.store.get(FORMAT_INDEX_KEY);
        self.selector.apply_persisted(stored.as_deref());
        debug!("format: {} (stored {:?})", self.selector.selected(), stored);
    }

    pub fn fetch_schema_ids(&self) -> ApplicationResult<Vec<String>> {
        let response = self.fetch(schemas_path())?;
        serde_json::from_slice::<Vec<String>>(&response.body).map_err(|e| {
            ApplicationError::InvalidResponse {
                url: self.io.http.resolve(schemas_path()),
                message: e.to_string(),
            }
        })
    }

    /// Schema names in tree order: sorted, without duplicates.
    pub fn list_schemas(&self) -> ApplicationResult<Vec<String>> {
        Ok(sorted_schema_ids(self.fetch_schema_ids()?))
    }

    /// Add one node per schema, sorted, then hand over to the tree widget.
    pub fn populate_tree(&mut self, ids: Vec<String>) -> ApplicationResult<Option<ViewOutcome>> {
        self.schema_ids = sorted_schema_ids(ids);
        info!("populating tree with {} schemas", self.schema_ids.len());

        let tree = self.widget.tree_mut();
        if let Some(stale) = tree.find_by_id(SCHEMAS_NODE_ID) {
            tree.remove(stale);
        }
        let group = tree.append(NodeSpec::group(SCHEMAS_NODE_ID, "schemas"), None);
        for id in &self.schema_ids {
            tree.append(NodeSpec::leaf(schema_node_id(id), id.as_str()), Some(group));
        }

        let event = self.widget.initialize()?;
        self.after_tree_event(event)
    }

    /// Dispatch a raw click into the tree.
    pub fn click(&mut self, click: Click) -> ApplicationResult<Option<ViewOutcome>> {
        let event = self.widget.dispatch(click)?;
        self.after_tree_event(event)
    }

    /// Label click on a schema node.
    pub fn select_schema(&mut self, schema_id: &str) -> ApplicationResult<Option<ViewOutcome>> {
        let node_id = schema_node_id(schema_id);
        if self.widget.tree().find_by_id(&node_id).is_none() {
            return Err(DomainError::UnknownSchema(schema_id.to_string()).into());
        }
        let event = self.widget.click_label(&node_id)?;
        self.after_tree_event(event)
    }

    /// Toggle click on any node with an id.
    pub fn toggle(&mut self, node_id: &str) -> ApplicationResult<Option<TreeEvent>> {
        if self.widget.tree().find_by_id(node_id).is_none() {
            return Err(DomainError::UnknownNode(node_id.to_string()).into());
        }
        self.widget.click_toggle(node_id)
    }

    /// Schema id of the active node, if a schema node is active.
    pub fn active_schema(&self) -> Option<String> {
        let tree = self.widget.tree();
        let node = tree.get_node(tree.active()?)?;
        schema_id_from_node(node.id.as_deref()?).map(str::to_string)
    }

    /// Persist the new format and refresh the active schema in it.
    pub fn change_format(&mut self, idx: usize) -> ApplicationResult<Option<ViewOutcome>> {
        self.selector.select_index(idx)?;
        self.io
            .store
            .set(FORMAT_INDEX_KEY, &idx.to_string())
            .with_store_context(FORMAT_INDEX_KEY)?;
        debug!("format changed to {}", self.selector.selected());

        match self.active_schema() {
            Some(schema_id) => self.select_schema(&schema_id),
            None => Ok(None),
        }
    }

    /// Show a schema in the selected format.
    pub fn view_schema(&mut self, schema_id: &str) -> ApplicationResult<ViewOutcome> {
        let format = self.selector.selected().clone();
        debug!("view {} as {}", schema_id, format);
        match format {
            SchemaFormat::Swagger => self.show_in_spec_viewer(schema_id, &format),
            SchemaFormat::Html => {
                let url = self.io.http.resolve(&schema_path(schema_id, false, &format));
                self.io
                    .display
                    .open_url(&url)
                    .map_err(|e| ApplicationError::OperationFailed {
                        context: format!("open {url}"),
                        source: Box::new(e),
                    })?;
                Ok(ViewOutcome::FrameNavigated {
                    schema_id: schema_id.to_string(),
                    url,
                })
            }
            SchemaFormat::Other(_) => Ok(ViewOutcome::Skipped {
                schema_id: schema_id.to_string(),
                format,
            }),
        }
    }

    /// Save one schema in the selected format.
    pub fn download(&self, schema_id: &str) -> ApplicationResult<PathBuf> {
        let format = self.selector.selected();
        self.navigate(Navigation {
            path: schema_path(schema_id, true, format),
            fallback_name: format!("{}{}", schema_id, format.suffix()),
        })
    }

    /// Save the archive of all schemas in the selected format.
    pub fn download_all(&self) -> ApplicationResult<PathBuf> {
        let format = self.selector.selected();
        self.navigate(Navigation {
            path: download_all_path(format),
            fallback_name: format!("schemas{}.zip", format.suffix()),
        })
    }

    fn after_tree_event(
        &mut self,
        event: Option<TreeEvent>,
    ) -> ApplicationResult<Option<ViewOutcome>> {
        let Some(TreeEvent::Activated { id: Some(id), .. }) = event else {
            return Ok(None);
        };
        if !self.views_enabled {
            return Ok(None);
        }
        match schema_id_from_node(&id) {
            Some(schema_id) => {
                let schema_id = schema_id.to_string();
                self.view_schema(&schema_id).map(Some)
            }
            None => Ok(None),
        }
    }

    fn show_in_spec_viewer(
        &mut self,
        schema_id: &str,
        format: &SchemaFormat,
    ) -> ApplicationResult<ViewOutcome> {
        let content = self.fetch_schema(schema_id, format)?.text();

        if let Some(markup) = self.viewer_markup.clone() {
            self.hand_off(schema_id, &content)?;
            self.write_viewer_document(&markup, schema_id, &content)?;
            return Ok(ViewOutcome::SpecViewerUpdated {
                schema_id: schema_id.to_string(),
                document: self.viewer.document.clone(),
            });
        }

        let page = self.viewer.page.clone();
        let markup = self.fetch(&page)?.text();
        self.hand_off(schema_id, &content)?;
        self.write_viewer_document(&markup, schema_id, &content)?;
        self.io
            .display
            .open_document(&self.viewer.document)
            .with_path_context("open viewer document", &self.viewer.document)?;
        self.viewer_markup = Some(markup);
        info!("spec viewer loaded for {}", schema_id);

        Ok(ViewOutcome::SpecViewerLoaded {
            schema_id: schema_id.to_string(),
            document: self.viewer.document.clone(),
        })
    }

    fn hand_off(&self, schema_id: &str, content: &str) -> ApplicationResult<()> {
        let store = &self.io.store;
        store
            .set(VIEWER_SCHEMA_ID_KEY, schema_id)
            .with_store_context(VIEWER_SCHEMA_ID_KEY)?;
        store
            .set(VIEWER_CONTENT_KEY, content)
            .with_store_context(VIEWER_CONTENT_KEY)
    }

    fn write_viewer_document(
        &self,
        markup: &str,
        schema_id: &str,
        content: &str,
    ) -> ApplicationResult<()> {
        let base = base_href(&self.io.http.resolve(&self.viewer.page));
        let html = rewrite_bootstrap(
            markup,
            &base,
            &self.viewer.style,
            &[(VIEWER_SCHEMA_ID_KEY, schema_id), (VIEWER_CONTENT_KEY, content)],
        );
        self.io
            .fs
            .write_atomic(&self.viewer.document, html.as_bytes())
            .with_path_context("write viewer document", &self.viewer.document)
    }

    fn navigate(&self, navigation: Navigation) -> ApplicationResult<PathBuf> {
        debug!("navigate {}", navigation.path);
        self.io
            .navigator
            .navigate(&navigation)
            .map_err(|source| ApplicationError::Fetch {
                url: self.io.http.resolve(&navigation.path),
                source,
            })
    }

    fn fetch_schema(
        &self,
        schema_id: &str,
        format: &SchemaFormat,
    ) -> ApplicationResult<HttpResponse> {
        match self.fetch(&schema_path(schema_id, false, format)) {
            Err(ApplicationError::Status { status: 404, .. }) => {
                Err(ApplicationError::SchemaNotFound(schema_id.to_string()))
            }
            other => other,
        }
    }

    fn fetch(&self, path: &str) -> ApplicationResult<HttpResponse> {
        let url = self.io.http.resolve(path);
        let response = self
            .io
            .http
            .get(path)
            .map_err(|source| ApplicationError::Fetch {
                url: url.clone(),
                source,
            })?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApplicationError::Status {
                url,
                status: response.status,
            })
        }
    }
}
