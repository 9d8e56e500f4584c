//! End-to-end tests against an in-process inspection server

use std::io;
use std::process::Output;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;

use schema_inspector::application::services::ViewOutcome;
use schema_inspector::application::ApplicationError;
use schema_inspector::config::Settings;
use schema_inspector::infrastructure::traits::{
    CommandRunner, FileSystem, HttpClient, JsonFileStore, KeyValueStore, RealFileSystem,
    ReqwestHttpClient,
};
use schema_inspector::infrastructure::ServiceContainer;

const ZIP_BYTES: &[u8] = b"PK\x03\x04fake-archive";

/// Minimal inspector: list, single schema, bulk archive, viewer page.
/// Returns (stop_sender, server_url).
fn start_inspector() -> (mpsc::Sender<()>, String) {
    let server = tiny_http::Server::http("127.0.0.1:0").expect("Failed to start test server");
    let port = server.server_addr().to_ip().unwrap().port();
    let url = format!("http://127.0.0.1:{}/inspector", port);
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    thread::spawn(move || loop {
        if stop_rx.try_recv().is_ok() {
            break;
        }
        match server.recv_timeout(Duration::from_millis(100)) {
            Ok(Some(request)) => {
                let response = route(request.url());
                let _ = request.respond(response);
            }
            Ok(None) => {}
            Err(_) => break,
        }
    });

    (stop_tx, url)
}

fn header(name: &str, value: &str) -> tiny_http::Header {
    tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap()
}

fn route(url: &str) -> tiny_http::Response<io::Cursor<Vec<u8>>> {
    let body = |s: &str| s.as_bytes().to_vec();
    match url {
        "/inspector/schemas" => tiny_http::Response::from_data(body(r#"["orders","accounts"]"#))
            .with_header(header("Content-Type", "application/json")),
        "/inspector/schemas/accounts?download=false&format=SWAGGER" => {
            tiny_http::Response::from_data(body("swagger: '2.0'\ninfo:\n  title: accounts\n"))
                .with_header(header("Content-Disposition", "inline"))
        }
        "/inspector/schemas/accounts?download=true&format=SWAGGER" => {
            tiny_http::Response::from_data(body("swagger: '2.0'\n")).with_header(header(
                "Content-Disposition",
                "attachment; filename=\"accounts.yaml\"",
            ))
        }
        "/inspector/download/schemas?format=SWAGGER" => {
            tiny_http::Response::from_data(ZIP_BYTES.to_vec()).with_header(header(
                "Content-Disposition",
                "attachment; filename=\"billing-service.yaml.zip\"",
            ))
        }
        "/inspector/schemas/..%2Fescape?download=true&format=SWAGGER"
        | "/inspector/schemas/a%20b%2Fc?download=true&format=SWAGGER" => {
            tiny_http::Response::from_data(body("swagger: '2.0'\n"))
        }
        "/inspector/download/schemas?format=HTML" => {
            tiny_http::Response::from_data(ZIP_BYTES.to_vec())
        }
        "/inspector/swagger/editor/index.html" => tiny_http::Response::from_data(body(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body></body></html>",
        )),
        _ => tiny_http::Response::from_data(body("not found")).with_status_code(404),
    }
}

/// Records browser launches without starting anything.
#[derive(Default)]
struct RecordingRunner {
    launched: Mutex<Vec<(String, Vec<String>)>>,
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<Output> {
        self.launched.lock().unwrap().push((
            cmd.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        std::process::Command::new("true").output()
    }
}

struct Fixture {
    _stop: mpsc::Sender<()>,
    temp: TempDir,
    settings: Settings,
    runner: Arc<RecordingRunner>,
}

impl Fixture {
    fn new() -> Self {
        let (stop, url) = start_inspector();
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            server_url: url,
            state_dir: temp.path().join("state"),
            download_dir: temp.path().join("downloads"),
            browser: "test-browser".into(),
            timeout_secs: 5,
            ..Settings::default()
        };
        Self {
            _stop: stop,
            temp,
            settings,
            runner: Arc::new(RecordingRunner::default()),
        }
    }

    fn container(&self) -> ServiceContainer {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(JsonFileStore::open(fs.clone(), self.settings.state_file()));
        let http =
            ReqwestHttpClient::new(&self.settings.server_url, self.settings.timeout()).unwrap();
        ServiceContainer::with_deps(
            self.settings.clone(),
            fs,
            self.runner.clone(),
            store,
            Arc::new(http),
        )
    }
}

#[test]
fn given_server_when_getting_paths_then_resolves_against_root() {
    let (_stop, url) = start_inspector();
    let client = ReqwestHttpClient::new(&format!("{url}/"), Duration::from_secs(5)).unwrap();

    let list = client.get("schemas").unwrap();
    let missing = client.get("/nope").unwrap();

    assert_eq!(client.resolve("/schemas"), format!("{url}/schemas"));
    assert!(list.is_success());
    assert_eq!(list.text(), r#"["orders","accounts"]"#);
    assert_eq!(missing.status, 404);
}

#[test]
fn given_running_server_when_initializing_then_first_schema_opens_in_viewer() {
    // Arrange
    let fx = Fixture::new();
    let container = fx.container();
    let mut browser = container.schema_browser().unwrap();

    // Act
    let outcome = browser.initialize().unwrap();

    // Assert
    let document = fx.settings.viewer_document();
    assert_eq!(
        outcome,
        Some(ViewOutcome::SpecViewerLoaded {
            schema_id: "accounts".into(),
            document: document.clone(),
        })
    );
    let html = std::fs::read_to_string(&document).unwrap();
    assert!(html.contains(&format!(
        "<base href=\"{}/swagger/editor/\">",
        fx.settings.server_url
    )));
    assert!(html.contains("title: accounts"));

    let launched = fx.runner.launched.lock().unwrap().clone();
    assert_eq!(
        launched,
        vec![(
            "test-browser".to_string(),
            vec![document.to_string_lossy().to_string()]
        )]
    );
}

#[test]
fn given_state_from_previous_run_when_restarting_then_state_is_read_from_disk() {
    let fx = Fixture::new();
    {
        let container = fx.container();
        let mut browser = container.schema_browser().unwrap();
        browser.restore().unwrap();
        browser.toggle("schemas").unwrap();
        browser.change_format(1).unwrap();
    }

    let container = fx.container();
    let mut browser = container.schema_browser().unwrap();
    browser.restore().unwrap();

    let store = JsonFileStore::open(Arc::new(RealFileSystem), fx.settings.state_file());
    assert_eq!(store.get("schemaFormatIdx").as_deref(), Some("1"));
    assert_eq!(browser.selector().selected_index(), 1);
    assert_eq!(browser.active_schema().as_deref(), Some("accounts"));
    let tree = browser.widget().tree();
    let group = tree.get_node(tree.find_by_id("schemas").unwrap()).unwrap();
    assert!(!group.expanded);
}

#[test]
fn given_attachment_name_when_downloading_then_saved_under_server_name() {
    let fx = Fixture::new();
    let container = fx.container();
    let browser = container.schema_browser().unwrap();

    let single = browser.download("accounts").unwrap();
    let all = browser.download_all().unwrap();

    let downloads = fx.temp.path().join("downloads");
    assert_eq!(single, downloads.join("accounts.yaml"));
    assert_eq!(std::fs::read(&single).unwrap(), b"swagger: '2.0'\n");
    assert_eq!(all, downloads.join("billing-service.yaml.zip"));
    assert_eq!(std::fs::read(&all).unwrap(), ZIP_BYTES);
}

#[test]
fn given_no_attachment_name_when_downloading_all_then_uses_fallback_name() {
    let fx = Fixture::new();
    let container = fx.container();
    let mut browser = container.schema_browser().unwrap();
    browser.restore().unwrap();
    browser.change_format(1).unwrap();

    let all = browser.download_all().unwrap();

    assert_eq!(all, fx.temp.path().join("downloads").join("schemas.html.zip"));
}

#[test]
fn given_schema_name_with_separators_when_downloading_then_stays_in_download_dir() {
    let fx = Fixture::new();
    let container = fx.container();
    let browser = container.schema_browser().unwrap();
    let downloads = fx.temp.path().join("downloads");

    let escaped = browser.download("../escape").unwrap();
    let nested = browser.download("a b/c").unwrap();

    assert_eq!(escaped, downloads.join(".._escape.yaml"));
    assert_eq!(nested, downloads.join("a b_c.yaml"));
    assert!(escaped.is_file() && nested.is_file());
    assert!(!fx.temp.path().join("escape.yaml").exists());
    assert!(!downloads.join("a b").exists());
}

#[test]
fn given_unknown_schema_when_downloading_then_fetch_error() {
    let fx = Fixture::new();
    let container = fx.container();
    let browser = container.schema_browser().unwrap();

    let result = browser.download("ghost");

    assert!(matches!(result, Err(ApplicationError::Fetch { .. })));
    assert!(!fx.temp.path().join("downloads").join("ghost.yaml").exists());
}

#[test]
fn given_unreachable_server_when_listing_then_fetch_error() {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        server_url: "http://127.0.0.1:1/inspector".into(),
        state_dir: temp.path().to_path_buf(),
        timeout_secs: 2,
        ..Settings::default()
    };
    let container = ServiceContainer::new(settings).unwrap();
    let browser = container.schema_browser().unwrap();

    let result = browser.fetch_schema_ids();

    assert!(matches!(
        result,
        Err(ApplicationError::Fetch { ref url, .. }) if url == "http://127.0.0.1:1/inspector/schemas"
    ));
}
