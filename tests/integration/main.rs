//! Integration tests for offcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn offcache() -> Command {
        cargo_bin_cmd!("offcache")
    }

    /// Config pointing at an unreachable origin with a store inside `dir`
    fn isolated_config(dir: &Path) -> PathBuf {
        let path = dir.join("config.toml");
        let content = format!(
            "[origin]\nbase_url = \"http://127.0.0.1:9/\"\ntimeout_secs = 2\n\n[storage]\ndir = \"{}\"\n",
            dir.join("store").display()
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        offcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("offline cache manager"));
    }

    #[test]
    fn version_displays() {
        offcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("offcache"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(temp.path());
        offcache()
            .arg("--config")
            .arg(&config)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(temp.path());
        offcache()
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("xenon"));
    }

    #[test]
    fn config_set_then_show() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(temp.path());
        offcache()
            .arg("--config")
            .arg(&config)
            .args(["config", "set", "cache.version", "2.0.0"])
            .assert()
            .success();
        offcache()
            .arg("--config")
            .arg(&config)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("version = \"2.0.0\""));
    }

    #[test]
    fn config_rejects_bad_version() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        std::fs::write(&config, "[cache]\nversion = \"1 0\"\n").unwrap();
        offcache()
            .arg("--config")
            .arg(&config)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn status_without_registration() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(temp.path());
        offcache()
            .arg("--config")
            .arg(&config)
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("unregistered"));
    }

    #[test]
    fn namespaces_empty_store() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(temp.path());
        offcache()
            .arg("--config")
            .arg(&config)
            .args(["namespaces", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn fetch_without_registration_fails() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(temp.path());
        offcache()
            .arg("--config")
            .arg(&config)
            .args(["fetch", "/index.html"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No worker registered"))
            .stderr(predicate::str::contains("offcache install"));
    }

    #[test]
    fn install_against_unreachable_origin_fails() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(temp.path());
        offcache()
            .arg("--config")
            .arg(&config)
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Install failed"));

        // Nothing registered after a failed install
        assert!(!temp.path().join("store").join("registration.json").exists());
    }

    #[test]
    fn clear_requires_confirmation() {
        let temp = TempDir::new().unwrap();
        let config = isolated_config(temp.path());
        offcache()
            .arg("--config")
            .arg(&config)
            .arg("clear")
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing deleted"));
    }
}

mod site_tests {
    //! End-to-end runs against a local HTTP origin

    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use axum::extract::State;
    use axum::http::{header, StatusCode, Uri};
    use axum::response::IntoResponse;
    use axum::Router;
    use predicates::prelude::*;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use std::thread::{self, JoinHandle};
    use tempfile::TempDir;
    use tokio::sync::Notify;

    const PROJECTS: &str = r#"{"projects": [
        {"id": 1, "title": "Storetic", "category": "web", "thumbnail": "/a.png", "summary": "Shop", "tags": ["rust"]},
        {"id": 2, "title": "GES", "category": "desktop", "thumbnail": "/b.png", "summary": "Tool"}
    ]}"#;
    const POSTS: &str = r#"[
        {"id": "p1", "title": "Older", "date": "2024-01-10", "cover": "/c1.png"},
        {"id": "p2", "title": "Newer", "date": "2024-06-02", "cover": "/c2.png"}
    ]"#;

    type Routes = Arc<HashMap<String, (&'static str, &'static str)>>;

    /// Local origin served by axum on its own runtime thread. Going offline
    /// shuts the server down, so later connections are refused.
    struct Origin {
        port: u16,
        shutdown: Arc<Notify>,
        server: Mutex<Option<JoinHandle<()>>>,
    }

    impl Origin {
        fn start(routes: &[(&str, &'static str, &'static str)]) -> Self {
            let routes: Routes = Arc::new(
                routes
                    .iter()
                    .map(|(path, content_type, body)| (path.to_string(), (*content_type, *body)))
                    .collect(),
            );
            let app = Router::new().fallback(serve_route).with_state(routes);

            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.set_nonblocking(true).unwrap();
            let port = listener.local_addr().unwrap().port();
            let shutdown = Arc::new(Notify::new());

            let signal = shutdown.clone();
            let server = thread::spawn(move || {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(2)
                    .enable_all()
                    .build()
                    .unwrap();
                runtime.block_on(async move {
                    let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                    axum::serve(listener, app)
                        .with_graceful_shutdown(async move { signal.notified().await })
                        .await
                        .unwrap();
                });
            });

            Self {
                port,
                shutdown,
                server: Mutex::new(Some(server)),
            }
        }

        fn base_url(&self) -> String {
            format!("http://127.0.0.1:{}/", self.port)
        }

        /// Stop serving and wait until the listener is closed
        fn go_offline(&self) {
            self.shutdown.notify_one();
            if let Some(server) = self.server.lock().unwrap().take() {
                server.join().unwrap();
            }
        }
    }

    async fn serve_route(State(routes): State<Routes>, uri: Uri) -> impl IntoResponse {
        match routes.get(uri.path()) {
            Some((content_type, body)) => (StatusCode::OK, [(header::CONTENT_TYPE, *content_type)], *body),
            None => (StatusCode::NOT_FOUND, [(header::CONTENT_TYPE, "text/plain")], "not found"),
        }
    }

    fn site() -> Origin {
        Origin::start(&[
            ("/", "text/html", "<html>root</html>"),
            ("/index.html", "text/html", "<html>home</html>"),
            ("/css/style.css", "text/css", "body{}"),
            ("/data/projects.json", "application/json", PROJECTS),
            ("/data/blog.json", "application/json", POSTS),
            ("/about/", "text/html", "<html>about</html>"),
        ])
    }

    fn write_config(dir: &Path, origin: &Origin, version: &str) -> PathBuf {
        let path = dir.join("config.toml");
        let content = format!(
            r#"[origin]
base_url = "{}"
allowed_hosts = []
timeout_secs = 5

[cache]
version = "{}"

[manifest]
assets = ["/", "/index.html", "/css/style.css", "/data/projects.json", "/data/blog.json"]

[storage]
dir = "{}"
"#,
            origin.base_url(),
            version,
            dir.join("store").display()
        );
        std::fs::write(&path, content).unwrap();
        path
    }

    fn offcache(config: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("offcache");
        cmd.arg("--config").arg(config);
        cmd
    }

    #[test]
    fn install_activate_and_serve_offline() {
        let temp = TempDir::new().unwrap();
        let origin = site();
        let config = write_config(temp.path(), &origin, "1.0.0");

        offcache(&config)
            .args(["install", "--activate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cached 5 assets"));

        offcache(&config)
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("1.0.0 active"));

        offcache(&config)
            .args(["namespaces", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("xenon-static-v1.0.0"))
            .stdout(predicate::str::contains("xenon-dynamic-v1.0.0"));

        // Runtime fetch lands in the dynamic namespace
        offcache(&config)
            .args(["fetch", "/about/", "--print"])
            .assert()
            .success()
            .stdout(predicate::str::contains("<html>about</html>"))
            .stdout(predicate::str::contains("network"));

        origin.go_offline();

        offcache(&config)
            .args(["fetch", "/index.html", "--print"])
            .assert()
            .success()
            .stdout(predicate::str::contains("<html>home</html>"))
            .stdout(predicate::str::contains("cache"));

        offcache(&config)
            .args(["fetch", "/blog/unseen/", "--print"])
            .assert()
            .success()
            .stdout(predicate::str::contains("<html>home</html>"))
            .stdout(predicate::str::contains("offline fallback"));

        offcache(&config)
            .args(["fetch", "/assets/img/unseen.png", "--print"])
            .assert()
            .success()
            .stdout(predicate::str::contains("image/svg+xml"));

        offcache(&config)
            .args(["fetch", "/js/unseen.js"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Network request failed"));
    }

    #[test]
    fn content_reads_cached_documents() {
        let temp = TempDir::new().unwrap();
        let origin = site();
        let config = write_config(temp.path(), &origin, "1.0.0");

        offcache(&config).args(["install", "--activate"]).assert().success();
        origin.go_offline();

        offcache(&config)
            .args(["content", "--category", "web", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Storetic"))
            .stdout(predicate::str::contains("GES").not())
            .stdout(predicate::str::is_match("(?s)Newer.*Older").unwrap());
    }

    #[test]
    fn new_version_evicts_old_caches() {
        let temp = TempDir::new().unwrap();
        let origin = site();
        let config = write_config(temp.path(), &origin, "1.0.0");
        offcache(&config).args(["install", "--activate"]).assert().success();

        let config = write_config(temp.path(), &origin, "1.1.0");
        offcache(&config)
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("offcache activate"));
        offcache(&config)
            .arg("activate")
            .assert()
            .success()
            .stdout(predicate::str::contains("xenon-static-v1.0.0"));

        offcache(&config)
            .args(["namespaces", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("v1.1.0"))
            .stdout(predicate::str::contains("v1.0.0").not());
    }

    #[test]
    fn reinstall_same_version_is_skipped() {
        let temp = TempDir::new().unwrap();
        let origin = site();
        let config = write_config(temp.path(), &origin, "1.0.0");
        offcache(&config).arg("install").assert().success();

        offcache(&config)
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("already installed"));
    }

    #[test]
    fn periodic_sync_refreshes_content() {
        let temp = TempDir::new().unwrap();
        let origin = site();
        let config = write_config(temp.path(), &origin, "1.0.0");
        offcache(&config).args(["install", "--activate"]).assert().success();

        offcache(&config)
            .args(["periodic-sync", "content-update"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Refreshed 2 content documents"));
    }

    #[test]
    fn clear_removes_everything() {
        let temp = TempDir::new().unwrap();
        let origin = site();
        let config = write_config(temp.path(), &origin, "1.0.0");
        offcache(&config).args(["install", "--activate"]).assert().success();

        offcache(&config)
            .args(["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared 2 cache(s)"));
        offcache(&config)
            .args(["status", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("unregistered"));
    }
}
