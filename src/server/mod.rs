//! HTTP server for the archive, with optional live reload

use anyhow::Result;
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::{Html, IntoResponse, Redirect},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::controller::LetterController;
use crate::error::ArchiveError;
use crate::helpers::{letters_url, url_for};
use crate::templates::PageRenderer;
use crate::Letterbox;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Shared, read-only server state
pub struct AppState {
    controller: LetterController,
    renderer: PageRenderer,
    letters_url: String,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl AppState {
    pub fn new(app: &Letterbox, live_reload: bool) -> crate::Result<Self> {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Ok(Self {
            controller: app.controller(),
            renderer: app.renderer()?,
            letters_url: letters_url(&app.config),
            reload_tx,
            live_reload,
        })
    }

    /// Sender that tells connected browsers to reload
    pub fn reload_sender(&self) -> broadcast::Sender<()> {
        self.reload_tx.clone()
    }

    fn page(&self, html: String) -> Html<String> {
        if self.live_reload {
            Html(inject_live_reload(&html))
        } else {
            Html(html)
        }
    }
}

/// Build the router for an archive
pub fn router(app: &Letterbox, state: Arc<AppState>) -> Router {
    let letters = letters_url(&app.config);
    let home = url_for(&app.config, "");

    let mut router = Router::new()
        .route(&letters, get(index_handler))
        .route(&format!("{}/", letters), get(index_handler))
        .route(&format!("{}/:slug", letters), get(letter_handler))
        .route(&home, get(home_handler))
        .nest_service(
            &url_for(&app.config, "assets"),
            ServeDir::new(&app.assets_dir),
        );

    // "/news/" also answers on "/news"
    let bare_home = home.trim_end_matches('/');
    if !bare_home.is_empty() {
        router = router.route(bare_home, get(home_handler));
    }

    if state.live_reload {
        router = router.route("/__livereload", get(livereload_handler));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Start the server
pub async fn start(app: &Letterbox, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let state = Arc::new(AppState::new(app, watch)?);
    let reload_tx = state.reload_sender();
    let router = router(app, state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, letters_url(&app.config));
    println!("Serving letters at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let watched = vec![
            app.letters_dir.clone(),
            app.assets_dir.clone(),
            app.config_path(),
        ];
        let config_path = app.config_path();

        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(watched, config_path, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}

/// Watch letters, assets and config; tell browsers to reload on change
///
/// Pages are rendered per request, so nothing needs rebuilding here.
fn watch_and_reload(
    paths: Vec<PathBuf>,
    config_path: PathBuf,
    reload_tx: broadcast::Sender<()>,
) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Debounce to avoid multiple rapid reloads
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

    for path in &paths {
        if !path.exists() {
            continue;
        }
        let mode = if path.is_dir() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        debouncer.watcher().watch(path, mode)?;
        tracing::debug!("Watching: {:?}", path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                // Editor swap files and the like
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                            && !path_str.ends_with(".swp")
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                    if event.path == config_path {
                        tracing::warn!("Configuration changed; restart the server to apply it");
                    }
                }

                // No subscribers is fine
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::to(&state.letters_url)
}

/// Archive index
async fn index_handler(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Html<String>, ArchiveError> {
    let controller = state.controller.clone();
    let summaries = tokio::task::spawn_blocking(move || controller.summaries()).await??;
    let html = state.renderer.render_index(&summaries)?;
    Ok(state.page(html))
}

/// One letter; unknown slugs become a 404
async fn letter_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> std::result::Result<Html<String>, ArchiveError> {
    let controller = state.controller.clone();
    let model = tokio::task::spawn_blocking(move || controller.resolve(&slug)).await??;
    let html = state.renderer.render_letter(&model)?;
    Ok(state.page(html))
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_live_reload() {
        let html = "<html><body><p>x</p></body></html>";
        let injected = inject_live_reload(html);
        assert!(injected.contains("/__livereload"));
        assert!(injected.ends_with("</body>\n</html>"));
        assert_eq!(injected.matches("</body>").count(), 1);
    }

    #[test]
    fn test_inject_without_body_tag() {
        let injected = inject_live_reload("<p>fragment</p>");
        assert!(injected.starts_with("<p>fragment</p>"));
        assert!(injected.contains("<script>"));
    }
}
