//! Interactive dashboard loop.
//!
//! A single `select!` drives everything: the refresh ticker, stdin commands,
//! and an mpsc channel carrying completed fetch outcomes. Network calls run
//! in spawned tasks so the loop never blocks; superseded fetches are not
//! cancelled and whichever outcome arrives last wins the redraw.

use anyhow::Result;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::interval_at;

use riskdash::api::{self, Backend};
use riskdash::config::Config;
use riskdash::download;
use riskdash::history::{BackendHealth, ClearReceipt, HistoryPage};
use riskdash::logging::{log, obj, v_str, Domain, Level};
use riskdash::session::Dashboard;

enum Outcome {
    History(Result<HistoryPage>),
    Detail { id: String, page: Result<HistoryPage> },
    Saved { name: String, result: Result<PathBuf> },
    Cleared(Result<ClearReceipt>),
    Health(Result<BackendHealth>),
}

enum Command {
    Refresh,
    View(String),
    Download(Option<String>),
    DownloadAll,
    Clear,
    CloseDetail,
    Status,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "r" | "refresh" => Some(Command::Refresh),
        "v" | "view" => parts.next().map(|id| Command::View(id.to_string())),
        "d" | "download" => Some(Command::Download(parts.next().map(|id| id.to_string()))),
        "D" | "download-all" => Some(Command::DownloadAll),
        "c" | "clear" => Some(Command::Clear),
        "x" | "close" => Some(Command::CloseDetail),
        "s" | "status" => Some(Command::Status),
        "q" | "quit" => Some(Command::Quit),
        _ => None,
    }
}

fn spawn_history(backend: Arc<dyn Backend>, tx: mpsc::Sender<Outcome>) {
    tokio::spawn(async move {
        let page = backend.fetch_history().await;
        let _ = tx.send(Outcome::History(page)).await;
    });
}

fn spawn_detail(backend: Arc<dyn Backend>, tx: mpsc::Sender<Outcome>, id: String) {
    tokio::spawn(async move {
        // The viewer re-fetches the full collection and searches it.
        let page = backend.fetch_history().await;
        let _ = tx.send(Outcome::Detail { id, page }).await;
    });
}

fn spawn_download(
    backend: Arc<dyn Backend>,
    tx: mpsc::Sender<Outcome>,
    dir: PathBuf,
    id: Option<String>,
) {
    tokio::spawn(async move {
        let (name, bytes) = match &id {
            Some(id) => (
                download::prediction_filename(id),
                backend.download_prediction(id).await,
            ),
            None => (
                download::export_filename(chrono::Utc::now()),
                backend.download_all().await,
            ),
        };
        let result = bytes.and_then(|b| download::save(&dir, &name, &b));
        let _ = tx.send(Outcome::Saved { name, result }).await;
    });
}

fn spawn_clear(backend: Arc<dyn Backend>, tx: mpsc::Sender<Outcome>) {
    tokio::spawn(async move {
        let receipt = backend.clear_history().await;
        let _ = tx.send(Outcome::Cleared(receipt)).await;
    });
}

fn spawn_health(backend: Arc<dyn Backend>, tx: mpsc::Sender<Outcome>) {
    tokio::spawn(async move {
        let health = backend.health().await;
        let _ = tx.send(Outcome::Health(health)).await;
    });
}

fn apply(dash: &mut Dashboard, outcome: Outcome, backend: &Arc<dyn Backend>, tx: &mpsc::Sender<Outcome>) {
    match outcome {
        Outcome::History(Ok(page)) => dash.apply_history(page),
        Outcome::History(Err(err)) => dash.history_unreachable(&err),
        Outcome::Detail { id, page: Ok(page) } => dash.apply_detail(&id, page),
        Outcome::Detail { id, page: Err(err) } => {
            log(
                Level::Error,
                Domain::Api,
                "detail_fetch_failed",
                obj(&[("id", v_str(&id)), ("error", v_str(&format!("{:#}", err)))]),
            );
            dash.notices.error("Failed to load batch details");
        }
        Outcome::Saved { name: _, result: Ok(path) } => {
            dash.notices.success(format!("Saved {}", path.display()));
        }
        Outcome::Saved { name, result: Err(err) } => {
            log(
                Level::Error,
                Domain::Download,
                "download_failed",
                obj(&[("name", v_str(&name)), ("error", v_str(&format!("{:#}", err)))]),
            );
            dash.notices.error("Failed to download predictions");
        }
        Outcome::Cleared(Ok(receipt)) => {
            if receipt.success {
                dash.notices
                    .success(receipt.message.unwrap_or_else(|| "History cleared".to_string()));
                // Reload immediately; the next page is expected to be empty.
                spawn_history(backend.clone(), tx.clone());
            } else {
                let why = receipt.error.unwrap_or_else(|| "unknown error".to_string());
                dash.notices.error(format!("Failed to clear history: {}", why));
            }
        }
        Outcome::Cleared(Err(err)) => {
            log(
                Level::Error,
                Domain::Api,
                "clear_failed",
                obj(&[("error", v_str(&format!("{:#}", err)))]),
            );
            dash.notices.error("Failed to clear history");
        }
        Outcome::Health(health) => dash.set_health(health.ok()),
    }
}

fn redraw(dash: &Dashboard) {
    print!("\x1b[2J\x1b[H{}", dash.render());
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let backend = api::build(&cfg);
    let download_dir = PathBuf::from(&cfg.download_dir);
    let mut dash = Dashboard::new();
    let (tx, mut rx) = mpsc::channel::<Outcome>(64);

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[("base", v_str(&cfg.base_url))]),
    );

    spawn_history(backend.clone(), tx.clone());
    spawn_health(backend.clone(), tx.clone());

    let period = Duration::from_secs(cfg.refresh_secs.max(1));
    let mut refresh = interval_at(tokio::time::Instant::now() + period, period);
    let mut ui_tick = tokio::time::interval(Duration::from_secs(1));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut awaiting_confirm = false;

    redraw(&dash);
    loop {
        tokio::select! {
            _ = refresh.tick() => {
                // No de-duplication: a slow response races the next tick and
                // the last one to resolve wins the render.
                spawn_history(backend.clone(), tx.clone());
            }
            _ = ui_tick.tick() => {
                if dash.notices.prune(Instant::now()) && !awaiting_confirm {
                    redraw(&dash);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if awaiting_confirm {
                    awaiting_confirm = false;
                    if matches!(line.trim(), "y" | "Y" | "yes") {
                        spawn_clear(backend.clone(), tx.clone());
                    } else {
                        redraw(&dash);
                    }
                    continue;
                }
                if line.trim().is_empty() {
                    // Enter dismisses any notices still on screen.
                    dash.notices.dismiss_all();
                    redraw(&dash);
                    continue;
                }
                match parse_command(&line) {
                    Some(Command::Refresh) => spawn_history(backend.clone(), tx.clone()),
                    Some(Command::View(id)) => {
                        dash.request_detail(&id);
                        spawn_detail(backend.clone(), tx.clone(), id);
                    }
                    Some(Command::Download(Some(id))) => {
                        spawn_download(backend.clone(), tx.clone(), download_dir.clone(), Some(id));
                    }
                    Some(Command::Download(None)) => {
                        // Bare `d` downloads the batch whose detail view is open.
                        if let Some(id) = dash.open_detail_id().map(|s| s.to_string()) {
                            spawn_download(backend.clone(), tx.clone(), download_dir.clone(), Some(id));
                        }
                    }
                    Some(Command::DownloadAll) => {
                        spawn_download(backend.clone(), tx.clone(), download_dir.clone(), None);
                    }
                    Some(Command::Clear) => {
                        awaiting_confirm = true;
                        print!("Clear all prediction history? This cannot be undone. [y/N] ");
                        std::io::stdout().flush()?;
                    }
                    Some(Command::CloseDetail) => {
                        dash.close_detail();
                        redraw(&dash);
                    }
                    Some(Command::Status) => spawn_health(backend.clone(), tx.clone()),
                    Some(Command::Quit) => break,
                    None => redraw(&dash),
                }
            }
            Some(outcome) = rx.recv() => {
                apply(&mut dash, outcome, &backend, &tx);
                dash.notices.prune(Instant::now());
                // Hold redraws while the confirm prompt is on screen.
                if !awaiting_confirm {
                    redraw(&dash);
                }
            }
        }
    }

    log(Level::Info, Domain::System, "shutdown", obj(&[]));
    Ok(())
}
