use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use super::AppState;

const DEFAULT_PREFIX: &str = "lakeshore335";

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema, utoipa::IntoParams))]
pub struct TailParams {
    pub lines: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LevelBody {
    pub level: String,
}

fn not_available() -> Response {
    (StatusCode::NOT_FOUND, "Log file not available").into_response()
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/tail", params(TailParams), responses((status = 200), (status = 404))))]
pub async fn logs_tail(
    State(state): State<AppState>,
    Query(params): Query<TailParams>,
) -> impl IntoResponse {
    let configured_path = state.logging.file.clone();
    let max_lines = params.lines.unwrap_or(200).min(10_000);

    let Some(path) = resolve_log_file_path(&configured_path).await else {
        return not_available();
    };
    match fs::read_to_string(&path).await {
        Ok(contents) => {
            let mut lines: Vec<&str> = contents.lines().collect();
            if lines.len() > max_lines {
                lines = lines.split_off(lines.len() - max_lines);
            }
            let mut resp = Response::new(lines.join("\n").into());
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            resp
        }
        Err(_) => not_available(),
    }
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/stream", responses((status = 200))))]
pub async fn logs_stream() -> impl IntoResponse {
    let rx = crate::logging::subscribe_log_lines();
    let stream = BroadcastStream::new(rx).filter_map(|res| match res {
        Ok(line) if crate::logging::should_emit_to_web(&line) => {
            Some(Ok::<Event, std::convert::Infallible>(
                Event::default().event("log").data(line),
            ))
        }
        _ => None,
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg_attr(feature = "openapi", utoipa::path(get, path = "/api/logs/level", responses((status = 200))))]
pub async fn get_log_level() -> impl IntoResponse {
    let lvl = crate::logging::get_web_log_level();
    Json(serde_json::json!({"level": lvl.to_string()}))
}

#[cfg_attr(feature = "openapi", utoipa::path(put, path = "/api/logs/level", request_body = LevelBody, responses((status = 200), (status = 400))))]
pub async fn put_log_level(Json(body): Json<LevelBody>) -> Response {
    match crate::logging::set_web_log_level_str(&body.level) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": true, "level": body.level})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

fn name_matches(file_name: &str, prefix: &str, suffix: &str) -> bool {
    if file_name == format!("{}.{}", prefix, suffix) {
        return true;
    }
    file_name.starts_with(&format!("{}.", prefix)) && file_name.ends_with(&format!(".{}", suffix))
}

/// Directory, file prefix and suffix the rolling appender writes to
fn rotation_pattern(configured: &Path) -> (PathBuf, String, String) {
    if configured.extension().is_some() {
        let dir = configured.parent().unwrap_or_else(|| Path::new("."));
        let stem = configured
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_PREFIX)
            .to_string();
        let ext = configured
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("log")
            .to_string();
        (dir.to_path_buf(), stem, ext)
    } else {
        (
            configured.to_path_buf(),
            DEFAULT_PREFIX.to_string(),
            "log".to_string(),
        )
    }
}

async fn find_latest_matching(dir: &Path, prefix: &str, suffix: &str) -> Option<PathBuf> {
    let mut best: Option<(SystemTime, PathBuf)> = None;
    let mut rd = fs::read_dir(dir).await.ok()?;
    while let Ok(Some(entry)) = rd.next_entry().await {
        if let Some(name) = entry.file_name().to_str()
            && name_matches(name, prefix, suffix)
            && let Ok(md) = entry.metadata().await
            && md.is_file()
            && let Ok(modified) = md.modified()
            && best.as_ref().is_none_or(|(t, _)| modified > *t)
        {
            best = Some((modified, entry.path()));
        }
    }
    best.map(|(_, p)| p)
}

// The daily appender writes `<prefix>.<date>.<suffix>`, so the configured path
// itself rarely exists. Prefer it when it does, else pick the newest rotation.
async fn resolve_log_file_path(configured_path: &str) -> Option<PathBuf> {
    let configured = Path::new(configured_path);
    if let Ok(md) = fs::metadata(configured).await
        && md.is_file()
    {
        return Some(configured.to_path_buf());
    }
    let (dir, prefix, suffix) = rotation_pattern(configured);
    find_latest_matching(&dir, &prefix, &suffix).await
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/logs/tail", get(logs_tail))
        .route("/api/logs/stream", get(logs_stream))
        .route("/api/logs/level", get(get_log_level).put(put_log_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_names_match_prefix_and_suffix() {
        assert!(name_matches("lakeshore335.log", "lakeshore335", "log"));
        assert!(name_matches("lakeshore335.2026-10-19.log", "lakeshore335", "log"));
        assert!(!name_matches("other.2026-10-19.log", "lakeshore335", "log"));
    }

    #[test]
    fn rotation_pattern_from_file_path() {
        let (dir, prefix, suffix) = rotation_pattern(Path::new("/tmp/lakeshore335.log"));
        assert_eq!(dir, PathBuf::from("/tmp"));
        assert_eq!(prefix, "lakeshore335");
        assert_eq!(suffix, "log");
    }

    #[tokio::test]
    async fn newest_rotation_is_picked() {
        let dir = tempfile::tempdir().unwrap();
        let older = dir.path().join("lakeshore335.2026-10-18.log");
        let newer = dir.path().join("lakeshore335.2026-10-19.log");
        std::fs::write(&older, "old").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        std::fs::write(&newer, "new").unwrap();

        let configured = dir.path().join("lakeshore335.log");
        let found = resolve_log_file_path(configured.to_str().unwrap()).await;
        assert_eq!(found, Some(newer));
    }
}
