//! Score service client and leaderboard snapshots
//!
//! Scores are submitted once per run and the top list is re-fetched after
//! every game over. Nothing here is called from inside the frame loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of entries shown
pub const MAX_ENTRIES: usize = 10;
/// Maximum display name length, in characters
pub const MAX_NAME_LEN: usize = 20;
/// Shown when a guest leaves the name blank
pub const ANONYMOUS: &str = "Anonymous";

/// A single leaderboard record as received from the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
    /// Unix timestamp (ms)
    pub submitted_at: i64,
}

/// Ranked snapshot, best first. Replaced wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rank raw records: score descending, earlier submissions first on ties
    pub fn from_records(mut records: Vec<LeaderboardEntry>) -> Self {
        records.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.submitted_at.cmp(&b.submitted_at))
        });
        records.truncate(MAX_ENTRIES);
        Self { entries: records }
    }

    /// Parse a service response body
    pub fn from_json(body: &str) -> Result<Self, ServiceError> {
        let records: Vec<LeaderboardEntry> = serde_json::from_str(body)?;
        Ok(Self::from_records(records))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 1-indexed rank, name, score
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &LeaderboardEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }
}

/// Who a score is submitted as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Signed-in user; the service resolves the display name
    User(String),
    /// Free-text display name
    Guest(String),
}

/// Trim and cap a free-text name, substituting the placeholder when blank
pub fn display_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        ANONYMOUS.to_string()
    } else {
        trimmed.chars().take(MAX_NAME_LEN).collect()
    }
}

/// One finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub score: u64,
    pub identity: Identity,
}

impl Submission {
    pub fn new(score: u64, identity: Identity) -> Self {
        Self { score, identity }
    }

    /// Guest submission from whatever the player typed
    pub fn guest(score: u64, raw_name: &str) -> Self {
        Self::new(score, Identity::Guest(display_name(raw_name)))
    }

    pub fn to_request(&self) -> SubmitRequest {
        match &self.identity {
            Identity::User(id) => SubmitRequest {
                score: self.score,
                user_id: Some(id.clone()),
                name: None,
            },
            Identity::Guest(name) => SubmitRequest {
                score: self.score,
                user_id: None,
                name: Some(display_name(name)),
            },
        }
    }
}

/// Body of a score submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub score: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("service returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
}

/// What the game-over screen shows: the last snapshot that arrived intact
#[derive(Debug, Clone, Default)]
pub struct LeaderboardView {
    snapshot: Leaderboard,
    last_error: Option<String>,
}

impl LeaderboardView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a fetch result. Failures are logged and keep the previous snapshot.
    pub fn apply(&mut self, result: Result<Leaderboard, ServiceError>) {
        match result {
            Ok(board) => {
                log::info!("Leaderboard updated ({} entries)", board.entries.len());
                self.snapshot = board;
                self.last_error = None;
            }
            Err(e) => {
                log::warn!("Leaderboard fetch failed: {}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn snapshot(&self) -> &Leaderboard {
        &self.snapshot
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Format a timestamp relative to `now_ms`
pub fn format_relative(now_ms: i64, timestamp_ms: i64) -> String {
    // Remote timestamps can be any i64
    let diff_mins = now_ms.saturating_sub(timestamp_ms).max(0) / 60_000;
    let diff_hours = diff_mins / 60;
    let diff_days = diff_hours / 24;

    if diff_days >= 7 {
        calendar_date(timestamp_ms)
    } else if diff_days > 1 {
        format!("{} days ago", diff_days)
    } else if diff_days == 1 {
        "Yesterday".to_string()
    } else if diff_hours > 1 {
        format!("{} hours ago", diff_hours)
    } else if diff_hours == 1 {
        "1 hour ago".to_string()
    } else if diff_mins > 1 {
        format!("{} mins ago", diff_mins)
    } else if diff_mins == 1 {
        "1 min ago".to_string()
    } else {
        "Just now".to_string()
    }
}

/// `M/D/YY`
pub fn format_short_date(month: u32, day: u32, year: i32) -> String {
    format!("{}/{}/{:02}", month, day, year.rem_euclid(100))
}

/// Local calendar date for older entries
#[cfg(target_arch = "wasm32")]
fn calendar_date(timestamp_ms: i64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(timestamp_ms as f64));
    if date.get_time().is_nan() {
        return "N/A".to_string();
    }
    format_short_date(
        date.get_month() + 1,
        date.get_date(),
        date.get_full_year() as i32,
    )
}

#[cfg(not(target_arch = "wasm32"))]
fn calendar_date(_timestamp_ms: i64) -> String {
    "N/A".to_string()
}

/// HTTP client for the score service
#[cfg(target_arch = "wasm32")]
pub struct HttpScoreService {
    base_url: String,
}

#[cfg(target_arch = "wasm32")]
impl HttpScoreService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Persist one score
    pub async fn submit(&self, submission: &Submission) -> Result<(), ServiceError> {
        let body = serde_json::to_string(&submission.to_request())?;
        let url = format!("{}/scores", self.base_url);
        crate::web::request_text(&url, "POST", Some(&body)).await?;
        log::info!("Submitted score {}", submission.score);
        Ok(())
    }

    /// Top entries, best first
    pub async fn fetch_top(&self) -> Result<Leaderboard, ServiceError> {
        let url = format!("{}/leaderboard?limit={}", self.base_url, MAX_ENTRIES);
        let body = crate::web::request_text(&url, "GET", None).await?;
        Leaderboard::from_json(&body)
    }
}

#[cfg(target_arch = "wasm32")]
impl From<crate::web::WebError> for ServiceError {
    fn from(e: crate::web::WebError) -> Self {
        match e {
            crate::web::WebError::Status(code) => ServiceError::Status(code),
            other => ServiceError::Request(other.to_string()),
        }
    }
}
