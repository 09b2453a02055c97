use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Local, NaiveDate, TimeZone, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::types::AuthorizationSession;

/// Public web prefix every subscribable show URL starts with.
pub const SHOW_URL_PREFIX: &str = "https://open.spotify.com/show/";

const VERIFIER_ENTROPY_BYTES: usize = 64;
const STATE_ENTROPY_BYTES: usize = 16;

fn random_urlsafe(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

pub fn generate_code_verifier() -> String {
    random_urlsafe(VERIFIER_ENTROPY_BYTES)
}

pub fn generate_state() -> String {
    random_urlsafe(STATE_ENTROPY_BYTES)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

impl AuthorizationSession {
    /// Starts a new authorization attempt with a fresh verifier and state.
    pub fn generate() -> Self {
        Self {
            code_verifier: generate_code_verifier(),
            state: generate_state(),
        }
    }

    pub fn code_challenge(&self) -> String {
        generate_code_challenge(&self.code_verifier)
    }
}

/// Extracts the show id from a public show URL.
///
/// Returns `None` for anything that is not a show reference: a different
/// prefix, or nothing left once slashes are removed.
pub fn extract_show_id(url: &str) -> Option<String> {
    let rest = url.strip_prefix(SHOW_URL_PREFIX)?;
    let show_id: String = rest.chars().filter(|c| *c != '/').collect();

    if show_id.is_empty() {
        return None;
    }

    Some(show_id)
}

pub fn show_url(show_id: &str) -> String {
    format!("{SHOW_URL_PREFIX}{show_id}")
}

pub fn now_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Parses an upstream release date into a calendar day.
///
/// Day precision is `YYYY-MM-DD`. Coarser precisions (`YYYY-MM`, `YYYY`)
/// resolve to the first day of the period.
pub fn parse_release_date(release_date: &str) -> Option<NaiveDate> {
    let mut parts = release_date.trim().splitn(3, '-');

    let year = parts.next()?.parse::<i32>().ok()?;
    let month = match parts.next() {
        Some(m) => m.parse::<u32>().ok()?,
        None => 1,
    };
    let day = match parts.next() {
        Some(d) => d.parse::<u32>().ok()?,
        None => 1,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Unix seconds of local midnight on `date`.
///
/// When midnight does not exist locally (a DST gap), the first valid
/// instant of that day is used.
pub fn local_midnight_timestamp(date: NaiveDate) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;

    match Local.from_local_datetime(&midnight).earliest() {
        Some(dt) => Some(dt.timestamp()),
        None => (1..=3)
            .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
            .find_map(|dt| Local.from_local_datetime(&dt).earliest())
            .map(|dt| dt.timestamp()),
    }
}
