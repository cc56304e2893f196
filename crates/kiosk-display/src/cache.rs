//! Cache-busting suffixes.
//!
//! The page reloads a media element only when its URL changes, so every
//! rewrite carries a token that differs from the previous one even when the
//! underlying file has not changed.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Query parameter used for iframes whose URL already carries a query string.
pub const CACHE_PARAM: &str = "cachekiller";

/// Issues strictly increasing millisecond tokens.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicU64,
}

impl CacheBuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current epoch millis, or one past the previous token if the clock has not moved.
    pub fn next_token(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    /// `base?token`, for generated resources with a fixed path.
    pub fn bust(&self, base: &str) -> String {
        format!("{}?{}", base, self.next_token())
    }

    /// Replace whatever query `current` has with a fresh token.
    pub fn rebust(&self, current: &str) -> String {
        let base = current.split('?').next().unwrap_or(current);
        self.bust(base)
    }

    /// Keep `current`'s query string and append a fresh `cachekiller` parameter,
    /// replacing one left by an earlier rewrite.
    pub fn append_param(&self, current: &str) -> String {
        let (base, query) = match current.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (current, None),
        };
        let prefix = format!("{CACHE_PARAM}=");
        let kept: Vec<&str> = query
            .map(|q| {
                q.split('&')
                    .filter(|p| !p.is_empty() && !p.starts_with(&prefix))
                    .collect()
            })
            .unwrap_or_default();
        let token = format!("{}{}", prefix, self.next_token());
        if kept.is_empty() {
            format!("{base}?{token}")
        } else {
            format!("{base}?{}&{token}", kept.join("&"))
        }
    }
}
