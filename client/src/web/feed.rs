use std::cell::Cell;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use landgrid_shared::{LandEvent, LandRecord};

use crate::source::{LandDataSource, LandStore};

pub const LANDS_URL: &str = "/api/lands";

const POLL_INTERVAL_MS: u32 = 15_000;
const RETRY_BASE_MS: u32 = 500;
const RETRY_MAX_MS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Connecting,
    Live,
    Reconnecting,
}

thread_local! {
    static POLL_GENERATION: Cell<u64> = const { Cell::new(0) };
}

fn is_current(generation: u64) -> bool {
    POLL_GENERATION.with(|g| g.get() == generation)
}

/// Stop any running poll loop. The loop notices on its next wakeup.
pub fn disconnect() {
    POLL_GENERATION.with(|g| g.set(g.get().wrapping_add(1)));
}

fn retry_backoff_ms(consecutive_failures: u32) -> u32 {
    let exponent = consecutive_failures.saturating_sub(1).min(6);
    RETRY_BASE_MS.saturating_mul(1 << exponent).min(RETRY_MAX_MS)
}

async fn fetch_event(url: &str) -> Result<LandEvent, String> {
    let resp = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;
    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }
    resp.json::<LandEvent>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

/// Poll the land endpoint and keep `lands` current until [`disconnect`].
pub fn connect(lands: RwSignal<Vec<LandRecord>>, status: RwSignal<FeedStatus>) {
    let generation = POLL_GENERATION.with(|g| {
        let next = g.get().wrapping_add(1);
        g.set(next);
        next
    });
    status.set(FeedStatus::Connecting);

    spawn_local(async move {
        // The store drops stale updates.
        let store = LandStore::default();
        let mut failures = 0u32;
        loop {
            let result = fetch_event(LANDS_URL).await;
            if !is_current(generation) {
                return;
            }
            match result {
                Ok(event) => {
                    failures = 0;
                    status.set(FeedStatus::Live);
                    if store.apply(&event) {
                        let next = store.snapshot();
                        if lands.with_untracked(|current| current[..] != next[..]) {
                            lands.set(next.to_vec());
                        }
                    }
                }
                Err(e) => {
                    failures = failures.saturating_add(1);
                    status.set(FeedStatus::Reconnecting);
                    web_sys::console::warn_1(
                        &format!("land feed: {e} (attempt {failures})").into(),
                    );
                }
            }
            let delay = if failures == 0 {
                POLL_INTERVAL_MS
            } else {
                retry_backoff_ms(failures)
            };
            TimeoutFuture::new(delay).await;
            if !is_current(generation) {
                return;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        assert_eq!(retry_backoff_ms(1), 500);
        assert_eq!(retry_backoff_ms(2), 1_000);
        assert_eq!(retry_backoff_ms(4), 4_000);
        assert_eq!(retry_backoff_ms(30), RETRY_MAX_MS);
    }

    #[test]
    fn disconnect_retires_the_running_generation() {
        let generation = POLL_GENERATION.with(|g| g.get());
        assert!(is_current(generation));
        disconnect();
        assert!(!is_current(generation));
    }
}
