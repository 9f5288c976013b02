use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use nonzero_ext::nonzero;
use std::{num::NonZeroU32, time::Duration};

// The portal is a single ASP.NET server behind a student login; stay well
// under anything that looks like a crawl.
const REQ_PER_SEC: NonZeroU32 = nonzero!(2u32);
const MIN_REQUEST_SPACING: Duration = Duration::from_millis(500);

type SpecificGovernorRateLimiter =
    GovernorRateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

pub struct RateLimiter {
    req_per_sec: SpecificGovernorRateLimiter,
    request_spacing: SpecificGovernorRateLimiter,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_spacing(MIN_REQUEST_SPACING)
    }

    pub fn with_spacing(spacing: Duration) -> Self {
        // Limit to X total req/sec on average.
        let req_per_sec = GovernorRateLimiter::direct(Quota::per_second(REQ_PER_SEC));

        // No two requests closer than `spacing`. A zero spacing falls back to the per-second quota.
        let spacing_quota =
            Quota::with_period(spacing).unwrap_or_else(|| Quota::per_second(REQ_PER_SEC));
        let request_spacing = GovernorRateLimiter::direct(spacing_quota);

        RateLimiter {
            req_per_sec,
            request_spacing,
        }
    }

    pub async fn wait_until_ready(&self) {
        // Per-second budget first, then the spacing check, which only lets
        // one caller through per period.
        self.req_per_sec.until_ready().await;
        self.request_spacing.until_ready().await;
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
