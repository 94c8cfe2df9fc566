//! Per-client rate limiting using the token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// One request is replenished per client every interval (10 per second).
const REPLENISH_INTERVAL_MS: u64 = 100;
/// Requests a client may send back to back before being throttled.
pub const BURST_SIZE: u32 = 200;

/// Rate limiter keyed by the socket peer address.
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Requires the
/// server to be started with `into_make_service_with_connect_info`.
pub fn layer() -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>
{
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(REPLENISH_INTERVAL_MS)
            .burst_size(BURST_SIZE)
            .finish()
            .expect("rate limit constants are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Rate limiter keyed by `X-Forwarded-For` / `X-Real-IP` / `Forwarded`,
/// falling back to the peer address.
///
/// Only for deployments behind a trusted reverse proxy: clients can set
/// these headers themselves.
pub fn proxied_layer()
-> GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(REPLENISH_INTERVAL_MS)
            .burst_size(BURST_SIZE)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("rate limit constants are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}
