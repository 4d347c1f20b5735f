//! Hop-by-hop header filtering.
//!
//! These headers describe a single transport connection and must not be
//! relayed in either direction.

use axum::http::header::{self, HeaderMap, HeaderName};

/// Connection-scoped headers excluded from proxying.
pub const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// `Trailers` is the historical spelling some clients still send.
const TRAILERS: &str = "trailers";

/// Case-insensitive membership test (header names are normalized to lower case).
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name) || name.as_str() == TRAILERS
}

/// Append every end-to-end header from `src` onto `dst`, keeping repeated values.
pub fn copy_headers(src: &HeaderMap, dst: &mut HeaderMap) {
    for (name, value) in src {
        if !is_hop_by_hop(name) {
            dst.append(name.clone(), value.clone());
        }
    }
}
