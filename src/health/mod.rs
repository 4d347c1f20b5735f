//! Backend health checking.
//!
//! # Data Flow
//! ```text
//! caller (/health endpoint, `check-backend` command)
//!     → probe.rs: GET {base_url}{health_path}
//!     → Ok(()) on 200, HealthError otherwise
//! ```
//!
//! # Design Decisions
//! - Single-shot and stateless; the caller decides cadence
//! - Only 200 counts as healthy
//! - Shares the proxy's pooled client

pub mod probe;

pub use probe::{check_backend, HealthError};
