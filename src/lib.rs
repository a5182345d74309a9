//! meshstat - snapshot and metrics library for overlay network state.
//!
//! Provides:
//! - `nameserver` — DNS entry store and its lock-scoped snapshot builder
//! - `provider` — router and allocator interfaces, fixed state files
//! - `status` — aggregation into a single status record
//! - `metrics` — flow tagging, metric derivation, Prometheus export
//! - `bridge` — processes owning the interfaces attached to a bridge
//! - `procfs` — `/proc` and `/sys` access with a mockable filesystem
//! - `model` — snapshot record types

pub mod bridge;
pub mod metrics;
pub mod model;
pub mod nameserver;
pub mod procfs;
pub mod provider;
pub mod status;
