//! HTTP API gateway for the storage-network bridge.
//!
//! Serves the health check, the referral batch endpoint and per-user
//! account documents over axum.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod accounts;
pub mod config;
pub mod error;
pub mod health;
pub mod referrals;
pub mod routes;
