//! Shared infrastructure for service-level integration tests.
//!
//! These tests run against a real PostgreSQL started through
//! testcontainers, one isolated database per test. They are marked
//! `#[ignore]` so the default run stays Docker-free; run them with
//! `cargo test -- --ignored` on a machine with a Docker daemon.
#![allow(clippy::expect_used)]

mod context;
mod db;

pub(crate) use context::TestContext;
