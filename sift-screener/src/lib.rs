//! Sift Screener Library
//!
//! Natural-language stock screening for the Sift research dashboard: turns
//! a free-text query such as "Find stocks with P/E ratio less than 18 and
//! dividend yield greater than 2%" into a typed predicate set, executes it
//! against the dataset snapshot, and restates what was understood.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   sift-screener (Rust Service)                  │
//! │                            :5000                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  query ──▶ Extractor ──▶ Builder ──▶ Executor ──▶ Describer     │
//! │               │             │            │                      │
//! │           Comparators    Lexicon     Dataset snapshot           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per-clause failures degrade gracefully: the query screens on whatever
//! criteria were understood, and only a total failure to extract anything
//! surfaces as an error.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod data;
pub mod describe;
pub mod engine;
pub mod extract;
pub mod lexicon;
pub mod predicate;
pub mod routes;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use sift_common::config::Config;

use crate::data::{CsvDataset, DatasetProvider};
use crate::engine::ScreenerEngine;

/// Screening service state
pub struct ScreenerState {
    /// Configuration
    pub config: Config,
    /// Screening engine
    pub engine: ScreenerEngine,
}

impl ScreenerState {
    /// Create state over an already-constructed dataset provider.
    pub fn with_provider(config: Config, provider: Arc<dyn DatasetProvider>) -> Self {
        let engine = ScreenerEngine::new(provider).with_max_results(config.screener.max_results);
        Self { config, engine }
    }
}

/// Main screening service
pub struct ScreenerService {
    state: Arc<ScreenerState>,
}

impl ScreenerService {
    /// Create the service, loading the dataset snapshot from the
    /// configured CSV path.
    pub async fn new(config: Config) -> Result<Self> {
        let dataset = CsvDataset::load(&config.screener.dataset_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to load dataset from {}",
                    config.screener.dataset_path
                )
            })?;

        Ok(Self::with_provider(config, Arc::new(dataset)))
    }

    /// Create the service over a custom dataset provider.
    pub fn with_provider(config: Config, provider: Arc<dyn DatasetProvider>) -> Self {
        let state = Arc::new(ScreenerState::with_provider(config, provider));
        Self { state }
    }

    /// Build the HTTP router.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(routes::index))
            .route("/health", get(routes::health))
            .route("/screen", get(routes::screen))
            .route("/api/v1/fields", get(routes::list_fields))
            // The dashboard frontend is served from another origin
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Start the HTTP server.
    pub async fn start(self) -> Result<()> {
        let host = self.state.config.screener.host.clone();
        let port = self.state.config.screener.port;

        let app = self.router();

        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", host, port))?;
        tracing::info!(address = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
