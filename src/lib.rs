// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Mirror: keep a local copy of a cyclist's Strava data
//!
//! This crate incrementally mirrors activities, segments and segment
//! efforts into a local entity store, tracks how complete each record is,
//! and derives gear-ratio and cumulative energy/heart-rate series from raw
//! sensor streams.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{EntityStore, SharedStore};
use services::{FitnessApi, StravaClient, SyncService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
    pub api: Arc<dyn FitnessApi>,
}

impl AppState {
    /// Build state from config: load the store snapshot and create the API client.
    pub fn from_config(config: Config) -> error::Result<Self> {
        let store = EntityStore::load(&config.store_path)?.into_shared();
        let api: Arc<dyn FitnessApi> = Arc::new(StravaClient::new(
            config.api_base_url.clone(),
            config.strava_access_token.clone(),
        ));
        Ok(Self { config, store, api })
    }

    /// A sync service over this state's store and API client.
    pub fn sync_service(&self) -> SyncService {
        SyncService::new(Arc::clone(&self.api), Arc::clone(&self.store))
            .with_detail_concurrency(self.config.detail_fetch_concurrency)
    }

    /// Persist the store if anything changed.
    pub async fn save(&self) -> error::Result<()> {
        let mut store = self.store.lock().await;
        if store.has_pending_changes() {
            store.save(&self.config.store_path)?;
        }
        Ok(())
    }
}
