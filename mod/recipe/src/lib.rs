//! Recipe module — recipe CRUD, engagement (likes/views/comments), the
//! trending-score engine, and cooking-progress tracking.
//!
//! # Resources
//!
//! - **Recipe** — the shared dish, with denormalized engagement counters
//!   and a decaying trending score
//! - **Comment** — user feedback with an optional 1–5 rating
//! - **UserProgress** — per-user cooking state for a recipe
//!
//! Likes and first-views are fact rows with composite unique keys; the
//! counters on the recipe row are recounted from those tables on every
//! interaction, then the trending score is recomputed synchronously.
//!
//! The module implements [`mealhub_core::RecipeCatalog`] (recipe
//! summaries for meal-vote options) and [`mealhub_core::ContributionStats`]
//! (profile counts).

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use mealhub_core::Module;

use crate::service::RecipeService;

/// Recipe module implementing the Module trait.
pub struct RecipeModule {
    service: Arc<RecipeService>,
}

impl RecipeModule {
    pub fn new(service: Arc<RecipeService>) -> Self {
        Self { service }
    }

    /// Get a reference to the underlying RecipeService.
    pub fn service(&self) -> &Arc<RecipeService> {
        &self.service
    }
}

impl Module for RecipeModule {
    fn name(&self) -> &str {
        "recipe"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
