//! Family module — family groups, invitations, and meal voting.
//!
//! # Resources
//!
//! - **Family** — a named group with exactly one admin, set at creation
//! - **FamilyMember** — membership rows, unique per (family, user)
//! - **FamilyInvitation** — pending → accepted | rejected state machine
//! - **MealVote** — time-boxed family poll over recipe options, one
//!   ballot per member with re-votes overwriting the prior choice
//!
//! Invitation targets and meal-vote recipes are resolved through the
//! [`mealhub_core::UserDirectory`] and [`mealhub_core::RecipeCatalog`]
//! collaborators, injected by the binary.

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use mealhub_core::Module;

use crate::service::FamilyService;

/// Family module implementing the Module trait.
pub struct FamilyModule {
    service: Arc<FamilyService>,
}

impl FamilyModule {
    pub fn new(service: Arc<FamilyService>) -> Self {
        Self { service }
    }

    /// Get a reference to the underlying FamilyService.
    pub fn service(&self) -> &Arc<FamilyService> {
        &self.service
    }
}

impl Module for FamilyModule {
    fn name(&self) -> &str {
        "family"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
