//! Auth module — user accounts, password login, JWT issuance.
//!
//! # Resources
//!
//! - **User** — email/username identity with a profile and a daily
//!   calorie total
//!
//! The module also implements the cross-module collaborator traits
//! [`mealhub_core::UserDirectory`] (invitation target resolution) and
//! [`mealhub_core::CalorieLedger`] (calorie credits from cooking).
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig};
//!
//! let service = AuthService::new(sql, AuthConfig::default())?;
//! let module = AuthModule::new(service, stats);
//! let router = module.routes(); // Mounted at /auth
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use mealhub_core::{ContributionStats, Module};

use crate::service::AuthService;

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
    stats: Arc<dyn ContributionStats>,
}

impl AuthModule {
    /// Create a new AuthModule.
    ///
    /// `stats` supplies the recipe/comment counts shown on the profile;
    /// it is implemented by the recipe module and injected by the binary.
    pub fn new(service: Arc<AuthService>, stats: Arc<dyn ContributionStats>) -> Self {
        Self { service, stats }
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.stats.clone())
    }
}
