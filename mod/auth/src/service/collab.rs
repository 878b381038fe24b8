//! Collaborator trait implementations exposed to the other modules.

use mealhub_core::{CalorieLedger, ServiceError, UserDirectory, UserRef};

use crate::service::AuthService;

impl UserDirectory for AuthService {
    fn resolve(
        &self,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<Option<UserRef>, ServiceError> {
        let user = self
            .find_by_email_or_username(email, username)
            .map_err(ServiceError::from)?;

        Ok(user.map(|u| UserRef {
            id: u.id,
            email: u.email,
            username: u.username,
            profile_image: u.profile_image,
        }))
    }
}

impl CalorieLedger for AuthService {
    fn add_calories(&self, user_id: &str, calories: i64) -> Result<i64, ServiceError> {
        AuthService::add_calories(self, user_id, calories).map_err(ServiceError::from)
    }
}
