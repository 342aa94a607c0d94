//! Collaborators the controllers call out to. Implementations own
//! persistence and transport; the core only sees these traits.

use crate::model::{Incident, IncidentPayload, NewIncident, Registration, User};
use std::future::Future;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("incident '{0}' not found")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),
    #[error("admin code rejected")]
    InvalidAdminCode,
    #[error("invalid registration: {0}")]
    Invalid(String),
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

pub trait IncidentRepository {
    fn create(&self, incident: NewIncident) -> impl Future<Output = Result<Incident, RepositoryError>>;

    fn update(
        &self,
        id: &str,
        payload: IncidentPayload,
    ) -> impl Future<Output = Result<Incident, RepositoryError>>;
}

pub trait AuthCollaborator {
    fn current_user(&self) -> Option<User>;

    fn register(&self, registration: Registration) -> impl Future<Output = Result<User, AuthError>>;
}

impl<T: IncidentRepository> IncidentRepository for Arc<T> {
    fn create(&self, incident: NewIncident) -> impl Future<Output = Result<Incident, RepositoryError>> {
        (**self).create(incident)
    }

    fn update(
        &self,
        id: &str,
        payload: IncidentPayload,
    ) -> impl Future<Output = Result<Incident, RepositoryError>> {
        (**self).update(id, payload)
    }
}

impl<T: AuthCollaborator> AuthCollaborator for Arc<T> {
    fn current_user(&self) -> Option<User> {
        (**self).current_user()
    }

    fn register(&self, registration: Registration) -> impl Future<Output = Result<User, AuthError>> {
        (**self).register(registration)
    }
}
