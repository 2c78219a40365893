//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
///
/// Errors are modeled as a tree: `error_kind` says what went wrong at this
/// layer and `source` keeps the lower-layer error that caused it. `web`
/// depends on `domain` only and maps the kinds onto HTTP status codes.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    /// The authenticated user may not act on the requested record.
    Forbidden,
}

#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Other(String),
}

/// Entity errors reduced to what the domain layer cares about.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    /// Beginning or committing a transaction failed.
    DbTransaction,
    Other(String),
}

impl Error {
    pub fn invalid(reason: &str) -> Self {
        log::debug!("Rejecting invalid input: {reason}");
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid,
            )),
        }
    }

    pub fn forbidden() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Forbidden,
        }
    }

    /// Wraps an infrastructure failure (socket, session store) that has no
    /// entity-level meaning.
    pub fn other<E>(source: E, reason: &str) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error {
            source: Some(Box::new(source)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(reason.to_string())),
        }
    }

    pub fn db_transaction(source: sea_orm::DbErr) -> Self {
        Error {
            source: Some(Box::new(source)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::DbTransaction,
            )),
        }
    }

    pub fn unauthenticated() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Unauthenticated,
            )),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// Translation from the `entity_api` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::InvalidQueryTerm | EntityApiErrorKind::ValidationError => {
                EntityErrorKind::Invalid
            }
            EntityApiErrorKind::RecordUnauthenticated => EntityErrorKind::Unauthenticated,
            _ => EntityErrorKind::Other("EntityErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_error(kind: EntityApiErrorKind) -> EntityApiError {
        EntityApiError {
            source: None,
            error_kind: kind,
        }
    }

    #[test]
    fn not_found_is_preserved() {
        let err: Error = entity_error(EntityApiErrorKind::RecordNotFound).into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn constraint_violations_become_invalid() {
        let err: Error = entity_error(EntityApiErrorKind::ValidationError).into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
        );
    }

    #[test]
    fn system_errors_collapse_to_other() {
        let err: Error = entity_error(EntityApiErrorKind::SystemError).into();
        assert!(matches!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Other(_)))
        ));
    }
}
