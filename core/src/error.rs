//! Error types surfaced by the tournament and rating engine.

use crate::pairing::PairingError;
use crate::utils::validation::ValidationErrors;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the storage port.
#[derive(Debug, Error)]
pub enum DbError {
    /// entity not found
    #[error("entity not found")]
    NotFound,

    /// optimistic-lock version mismatch on update
    #[error("optimistic lock conflict")]
    OptimisticLockConflict,

    /// unique constraint violation, constraint name if known
    #[error("unique violation{0:?}")]
    UniqueViolation(Option<String>),

    /// connection, pool, or other backend error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Errors surfaced by the engine's public operations (spec §7).
#[derive(Debug, Error)]
pub enum CoreError {
    /// referenced entity missing
    #[error("not found: {0}")]
    NotFound(String),

    /// bracket generation requested with too few checked-in participants
    #[error("bracket requires at least {minimum} checked-in participants, found {found}")]
    TooFewParticipants { minimum: usize, found: usize },

    /// generate called on a bracket already generated
    #[error("bracket {0} has already been generated")]
    AlreadyGenerated(Uuid),

    /// invalid transition, e.g. undo on a match with no result
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// manual pairing outside weight tolerance and different weight classes
    #[error("weight mismatch: {0}")]
    WeightMismatch(String),

    /// unknown format or invalid config value
    #[error("config error: {0}")]
    Config(String),

    /// field-level config validation failure
    #[error("config validation failed: {0}")]
    ConfigValidation(#[from] ValidationErrors),

    /// optimistic-lock conflict detected during propagation
    #[error("stale state: {0}")]
    StaleState(String),

    /// storage backend error
    #[error("storage error: {0}")]
    Db(#[from] DbError),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn is_stale(&self) -> bool {
        matches!(self, CoreError::StaleState(_))
            || matches!(self, CoreError::Db(DbError::OptimisticLockConflict))
    }
}

impl From<PairingError> for CoreError {
    fn from(value: PairingError) -> Self {
        match value {
            PairingError::TooFewParticipants { minimum, found } => {
                CoreError::TooFewParticipants { minimum, found }
            }
        }
    }
}

/// maps a storage-layer `DbError` into the engine's error kind, naming the
/// entity that was being looked up so `NotFound` messages stay useful.
pub(crate) fn entity_err(entity: &'static str) -> impl FnOnce(DbError) -> CoreError {
    move |e| match e {
        DbError::NotFound => CoreError::NotFound(entity.to_string()),
        other => CoreError::Db(other),
    }
}
