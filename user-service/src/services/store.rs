use crate::models::{NewUser, User};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::sync::atomic::{AtomicU8, Ordering};

/// Connection lifecycle of a store client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected = 0,
    Connected = 1,
    Connecting = 2,
    Disconnecting = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionState::Connected,
            2 => ConnectionState::Connecting,
            3 => ConnectionState::Disconnecting,
            _ => ConnectionState::Disconnected,
        }
    }
}

/// Lock-free holder for a [`ConnectionState`], shared by store clones.
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new(state: ConnectionState) -> Self {
        Self(AtomicU8::new(state as u8))
    }

    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn set(&self, state: ConnectionState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Persistence contract for users. Every call targets at most one document,
/// except `find_all` and `count`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Name reported by the stats endpoint.
    fn name(&self) -> &str;

    /// Persists a new user; the store assigns the id and timestamps.
    /// A duplicate email yields [`AppError::BadRequest`].
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_all(&self) -> Result<Vec<User>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    /// Replaces the stored document with the same id. `None` if it is gone.
    async fn replace(&self, user: &User) -> Result<Option<User>, AppError>;

    /// Removes a user and returns its last snapshot.
    async fn delete_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    async fn count(&self) -> Result<u64, AppError>;

    async fn connection_state(&self) -> ConnectionState;

    async fn disconnect(&self);
}
