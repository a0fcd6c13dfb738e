//! Process-local user store for development and tests.

use crate::models::{NewUser, User};
use crate::services::store::{ConnectionState, StateCell, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;
use tokio::sync::RwLock;

pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    state: StateCell,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            state: StateCell::new(ConnectionState::Connected),
        }
    }

    /// Simulates losing (or regaining) the store. While disconnected every
    /// query fails.
    pub fn set_connected(&self, connected: bool) {
        self.state.set(if connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        });
    }

    fn ensure_connected(&self) -> Result<(), AppError> {
        match self.state.get() {
            ConnectionState::Connected => Ok(()),
            state => Err(AppError::DatabaseError(anyhow::anyhow!(
                "In-memory store is not connected (state: {:?})",
                state
            ))),
        }
    }
}

fn duplicate_email(email: &str) -> AppError {
    AppError::BadRequest(anyhow::anyhow!(
        "A user with email '{}' already exists",
        email
    ))
}

#[async_trait]
impl UserStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        self.ensure_connected()?;
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == new_user.email) {
            return Err(duplicate_email(&new_user.email));
        }

        let user = User::new(ObjectId::new(), new_user, Utc::now());
        users.push(user.clone());
        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        self.ensure_connected()?;
        Ok(self.users.read().await.clone())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        self.ensure_connected()?;
        Ok(self.users.read().await.iter().find(|u| &u.id == id).cloned())
    }

    async fn replace(&self, user: &User) -> Result<Option<User>, AppError> {
        self.ensure_connected()?;
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(duplicate_email(&user.email));
        }

        Ok(users.iter_mut().find(|u| u.id == user.id).map(|stored| {
            *stored = user.clone();
            stored.clone()
        }))
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        self.ensure_connected()?;
        let mut users = self.users.write().await;

        Ok(users
            .iter()
            .position(|u| &u.id == id)
            .map(|index| users.remove(index)))
    }

    async fn count(&self) -> Result<u64, AppError> {
        self.ensure_connected()?;
        Ok(self.users.read().await.len() as u64)
    }

    async fn connection_state(&self) -> ConnectionState {
        self.state.get()
    }

    async fn disconnect(&self) {
        self.state.set(ConnectionState::Disconnected);
    }
}
