use crate::models::{NewUser, User};
use crate::services::store::{ConnectionState, StateCell, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, FindOneAndReplaceOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;
use std::sync::Arc;
use std::time::Duration;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
    state: Arc<StateCell>,
}

impl MongoDb {
    /// Builds the client and pings the server. An unreachable server is
    /// logged and reported as `disconnected`; requests then fail with 500
    /// until it comes back.
    pub async fn connect(uri: &str, database: &str, timeout: Duration) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let mut options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Invalid MongoDB connection string: {}", e);
            AppError::ConfigError(anyhow::anyhow!("Invalid MongoDB connection string: {}", e))
        })?;
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);
        options.app_name = Some("user-service".to_string());

        let client = MongoClient::with_options(options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        let mongo = Self {
            client,
            db,
            state: Arc::new(StateCell::new(ConnectionState::Connecting)),
        };

        match mongo.health_check().await {
            Ok(()) => tracing::info!(database = %database, "Successfully connected to MongoDB database"),
            Err(e) => tracing::warn!(error = %e, "MongoDB is not reachable yet"),
        }

        Ok(mongo)
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for user-service");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("email_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.users()
            .create_index(email_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create email index on users collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on users.email");

        Ok(())
    }

    /// Pings the server and records the outcome as the connection state.
    pub async fn health_check(&self) -> Result<(), AppError> {
        let result = self
            .client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await;

        match result {
            Ok(_) => {
                self.state.set(ConnectionState::Connected);
                Ok(())
            }
            Err(e) => {
                tracing::error!("MongoDB health check failed: {}", e);
                self.state.set(ConnectionState::Disconnected);
                Err(AppError::from(e))
            }
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    fn write_error(&self, e: mongodb::error::Error, email: &str) -> AppError {
        if is_duplicate_key(&e) {
            AppError::BadRequest(anyhow::anyhow!(
                "A user with email '{}' already exists",
                email
            ))
        } else {
            AppError::from(e)
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

#[async_trait]
impl UserStore for MongoDb {
    fn name(&self) -> &str {
        self.db.name()
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, AppError> {
        let user = User::new(ObjectId::new(), new_user, Utc::now());

        self.users()
            .insert_one(&user, None)
            .await
            .map_err(|e| self.write_error(e, &user.email))?;

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        // Natural order is insertion order for a plain collection.
        let cursor = self
            .users()
            .find(None, None)
            .await
            .map_err(AppError::from)?;

        cursor.try_collect().await.map_err(AppError::from)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        self.users()
            .find_one(doc! { "_id": *id }, None)
            .await
            .map_err(AppError::from)
    }

    async fn replace(&self, user: &User) -> Result<Option<User>, AppError> {
        let options = FindOneAndReplaceOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.users()
            .find_one_and_replace(doc! { "_id": user.id }, user, options)
            .await
            .map_err(|e| self.write_error(e, &user.email))
    }

    async fn delete_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        self.users()
            .find_one_and_delete(doc! { "_id": *id }, None)
            .await
            .map_err(AppError::from)
    }

    async fn count(&self) -> Result<u64, AppError> {
        self.users()
            .count_documents(None, None)
            .await
            .map_err(AppError::from)
    }

    async fn connection_state(&self) -> ConnectionState {
        match self.state.get() {
            // Transitional states are owned by connect/disconnect.
            state @ (ConnectionState::Connecting | ConnectionState::Disconnecting) => state,
            _ => {
                let _ = self.health_check().await;
                self.state.get()
            }
        }
    }

    async fn disconnect(&self) {
        self.state.set(ConnectionState::Disconnecting);
        tracing::info!("Closing MongoDB connections");
        self.client.clone().shutdown().await;
        self.state.set(ConnectionState::Disconnected);
    }
}
