//! services/api/src/adapters/chat_log.rs
//!
//! This module contains the chat log adapter, the concrete implementation of the
//! `ChatLogService` port from the `core` crate. It writes rows to the `chats`
//! table of a PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;
use sungura_core::domain::ChatMessage;
use sungura_core::ports::{ChatLogService, PortError, PortResult};
use uuid::Uuid;

use crate::config::PersistenceConfig;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ChatLogService` port.
#[derive(Clone)]
pub struct PgChatLogAdapter {
    pool: PgPool,
}

impl PgChatLogAdapter {
    /// Creates a new `PgChatLogAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds a lazily connected pool, so an unreachable database never blocks startup.
    /// The service key is used as the connection password.
    pub fn connect_lazy(config: &PersistenceConfig) -> Result<Self, sqlx::Error> {
        let options = PgConnectOptions::from_str(&config.database_url)?.password(&config.service_key);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(options);
        Ok(Self::new(pool))
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Struct
//=========================================================================================

struct ChatRecord {
    id: Uuid,
    user_id: String,
    role: &'static str,
    content: String,
    course_context: Option<String>,
    created_at: DateTime<Utc>,
}

impl ChatRecord {
    fn from_domain(message: ChatMessage) -> Self {
        Self {
            id: message.id,
            user_id: message.user_id,
            role: message.role.as_str(),
            content: message.content,
            course_context: message.course_context,
            created_at: message.created_at,
        }
    }
}

//=========================================================================================
// `ChatLogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatLogService for PgChatLogAdapter {
    async fn save_chat_message(&self, message: ChatMessage) -> PortResult<()> {
        let record = ChatRecord::from_domain(message);
        sqlx::query(
            "INSERT INTO chats (id, user_id, role, content, course_context, created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.role)
        .bind(record.content)
        .bind(record.course_context)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
