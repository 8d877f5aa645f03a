use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::ids::{ProjectId, UserId};
use atelier_core::messages::ChatMessage;
use atelier_core::vfs::FileSystemData;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: ProjectId,
    pub user_id: UserId,
    pub name: String,
    pub messages: Vec<ChatMessage>,
    pub data: FileSystemData,
    pub created_at: String,
    pub updated_at: String,
}

pub struct ProjectRepo {
    db: Database,
}

impl ProjectRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a project owned by `user_id`. Messages and file-system data are
    /// stored as JSON text columns.
    #[instrument(skip(self, messages, data), fields(user_id = %user_id, name))]
    pub fn create(
        &self,
        user_id: &UserId,
        name: &str,
        messages: &[ChatMessage],
        data: &FileSystemData,
    ) -> Result<ProjectRow, StoreError> {
        let id = ProjectId::new();
        let now = Utc::now().to_rfc3339();
        let messages_json = serde_json::to_string(messages)?;
        let data_json = serde_json::to_string(data)?;

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects (id, user_id, name, messages, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id.as_str(),
                    user_id.as_str(),
                    name,
                    messages_json,
                    data_json,
                    now,
                    now,
                ],
            )?;

            Ok(ProjectRow {
                id: id.clone(),
                user_id: user_id.clone(),
                name: name.to_string(),
                messages: messages.to_vec(),
                data: data.clone(),
                created_at: now.clone(),
                updated_at: now.clone(),
            })
        })
    }

    /// Get a project by ID.
    #[instrument(skip(self), fields(project_id = %id))]
    pub fn get(&self, id: &ProjectId) -> Result<ProjectRow, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, messages, data, created_at, updated_at
                 FROM projects WHERE id = ?1",
            )?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => row_to_project(row),
                None => Err(StoreError::NotFound(format!("project {id}"))),
            }
        })
    }

    /// List a user's projects, most recently touched first. Callers rely on
    /// this ordering: the first entry is the post-login landing target.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub fn list_for_user(&self, user_id: &UserId) -> Result<Vec<ProjectRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, messages, data, created_at, updated_at
                 FROM projects WHERE user_id = ?1
                 ORDER BY updated_at DESC, created_at DESC",
            )?;
            let mut rows = stmt.query([user_id.as_str()])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_project(row)?);
            }
            Ok(results)
        })
    }
}

fn row_to_project(row: &rusqlite::Row<'_>) -> Result<ProjectRow, StoreError> {
    let messages_raw: String = row_helpers::get(row, 3, "projects", "messages")?;
    let data_raw: String = row_helpers::get(row, 4, "projects", "data")?;

    Ok(ProjectRow {
        id: ProjectId::from_raw(row_helpers::get::<String>(row, 0, "projects", "id")?),
        user_id: UserId::from_raw(row_helpers::get::<String>(row, 1, "projects", "user_id")?),
        name: row_helpers::get(row, 2, "projects", "name")?,
        messages: row_helpers::parse_json(&messages_raw, "projects", "messages")?,
        data: row_helpers::parse_json(&data_raw, "projects", "data")?,
        created_at: row_helpers::get(row, 5, "projects", "created_at")?,
        updated_at: row_helpers::get(row, 6, "projects", "updated_at")?,
    })
}
