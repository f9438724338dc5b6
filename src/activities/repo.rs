use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ActivityRow, ActivityWrite};

/// Activity persistence. Every lookup and mutation is keyed by
/// `(id, user_id)` so one user can never reach another user's rows.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn insert_activity(&self, user_id: Uuid, data: &ActivityWrite)
        -> anyhow::Result<ActivityRow>;
    async fn find_activity_by_id(&self, id: Uuid, user_id: Uuid)
        -> anyhow::Result<Option<ActivityRow>>;
    async fn find_all_activities(&self, user_id: Uuid) -> anyhow::Result<Vec<ActivityRow>>;
    /// Returns `false` when no owned row matched.
    async fn update_activity(&self, id: Uuid, user_id: Uuid, data: &ActivityWrite)
        -> anyhow::Result<bool>;
    /// Returns `false` when no owned row matched.
    async fn delete_activity(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgActivityStore {
    db: PgPool,
}

impl PgActivityStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityStore for PgActivityStore {
    async fn insert_activity(
        &self,
        user_id: Uuid,
        data: &ActivityWrite,
    ) -> anyhow::Result<ActivityRow> {
        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            INSERT INTO activities (id, user_id, activity_type, details, carbon_kg)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, activity_type, details, carbon_kg, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(data.activity_type.as_str())
        .bind(&data.details)
        .bind(data.carbon_kg)
        .fetch_one(&self.db)
        .await
        .context("insert activity")?;
        Ok(row)
    }

    async fn find_activity_by_id(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<ActivityRow>> {
        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, user_id, activity_type, details, carbon_kg, created_at
              FROM activities
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find activity by id")?;
        Ok(row)
    }

    async fn find_all_activities(&self, user_id: Uuid) -> anyhow::Result<Vec<ActivityRow>> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, user_id, activity_type, details, carbon_kg, created_at
              FROM activities
             WHERE user_id = $1
             ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list activities by user")?;
        Ok(rows)
    }

    async fn update_activity(
        &self,
        id: Uuid,
        user_id: Uuid,
        data: &ActivityWrite,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE activities
               SET activity_type = $1, details = $2, carbon_kg = $3
             WHERE id = $4 AND user_id = $5
            "#,
        )
        .bind(data.activity_type.as_str())
        .bind(&data.details)
        .bind(data.carbon_kg)
        .bind(id)
        .bind(user_id)
        .execute(&self.db)
        .await
        .context("update activity")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_activity(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM activities WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.db)
            .await
            .context("delete activity")?;
        Ok(res.rows_affected() > 0)
    }
}
