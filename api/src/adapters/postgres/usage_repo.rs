//! PostgreSQL adapter for UsageRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, QueryFilter,
    Statement,
};

use crate::domain::entities::{MonthKey, UsageMonthly, UserId};
use crate::domain::ports::UsageRepository;
use crate::entity::usage_monthly;
use crate::error::DomainError;

/// Conditional upsert: creates the row at 1, or bumps it while below the
/// ceiling. The `WHERE` on the conflict branch makes the check and the
/// write a single statement, so concurrent requests cannot overshoot.
const INCREMENT_WITHIN_LIMIT_SQL: &str = r#"
INSERT INTO usage_monthly (user_id, yyyymm, calc_count, updated_at)
VALUES ($1, $2, 1, $3)
ON CONFLICT (user_id, yyyymm) DO UPDATE
    SET calc_count = usage_monthly.calc_count + 1,
        updated_at = EXCLUDED.updated_at
    WHERE usage_monthly.calc_count < $4
RETURNING calc_count
"#;

/// PostgreSQL implementation of UsageRepository
pub struct PostgresUsageRepository {
    db: DatabaseConnection,
}

impl PostgresUsageRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsageRepository for PostgresUsageRepository {
    async fn find(
        &self,
        user_id: &UserId,
        month: &MonthKey,
    ) -> Result<Option<UsageMonthly>, DomainError> {
        let result = usage_monthly::Entity::find()
            .filter(usage_monthly::Column::UserId.eq(user_id.0))
            .filter(usage_monthly::Column::Yyyymm.eq(month.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        result.map(UsageMonthly::try_from).transpose()
    }

    async fn increment_within_limit(
        &self,
        user_id: &UserId,
        month: &MonthKey,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<i32>, DomainError> {
        // The insert branch would write 1 unconditionally
        if limit == 0 {
            return Ok(None);
        }

        let limit = i32::try_from(limit).unwrap_or(i32::MAX);
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            INCREMENT_WITHIN_LIMIT_SQL,
            [
                user_id.0.into(),
                month.as_str().into(),
                now.fixed_offset().into(),
                limit.into(),
            ],
        );

        let row = self
            .db
            .query_one(stmt)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let count: i32 = row
                    .try_get("", "calc_count")
                    .map_err(|e| DomainError::Database(e.to_string()))?;
                Ok(Some(count))
            }
            // Conflict branch filtered out by the WHERE: ceiling reached
            None => Ok(None),
        }
    }
}

impl TryFrom<usage_monthly::Model> for UsageMonthly {
    type Error = DomainError;

    fn try_from(model: usage_monthly::Model) -> Result<Self, Self::Error> {
        let month = model
            .yyyymm
            .parse()
            .map_err(|e: String| DomainError::Database(e))?;

        Ok(UsageMonthly {
            user_id: UserId(model.user_id),
            month,
            calc_count: model.calc_count,
            updated_at: model.updated_at.with_timezone(&Utc),
        })
    }
}
