//! PostgreSQL adapter for ProfileRepository

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::domain::entities::{Profile, UserId};
use crate::domain::ports::ProfileRepository;
use crate::entity::profiles;
use crate::error::DomainError;

/// PostgreSQL implementation of ProfileRepository
pub struct PostgresProfileRepository {
    db: DatabaseConnection,
}

impl PostgresProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Profile>, DomainError> {
        let result = profiles::Entity::find_by_id(user_id.0)
            .one(&self.db)
            .await
            .map_err(|e| DomainError::Database(e.to_string()))?;

        Ok(result.map(|m| m.into()))
    }
}

impl From<profiles::Model> for Profile {
    fn from(model: profiles::Model) -> Self {
        Profile {
            user_id: UserId(model.user_id),
            is_pro: model.is_pro,
        }
    }
}
