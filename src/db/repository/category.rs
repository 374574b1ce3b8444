//! Category Repository

use std::time::Duration;

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const CATEGORY_TABLE: &str = "category";

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub fn with_timeout(db: Surreal<Db>, timeout: Duration) -> Self {
        Self {
            base: BaseRepository::with_timeout(db, timeout),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        self.base
            .run(async {
                let categories: Vec<Category> = self
                    .base
                    .db()
                    .query("SELECT * FROM category ORDER BY name")
                    .await?
                    .take(0)?;
                Ok(categories)
            })
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let record_id = record_id(CATEGORY_TABLE, id)?;
        self.base
            .run(async {
                let category: Option<Category> = self.base.db().select(record_id).await?;
                Ok(category)
            })
            .await
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let name = name.to_string();
        self.base
            .run(async {
                let categories: Vec<Category> = self
                    .base
                    .db()
                    .query("SELECT * FROM category WHERE name = $name LIMIT 1")
                    .bind(("name", name))
                    .await?
                    .take(0)?;
                Ok(categories.into_iter().next())
            })
            .await
    }

    /// Create a category. Names are unique; a duplicate fails with
    /// [`RepoError::Duplicate`] before the write.
    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category '{}' already exists",
                data.name
            )));
        }

        let category = Category::new(data.name, data.image_path);
        self.base
            .run(async {
                let created: Option<Category> = self
                    .base
                    .db()
                    .create(CATEGORY_TABLE)
                    .content(category)
                    .await?;
                created.ok_or_else(|| RepoError::Database("Failed to create category".into()))
            })
            .await
    }

    /// Partial update. A rename into an existing name fails with
    /// [`RepoError::Duplicate`].
    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let record_id = record_id(CATEGORY_TABLE, id)?;

        if let Some(name) = &data.name
            && let Some(existing) = self.find_by_name(name).await?
            && existing.id.as_ref() != Some(&record_id)
        {
            return Err(RepoError::Duplicate(format!(
                "Category '{name}' already exists"
            )));
        }

        self.base
            .run(async {
                let updated: Option<Category> = self
                    .base
                    .db()
                    .update(record_id)
                    .merge(data)
                    .await?;
                updated.ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn repo() -> CategoryRepository {
        let service = DbService::memory().await.expect("memory db");
        CategoryRepository::new(service.db)
    }

    fn create(name: &str) -> CategoryCreate {
        CategoryCreate {
            name: name.to_string(),
            image_path: String::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected_at_create() {
        let repo = repo().await;
        repo.create(create("Drinks")).await.unwrap();

        let err = repo.create(create("Drinks")).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_rename_onto_existing_name_is_rejected() {
        let repo = repo().await;
        repo.create(create("Drinks")).await.unwrap();
        let snacks = repo.create(create("Snacks")).await.unwrap();

        let id = snacks.id.as_ref().unwrap().to_string();
        let err = repo
            .update(
                &id,
                CategoryUpdate {
                    name: Some("Drinks".to_string()),
                    image_path: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_rename_onto_itself_is_allowed() {
        let repo = repo().await;
        let drinks = repo.create(create("Drinks")).await.unwrap();

        let id = drinks.id.as_ref().unwrap().to_string();
        let updated = repo
            .update(
                &id,
                CategoryUpdate {
                    name: Some("Drinks".to_string()),
                    image_path: Some("drinks.png".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Drinks");
        assert_eq!(updated.image_path, "drinks.png");
    }
}
