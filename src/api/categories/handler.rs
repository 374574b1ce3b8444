//! Category API Handlers
//!
//! Multipart forms carry the name plus an optional image. Names are unique;
//! the repository rejects duplicates with a conflict.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::db::models::{Category, CategoryCreate, CategoryUpdate};
use crate::utils::validation::MAX_NAME_LEN;
use crate::utils::{AppError, AppResult};

#[derive(Default)]
struct CategoryForm {
    name: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

impl CategoryForm {
    async fn parse(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            match field.name().unwrap_or("") {
                "name" => form.name = Some(field.text().await?),
                "image" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let bytes = field.bytes().await?.to_vec();
                    form.image = Some((file_name, bytes));
                }
                other => {
                    tracing::debug!(field = other, "Ignoring unknown multipart field");
                }
            }
        }
        Ok(form)
    }
}

fn checked_name(raw: Option<&str>) -> AppResult<String> {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() && name.len() <= MAX_NAME_LEN => Ok(name.to_string()),
        Some(_) => Err(AppError::validation(format!(
            "name must be 1-{MAX_NAME_LEN} characters"
        ))),
        None => Err(AppError::validation("name is required")),
    }
}

/// GET /categories - all categories (public)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.categories().find_all().await?;
    Ok(Json(categories))
}

/// POST /categories - create a category (admin, multipart)
pub async fn create(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Category>)> {
    let form = CategoryForm::parse(multipart).await?;
    let name = checked_name(form.name.as_deref())?;

    let image_path = match &form.image {
        Some((file_name, bytes)) => state.images().save(file_name, bytes).await?,
        None => String::new(),
    };

    let category = state
        .categories()
        .create(CategoryCreate { name, image_path })
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /categories/:id - partial update (admin, multipart)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<Category>> {
    let form = CategoryForm::parse(multipart).await?;

    let name = match form.name.as_deref() {
        Some(raw) => Some(checked_name(Some(raw))?),
        None => None,
    };
    let image_path = match &form.image {
        Some((file_name, bytes)) => Some(state.images().save(file_name, bytes).await?),
        None => None,
    };

    let category = state
        .categories()
        .update(&id, CategoryUpdate { name, image_path })
        .await?;
    Ok(Json(category))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_must_be_present_and_bounded() {
        assert!(checked_name(None).is_err());
        assert!(checked_name(Some("  ")).is_err());
        assert!(checked_name(Some(&"x".repeat(MAX_NAME_LEN + 1))).is_err());
        assert_eq!(checked_name(Some(" Drinks ")).unwrap(), "Drinks");
    }
}
