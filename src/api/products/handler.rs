//! Product API Handlers
//!
//! Create and update arrive as multipart forms (text fields plus an optional
//! image file). Field problems are collected into one validation response.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate, ProductView};
use crate::utils::validation::{self, MAX_NAME_LEN, MAX_NOTE_LEN};
use crate::utils::{AppError, AppResult};

/// Text fields and image bytes pulled out of a multipart form
#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    price: Option<String>,
    category_id: Option<String>,
    description: Option<String>,
    is_offer: Option<String>,
    is_available: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

impl ProductForm {
    async fn parse(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            match field.name().unwrap_or("") {
                "name" => form.name = Some(field.text().await?),
                "price" => form.price = Some(field.text().await?),
                "category_id" => form.category_id = Some(field.text().await?),
                "description" => form.description = Some(field.text().await?),
                "is_offer" => form.is_offer = Some(field.text().await?),
                "is_available" => form.is_available = Some(field.text().await?),
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

fn parse_price(raw: &str) -> Result<i64, String> {
    match raw.parse::<i64>() {
        Ok(price) if price >= 0 => Ok(price),
        Ok(_) => Err("price: must not be negative".to_string()),
        Err(_) => Err("price: must be an integer amount in minor units".to_string()),
    }
}

fn parse_flag(raw: &str, field: &str) -> Result<bool, String> {
    raw.parse::<bool>()
        .map_err(|_| format!("{field}: must be true or false"))
}

/// GET /products - available products with category names (public)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ProductView>>> {
    let products = state.products().find_available().await?;
    Ok(Json(products))
}

/// POST /products - create a product (admin, multipart)
pub async fn create(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Product>)> {
    let form = ProductForm::parse(multipart).await?;

    let mut problems = Vec::new();
    let name = match form.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() && name.len() <= MAX_NAME_LEN => name.to_string(),
        Some(_) => {
            problems.push(format!("name: must be 1-{MAX_NAME_LEN} characters"));
            String::new()
        }
        None => {
            problems.push("name: required".to_string());
            String::new()
        }
    };
    let price = match form.price.as_deref() {
        Some(raw) => parse_price(raw).unwrap_or_else(|p| {
            problems.push(p);
            0
        }),
        None => {
            problems.push("price: required".to_string());
            0
        }
    };
    let category_id = match form.category_id {
        Some(ref id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => {
            problems.push("category_id: required".to_string());
            String::new()
        }
    };
    let description = form.description.unwrap_or_default();
    if description.len() > MAX_NOTE_LEN {
        problems.push(format!("description: max {MAX_NOTE_LEN} characters"));
    }
    let is_offer = match form.is_offer.as_deref() {
        Some(raw) => parse_flag(raw, "is_offer").unwrap_or_else(|p| {
            problems.push(p);
            false
        }),
        None => false,
    };
    let is_available = match form.is_available.as_deref() {
        Some(raw) => parse_flag(raw, "is_available").unwrap_or_else(|p| {
            problems.push(p);
            true
        }),
        None => true,
    };

    if !problems.is_empty() {
        return Err(AppError::Validation {
            message: "Invalid product".to_string(),
            details: Some(problems),
        });
    }

    if state.categories().find_by_id(&category_id).await?.is_none() {
        return Err(AppError::not_found(format!("Category {category_id}")));
    }

    let image_path = match &form.image {
        Some((file_name, bytes)) => state.images().save(file_name, bytes).await?,
        None => String::new(),
    };

    let product = state
        .products()
        .create(ProductCreate {
            name,
            price,
            category_id,
            image_path,
            is_offer,
            description,
            is_available,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /products/:id - partial update (admin, multipart)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<Product>> {
    let form = ProductForm::parse(multipart).await?;

    let mut problems = Vec::new();
    let mut data = ProductUpdate::default();

    if let Some(name) = form.name {
        let name = name.trim().to_string();
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            problems.push(format!("name: must be 1-{MAX_NAME_LEN} characters"));
        } else {
            data.name = Some(name);
        }
    }
    if let Some(raw) = form.price.as_deref() {
        match parse_price(raw) {
            Ok(price) => data.price = Some(price),
            Err(p) => problems.push(p),
        }
    }
    if let Some(category_id) = form.category_id {
        if state.categories().find_by_id(&category_id).await?.is_none() {
            return Err(AppError::not_found(format!("Category {category_id}")));
        }
        data.category_id = Some(category_id);
    }
    if let Some(description) = form.description {
        if description.len() > MAX_NOTE_LEN {
            problems.push(format!("description: max {MAX_NOTE_LEN} characters"));
        } else {
            data.description = Some(description);
        }
    }
    if let Some(raw) = form.is_offer.as_deref() {
        match parse_flag(raw, "is_offer") {
            Ok(flag) => data.is_offer = Some(flag),
            Err(p) => problems.push(p),
        }
    }
    if let Some(raw) = form.is_available.as_deref() {
        match parse_flag(raw, "is_available") {
            Ok(flag) => data.is_available = Some(flag),
            Err(p) => problems.push(p),
        }
    }

    if !problems.is_empty() {
        return Err(AppError::Validation {
            message: "Invalid product".to_string(),
            details: Some(problems),
        });
    }

    if let Some((file_name, bytes)) = &form.image {
        data.image_path = Some(state.images().save(file_name, bytes).await?);
    }

    let product = state.products().update(&id, data).await?;
    Ok(Json(product))
}

/// DELETE /products/:id - soft delete, the product leaves the catalog but
/// stays on historical orders (admin)
pub async fn remove(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = state.products().soft_delete(&id).await?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RateRequest {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub stars: i64,
}

/// POST /products/:id/rate - fold one star rating into the product
pub async fn rate(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RateRequest>,
) -> AppResult<Json<Product>> {
    validation::check(&payload)?;
    let product = state.products().apply_rating(&id, payload.stars).await?;
    Ok(Json(product))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_parsing() {
        assert_eq!(parse_price("1250"), Ok(1250));
        assert!(parse_price("-1").is_err());
        assert!(parse_price("12.50").is_err());
        assert!(parse_price("abc").is_err());
    }

    #[test]
    fn test_flag_parsing() {
        assert_eq!(parse_flag("true", "is_offer"), Ok(true));
        assert_eq!(parse_flag("false", "is_offer"), Ok(false));
        assert!(parse_flag("yes", "is_offer").is_err());
    }

    #[test]
    fn test_rate_request_bounds() {
        assert!(validation::check(&RateRequest { stars: 3 }).is_ok());
        assert!(validation::check(&RateRequest { stars: 0 }).is_err());
        assert!(validation::check(&RateRequest { stars: 6 }).is_err());
    }
}
