use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use unimart_catalog::Category;

use crate::{auth::Auth, error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", delete(delete_category))
}

async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    let categories = state.categories.list_active().await?;
    Ok(Json(categories))
}

#[derive(Debug, Deserialize)]
struct CreateCategoryRequest {
    name: String,
    icon: Option<String>,
    description: Option<String>,
}

async fn create_category(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    if !actor.is_staff {
        return Err(AppError::AuthorizationError(
            "category management is admin-only".into(),
        ));
    }
    let category = Category::new(req.name, req.icon, req.description);
    state.categories.create(&category).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn delete_category(
    State(state): State<AppState>,
    Auth(actor): Auth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !actor.is_staff {
        return Err(AppError::AuthorizationError(
            "category management is admin-only".into(),
        ));
    }
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
