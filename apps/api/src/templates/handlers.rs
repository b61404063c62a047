//! Axum route handlers for the Templates API.

use axum::{extract::Path, Json};

use crate::errors::AppError;
use crate::templates::catalog::{find_template, list_templates, TemplateInfo};

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<&'static [TemplateInfo]> {
    Json(list_templates())
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(
    Path(id): Path<String>,
) -> Result<Json<&'static TemplateInfo>, AppError> {
    find_template(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Template '{id}' not found")))
}
