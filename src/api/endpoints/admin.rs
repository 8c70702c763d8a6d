//! Admin database explorer.
//!
//! - `GET /api/admin/db` — row count per table
//! - `GET /api/admin/db?table=` — last 100 rows of one table
//! - `DELETE /api/admin/db?table=&id=` — delete one row by id
//!
//! Tables come from the closed `AdminTable` enum; an unknown name is a 400,
//! not a probe into arbitrary models.

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthContext};
use crate::db::{self, TableCount};
use crate::models::{AdminTable, Role};

fn parse_table(raw: &str) -> Result<AdminTable, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown table: {raw}")))
}

#[derive(Deserialize)]
pub struct BrowseQuery {
    pub table: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum BrowseResponse {
    Tables { tables: Vec<TableCount> },
    Rows { table: &'static str, rows: Vec<serde_json::Value> },
}

/// `GET /api/admin/db` — counts without a table, rows with one.
pub async fn browse(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<BrowseResponse>, ApiError> {
    auth.require_role(Role::Admin)?;
    let conn = ctx.open_db()?;

    match query.table {
        None => {
            let tables = db::admin_row_counts(&conn)?;
            Ok(Json(BrowseResponse::Tables { tables }))
        }
        Some(raw) => {
            let table = parse_table(&raw)?;
            let rows = db::admin_list_rows(&conn, table)?;
            Ok(Json(BrowseResponse::Rows {
                table: table.as_str(),
                rows,
            }))
        }
    }
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    pub table: String,
    pub id: String,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub table: &'static str,
    pub id: String,
    pub deleted: bool,
}

/// `DELETE /api/admin/db?table=&id=` — remove one row.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    auth.require_role(Role::Admin)?;
    let table = parse_table(&query.table)?;

    let conn = ctx.open_db()?;
    let deleted = db::admin_delete_row(&conn, table, &query.id)?;
    if !deleted {
        return Err(ApiError::NotFound(format!(
            "No row {} in {}",
            query.id,
            table.as_str()
        )));
    }

    tracing::info!(table = table.as_str(), id = %query.id, "admin deleted row");
    Ok(Json(DeleteResponse {
        table: table.as_str(),
        id: query.id,
        deleted,
    }))
}
