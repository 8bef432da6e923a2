use crate::api::change_request::file_request;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::change_request::{ProtectedTable, RequestAction};
use crate::model::client::{Client, ClientCategory};
use crate::model::role::Role;
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::ToSchema;

const CLIENT_ROLES: &[Role] = &[Role::Admin, Role::Accountant];

#[derive(Deserialize, ToSchema)]
pub struct CreateClient {
    #[schema(example = "Acme Mills Ltd")]
    pub name: String,

    #[schema(example = "Plot 12, Industrial Area", nullable = true)]
    pub address: Option<String>,

    #[schema(example = "22AAAAA0000A1Z5", nullable = true)]
    pub gstin: Option<String>,

    #[schema(example = 9.0, nullable = true)]
    pub cgst_rate: Option<f64>,

    #[schema(example = 9.0, nullable = true)]
    pub sgst_rate: Option<f64>,

    #[schema(example = 18.0, nullable = true)]
    pub igst_rate: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateCategory {
    #[schema(example = "security guard")]
    pub name: String,

    #[schema(example = 1200.0)]
    pub rate_per_month: f64,
}

#[derive(Serialize, ToSchema)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub categories: Vec<ClientCategory>,
}

/* =========================
Create client
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    request_body = CreateClient,
    responses(
        (status = 201, description = "Client created", body = Client),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Client"
)]
pub async fn create_client(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateClient>,
) -> Result<impl Responder, ApiError> {
    auth.require(CLIENT_ROLES)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("Client name must not be empty".into()));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO clients (name, address, gstin, cgst_rate, sgst_rate, igst_rate)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.address)
    .bind(&payload.gstin)
    .bind(payload.cgst_rate)
    .bind(payload.sgst_rate)
    .bind(payload.igst_rate)
    .execute(pool.get_ref())
    .await?;

    let created = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, address, gstin, cgst_rate, sgst_rate, igst_rate
        FROM clients
        WHERE id = ?
        "#,
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    info!(client_id = created.id, "Client created");

    Ok(HttpResponse::Created().json(created))
}

/* =========================
Add category to a client's price list
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/clients/{client_id}/categories",
    params(
        ("client_id" = u64, Path, description = "Client ID")
    ),
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category added", body = ClientCategory),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Client"
)]
pub async fn add_category(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateCategory>,
) -> Result<impl Responder, ApiError> {
    auth.require(CLIENT_ROLES)?;

    let client_id = path.into_inner();

    let exists = sqlx::query_scalar::<_, i64>(
        r#"SELECT EXISTS(SELECT 1 FROM clients WHERE id = ? LIMIT 1)"#,
    )
    .bind(client_id)
    .fetch_one(pool.get_ref())
    .await?;
    if exists == 0 {
        return Err(ApiError::NotFound("Client not found".into()));
    }

    let result = sqlx::query(
        r#"INSERT INTO client_categories (client_id, name, rate_per_month) VALUES (?, ?, ?)"#,
    )
    .bind(client_id)
    .bind(&payload.name)
    .bind(payload.rate_per_month)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(ClientCategory {
        id: result.last_insert_id(),
        client_id,
        name: payload.name.clone(),
        rate_per_month: payload.rate_per_month,
    }))
}

/* =========================
List clients
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    responses(
        (status = 200, description = "All clients", body = Vec<Client>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Client"
)]
pub async fn list_clients(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    let clients = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, address, gstin, cgst_rate, sgst_rate, igst_rate
        FROM clients
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(clients))
}

/* =========================
Get client with price list
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/clients/{client_id}",
    params(
        ("client_id" = u64, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Client with categories", body = ClientDetail),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Client"
)]
pub async fn get_client(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let client_id = path.into_inner();

    let client = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, address, gstin, cgst_rate, sgst_rate, igst_rate
        FROM clients
        WHERE id = ?
        "#,
    )
    .bind(client_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::NotFound("Client not found".into()))?;

    let categories = sqlx::query_as::<_, ClientCategory>(
        r#"
        SELECT id, client_id, name, rate_per_month
        FROM client_categories
        WHERE client_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(client_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(ClientDetail { client, categories }))
}

/* =========================
Update client (Admin direct, Accountant via request)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/clients/{client_id}",
    params(
        ("client_id" = u64, Path, description = "Client ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Updated directly (admin)"),
        (status = 202, description = "Change request filed (accountant)"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Client"
)]
pub async fn update_client(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<impl Responder, ApiError> {
    let client_id = path.into_inner();

    if auth.is_admin() {
        let update = build_update_sql(
            ProtectedTable::Client.sql_table(),
            &body,
            ProtectedTable::Client.editable_columns(),
            "id",
            client_id,
        )?;
        let mut conn = pool.acquire().await?;
        let affected = execute_update(&mut conn, update).await?;
        if affected == 0 {
            return Err(ApiError::NotFound("Client not found".into()));
        }
        return Ok(HttpResponse::Ok().json(json!({ "message": "Client updated" })));
    }

    auth.require(&[Role::Accountant])?;

    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::InvalidInput("Payload must be a JSON object".into()))?;
    if obj.is_empty() {
        return Err(ApiError::InvalidInput("Payload must not be empty".into()));
    }
    for key in obj.keys() {
        if !ProtectedTable::Client.editable_columns().contains(&key.as_str()) {
            return Err(ApiError::InvalidInput(format!(
                "Field '{}' is not editable on client",
                key
            )));
        }
    }

    let request = file_request(
        pool.get_ref(),
        ProtectedTable::Client,
        client_id,
        RequestAction::Edit,
        auth.user_id,
        Some(body.into_inner()),
    )
    .await?;

    Ok(HttpResponse::Accepted().json(json!({
        "message": "Change request filed",
        "request_id": request.id,
        "status": request.status,
    })))
}

/* =========================
Delete client (Admin direct, Accountant via request)
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{client_id}",
    params(
        ("client_id" = u64, Path, description = "Client ID")
    ),
    responses(
        (status = 200, description = "Deleted directly (admin)"),
        (status = 202, description = "Change request filed (accountant)"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Client"
)]
pub async fn delete_client(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let client_id = path.into_inner();

    if auth.is_admin() {
        let result = sqlx::query(r#"DELETE FROM clients WHERE id = ?"#)
            .bind(client_id)
            .execute(pool.get_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Client not found".into()));
        }
        return Ok(HttpResponse::Ok().json(json!({ "message": "Client deleted" })));
    }

    auth.require(&[Role::Accountant])?;

    let request = file_request(
        pool.get_ref(),
        ProtectedTable::Client,
        client_id,
        RequestAction::Delete,
        auth.user_id,
        None,
    )
    .await?;

    Ok(HttpResponse::Accepted().json(json!({
        "message": "Change request filed",
        "request_id": request.id,
        "status": request.status,
    })))
}
