use crate::api::change_request::file_request;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::change_request::{ProtectedTable, RequestAction};
use crate::model::employee::Employee;
use crate::model::role::Role;
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const EMPLOYEE_ROLES: &[Role] = &[Role::Admin, Role::Hr];

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Ramesh Kumar")]
    pub name: String,

    #[schema(example = "security guard")]
    pub category: String,

    #[schema(example = 1)]
    pub client_id: u64,

    #[schema(example = 3000.0)]
    pub rate_per_month: f64,

    #[schema(example = "+919812345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub joined_on: NaiveDate,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct EmployeeFilter {
    #[schema(example = 1)]
    pub client_id: Option<u64>,

    #[schema(example = "security guard")]
    pub category: Option<String>,
}

/* =========================
Create employee
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<impl Responder, ApiError> {
    auth.require(EMPLOYEE_ROLES)?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("Employee name must not be empty".into()));
    }

    let client_exists = sqlx::query_scalar::<_, i64>(
        r#"SELECT EXISTS(SELECT 1 FROM clients WHERE id = ? LIMIT 1)"#,
    )
    .bind(payload.client_id)
    .fetch_one(pool.get_ref())
    .await?;
    if client_exists == 0 {
        return Err(ApiError::NotFound("Client not found".into()));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO employees (name, category, client_id, rate_per_month, phone, joined_on)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.category)
    .bind(payload.client_id)
    .bind(payload.rate_per_month)
    .bind(&payload.phone)
    .bind(payload.joined_on)
    .execute(pool.get_ref())
    .await?;

    let created = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, category, client_id, rate_per_month, phone, joined_on
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await?;

    info!(employee_id = created.id, "Employee created");

    Ok(HttpResponse::Created().json(created))
}

/* =========================
List employees
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "Employees, optionally filtered", body = Vec<Employee>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeFilter>,
) -> Result<impl Responder, ApiError> {
    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<sqlx::types::JsonValue> = Vec::new();

    if let Some(client_id) = query.client_id {
        conditions.push("client_id = ?");
        bindings.push(client_id.into());
    }

    if let Some(category) = &query.category {
        conditions.push("category = ?");
        bindings.push(category.clone().into());
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT id, name, category, client_id, rate_per_month, phone, joined_on FROM employees {} ORDER BY id ASC",
        where_clause
    );

    let mut data_query = sqlx::query_as::<_, Employee>(&sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }

    let employees = data_query.fetch_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(employees))
}

/* =========================
Get employee
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, category, client_id, rate_per_month, phone, joined_on
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::NotFound("Employee not found".into()))?;

    Ok(HttpResponse::Ok().json(employee))
}

/* =========================
Update employee (Admin direct, HR via request)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Updated directly (admin)"),
        (status = 202, description = "Change request filed (HR)"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();

    if auth.is_admin() {
        let update = build_update_sql(
            ProtectedTable::Employee.sql_table(),
            &body,
            ProtectedTable::Employee.editable_columns(),
            "id",
            employee_id,
        )?;
        let mut conn = pool.acquire().await?;
        let affected = execute_update(&mut conn, update).await?;
        if affected == 0 {
            return Err(ApiError::NotFound("Employee not found".into()));
        }
        return Ok(HttpResponse::Ok().json(json!({ "message": "Employee updated" })));
    }

    auth.require(&[Role::Hr])?;

    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::InvalidInput("Payload must be a JSON object".into()))?;
    if obj.is_empty() {
        return Err(ApiError::InvalidInput("Payload must not be empty".into()));
    }
    for key in obj.keys() {
        if !ProtectedTable::Employee.editable_columns().contains(&key.as_str()) {
            return Err(ApiError::InvalidInput(format!(
                "Field '{}' is not editable on employee",
                key
            )));
        }
    }

    let request = file_request(
        pool.get_ref(),
        ProtectedTable::Employee,
        employee_id,
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
Delete employee (Admin direct, HR via request)
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Deleted directly (admin)"),
        (status = 202, description = "Change request filed (HR)"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let employee_id = path.into_inner();

    if auth.is_admin() {
        let result = sqlx::query(r#"DELETE FROM employees WHERE id = ?"#)
            .bind(employee_id)
            .execute(pool.get_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Employee not found".into()));
        }
        return Ok(HttpResponse::Ok().json(json!({ "message": "Employee deleted" })));
    }

    auth.require(&[Role::Hr])?;

    let request = file_request(
        pool.get_ref(),
        ProtectedTable::Employee,
        employee_id,
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
