use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::deduction::Deduction;
use crate::model::role::Role;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

// Deductions are not a protected entity; their owners mutate directly.
const DEDUCTION_ROLES: &[Role] = &[Role::Admin, Role::Accountant];

#[derive(Deserialize, ToSchema)]
pub struct CreateDeduction {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "uniform advance")]
    pub name: String,

    #[schema(example = 500.0)]
    pub amount: f64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DeductionFilter {
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
}

#[utoipa::path(
    post,
    path = "/api/v1/deductions",
    request_body = CreateDeduction,
    responses(
        (status = 201, description = "Deduction created", body = Deduction),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Deduction"
)]
pub async fn create_deduction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDeduction>,
) -> Result<impl Responder, ApiError> {
    auth.require(DEDUCTION_ROLES)?;

    if payload.amount < 0.0 {
        return Err(ApiError::InvalidInput("Amount must not be negative".into()));
    }

    let employee_exists = sqlx::query_scalar::<_, i64>(
        r#"SELECT EXISTS(SELECT 1 FROM employees WHERE id = ? LIMIT 1)"#,
    )
    .bind(payload.employee_id)
    .fetch_one(pool.get_ref())
    .await?;
    if employee_exists == 0 {
        return Err(ApiError::NotFound("Employee not found".into()));
    }

    let result = sqlx::query(
        r#"INSERT INTO deductions (employee_id, name, amount) VALUES (?, ?, ?)"#,
    )
    .bind(payload.employee_id)
    .bind(&payload.name)
    .bind(payload.amount)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(Deduction {
        id: result.last_insert_id(),
        employee_id: payload.employee_id,
        name: payload.name.clone(),
        amount: payload.amount,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/deductions",
    params(DeductionFilter),
    responses(
        (status = 200, description = "Deductions, optionally per employee", body = Vec<Deduction>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Deduction"
)]
pub async fn list_deductions(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<DeductionFilter>,
) -> Result<impl Responder, ApiError> {
    auth.require(&[Role::Admin, Role::Accountant, Role::Hr])?;

    let deductions = match query.employee_id {
        Some(employee_id) => {
            sqlx::query_as::<_, Deduction>(
                r#"
                SELECT id, employee_id, name, amount
                FROM deductions
                WHERE employee_id = ?
                ORDER BY id ASC
                "#,
            )
            .bind(employee_id)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, Deduction>(
                r#"
                SELECT id, employee_id, name, amount
                FROM deductions
                ORDER BY id ASC
                "#,
            )
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(deductions))
}

#[utoipa::path(
    delete,
    path = "/api/v1/deductions/{deduction_id}",
    params(
        ("deduction_id" = u64, Path, description = "Deduction ID")
    ),
    responses(
        (status = 200, description = "Deduction deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Deduction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Deduction"
)]
pub async fn delete_deduction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require(DEDUCTION_ROLES)?;

    let deduction_id = path.into_inner();

    let result = sqlx::query(r#"DELETE FROM deductions WHERE id = ?"#)
        .bind(deduction_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Deduction not found".into()));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Deduction deleted" })))
}
