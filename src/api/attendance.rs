use crate::api::change_request::file_request;
use crate::auth::auth::AuthUser;
use crate::error::{ApiError, is_duplicate_key};
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::change_request::{ProtectedTable, RequestAction};
use crate::model::role::Role;
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const CREATE_ROLES: &[Role] = &[Role::Admin, Role::Hr, Role::Accountant, Role::Supervisor];
const REVIEW_ROLES: &[Role] = &[Role::Hr, Role::Admin];

#[derive(Deserialize, ToSchema)]
pub struct CreateAttendance {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-03-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    /// 0 absent, 1 present, 2 weekly-off/holiday duty
    #[schema(example = 1)]
    pub session_count: u8,

    #[schema(example = "supervisor", nullable = true)]
    pub submitted_by: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    /// Exact-match status filter
    #[schema(example = "approved")]
    pub status: Option<AttendanceStatus>,
}

#[derive(Serialize, ToSchema)]
pub struct BulkRowResult {
    #[schema(example = 0)]
    pub index: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendance: Option<Attendance>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Duplicate attendance for this employee and date", nullable = true)]
    pub error: Option<String>,
}

/// Status decision rule, applied in precedence order:
/// 1. supervisor submission marker → pending
/// 2. HR or Admin actor → approved
/// 3. anyone else → pending
pub fn resolve_status(submitted_by: Option<&str>, actor: Role) -> AttendanceStatus {
    if submitted_by.is_some_and(|s| s.eq_ignore_ascii_case("supervisor")) {
        return AttendanceStatus::Pending;
    }
    if matches!(actor, Role::Hr | Role::Admin) {
        return AttendanceStatus::Approved;
    }
    AttendanceStatus::Pending
}

async fn insert_row(
    pool: &MySqlPool,
    row: &CreateAttendance,
    actor: Role,
) -> Result<Attendance, ApiError> {
    if row.session_count > 2 {
        return Err(ApiError::InvalidInput(
            "session_count must be 0, 1 or 2".into(),
        ));
    }

    let employee_exists = sqlx::query_scalar::<_, i64>(
        r#"SELECT EXISTS(SELECT 1 FROM employees WHERE id = ? LIMIT 1)"#,
    )
    .bind(row.employee_id)
    .fetch_one(pool)
    .await?;

    if employee_exists == 0 {
        return Err(ApiError::NotFound(format!(
            "Employee {} not found",
            row.employee_id
        )));
    }

    let status = resolve_status(row.submitted_by.as_deref(), actor);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, session_count, status, submitted_by)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(row.employee_id)
    .bind(row.date)
    .bind(row.session_count)
    .bind(status)
    .bind(&row.submitted_by)
    .execute(pool)
    .await
    .map_err(|e| {
        // Unique key on (employee_id, date): a second row for the same day
        // would double-count sessions in both aggregators.
        if is_duplicate_key(&e) {
            ApiError::Conflict("Duplicate attendance for this employee and date".into())
        } else {
            ApiError::from(e)
        }
    })?;

    let created = sqlx::query_as::<_, Attendance>(
        r#"
        SELECT id, employee_id, date, session_count, status, submitted_by
        FROM attendance
        WHERE id = ?
        "#,
    )
    .bind(result.last_insert_id())
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/* =========================
Create attendance
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 201, description = "Attendance recorded with resolved status", body = Attendance),
        (status = 400, description = "Invalid session count or date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Duplicate day for this employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn create_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAttendance>,
) -> Result<impl Responder, ApiError> {
    auth.require(CREATE_ROLES)?;

    let created = insert_row(pool.get_ref(), &payload, auth.role).await?;

    info!(
        attendance_id = created.id,
        employee_id = created.employee_id,
        status = %created.status,
        "Attendance recorded"
    );

    Ok(HttpResponse::Created().json(created))
}

/* =========================
Bulk create attendance
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/attendance/bulk",
    request_body = Vec<CreateAttendance>,
    responses(
        (status = 200, description = "Per-row results in input order", body = Vec<BulkRowResult>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn create_attendance_bulk(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<Vec<CreateAttendance>>,
) -> Result<impl Responder, ApiError> {
    auth.require(CREATE_ROLES)?;

    // Rows are processed sequentially; each row's status is resolved
    // independently and failures are reported per row, not batch-fatal.
    let mut results = Vec::with_capacity(payload.len());
    for (index, row) in payload.iter().enumerate() {
        match insert_row(pool.get_ref(), row, auth.role).await {
            Ok(attendance) => results.push(BulkRowResult {
                index,
                attendance: Some(attendance),
                error: None,
            }),
            Err(e) => results.push(BulkRowResult {
                index,
                attendance: None,
                error: Some(e.to_string()),
            }),
        }
    }

    Ok(HttpResponse::Ok().json(results))
}

async fn set_status(
    pool: &MySqlPool,
    id: u64,
    status: AttendanceStatus,
) -> Result<(), ApiError> {
    // Last-write-wins on the plain status flag; re-approving is idempotent.
    let result = sqlx::query(r#"UPDATE attendance SET status = ? WHERE id = ?"#)
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Attendance record not found".into()));
    }
    Ok(())
}

/* =========================
Approve attendance (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}/approve",
    params(
        ("attendance_id" = u64, Path, description = "ID of the attendance record")
    ),
    responses(
        (status = 200, description = "Attendance approved", body = Object,
         example = json!({"message": "Attendance approved"})),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn approve_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require(REVIEW_ROLES)?;
    set_status(pool.get_ref(), path.into_inner(), AttendanceStatus::Approved).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Attendance approved" })))
}

/* =========================
Reject attendance (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}/reject",
    params(
        ("attendance_id" = u64, Path, description = "ID of the attendance record")
    ),
    responses(
        (status = 200, description = "Attendance rejected", body = Object,
         example = json!({"message": "Attendance rejected"})),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn reject_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require(REVIEW_ROLES)?;
    set_status(pool.get_ref(), path.into_inner(), AttendanceStatus::Rejected).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Attendance rejected" })))
}

/* =========================
List attendance
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Attendance records ascending by date", body = Vec<Attendance>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> Result<impl Responder, ApiError> {
    let records = match query.status {
        Some(status) => {
            sqlx::query_as::<_, Attendance>(
                r#"
                SELECT id, employee_id, date, session_count, status, submitted_by
                FROM attendance
                WHERE status = ?
                ORDER BY date ASC
                "#,
            )
            .bind(status)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, Attendance>(
                r#"
                SELECT id, employee_id, date, session_count, status, submitted_by
                FROM attendance
                ORDER BY date ASC
                "#,
            )
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(records))
}

/* =========================
Edit attendance (Admin direct, HR via request)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "ID of the attendance record")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Updated directly (admin)"),
        (status = 202, description = "Change request filed (HR)", body = Object,
         example = json!({"message": "Change request filed", "status": "pending"})),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<impl Responder, ApiError> {
    let attendance_id = path.into_inner();

    if auth.is_admin() {
        let update = build_update_sql(
            ProtectedTable::Attendance.sql_table(),
            &body,
            ProtectedTable::Attendance.editable_columns(),
            "id",
            attendance_id,
        )?;
        let mut conn = pool.acquire().await?;
        let affected = execute_update(&mut conn, update).await?;
        if affected == 0 {
            return Err(ApiError::NotFound("Attendance record not found".into()));
        }
        return Ok(HttpResponse::Ok().json(json!({ "message": "Attendance updated" })));
    }

    // HR never mutates attendance directly; the intent becomes a pending
    // change request for admin review.
    auth.require(&[Role::Hr])?;

    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::InvalidInput("Payload must be a JSON object".into()))?;
    if obj.is_empty() {
        return Err(ApiError::InvalidInput("Payload must not be empty".into()));
    }

    let request = file_request(
        pool.get_ref(),
        ProtectedTable::Attendance,
        attendance_id,
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
Delete attendance (Admin direct, HR via request)
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "ID of the attendance record")
    ),
    responses(
        (status = 200, description = "Deleted directly (admin)"),
        (status = 202, description = "Change request filed (HR)"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let attendance_id = path.into_inner();

    if auth.is_admin() {
        let result = sqlx::query(r#"DELETE FROM attendance WHERE id = ?"#)
            .bind(attendance_id)
            .execute(pool.get_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Attendance record not found".into()));
        }
        return Ok(HttpResponse::Ok().json(json!({ "message": "Attendance deleted" })));
    }

    auth.require(&[Role::Hr])?;

    let request = file_request(
        pool.get_ref(),
        ProtectedTable::Attendance,
        attendance_id,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supervisor_marker_always_pends() {
        for role in [Role::Admin, Role::Hr, Role::Accountant, Role::Supervisor] {
            assert_eq!(
                resolve_status(Some("supervisor"), role),
                AttendanceStatus::Pending
            );
        }
        // marker comparison is case-insensitive
        assert_eq!(
            resolve_status(Some("SUPERVISOR"), Role::Admin),
            AttendanceStatus::Pending
        );
        assert_eq!(
            resolve_status(Some("Supervisor"), Role::Hr),
            AttendanceStatus::Pending
        );
    }

    #[test]
    fn hr_and_admin_auto_approve_without_marker() {
        assert_eq!(resolve_status(None, Role::Hr), AttendanceStatus::Approved);
        assert_eq!(resolve_status(None, Role::Admin), AttendanceStatus::Approved);
        // a non-supervisor marker does not block auto-approval
        assert_eq!(
            resolve_status(Some("hr desk"), Role::Admin),
            AttendanceStatus::Approved
        );
    }

    #[test]
    fn other_roles_pend_by_default() {
        assert_eq!(
            resolve_status(None, Role::Accountant),
            AttendanceStatus::Pending
        );
        assert_eq!(
            resolve_status(None, Role::Supervisor),
            AttendanceStatus::Pending
        );
    }
}
