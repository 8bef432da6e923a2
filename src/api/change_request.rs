use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::change_request::{ChangeRequest, ProtectedTable, RequestAction};
use crate::model::role::Role;
use crate::utils::db_utils::{build_update_sql, execute_update};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::types::Json;
use sqlx::{MySqlConnection, MySqlPool};
use std::str::FromStr;
use tracing::info;
use utoipa::ToSchema;

/// Roles that file change requests instead of mutating protected rows.
const REQUESTER_ROLES: &[Role] = &[Role::Hr, Role::Accountant, Role::Supervisor];

#[derive(Deserialize, ToSchema)]
pub struct SubmitRequestDto {
    #[schema(example = "employee")]
    pub table_name: String,

    #[schema(example = 3)]
    pub row_id: u64,

    #[schema(example = "edit")]
    pub action: RequestAction,

    /// Field→new-value map, required for edit, ignored for delete
    #[schema(value_type = Object, nullable = true)]
    pub payload: Option<Value>,
}

/// Submit-time validation: unknown tables, unsupported actions, and bad
/// payloads fail fast here instead of surfacing at approval.
fn validate_submission(
    table_name: &str,
    action: RequestAction,
    payload: Option<&Value>,
) -> Result<(ProtectedTable, Option<Value>), ApiError> {
    let table = ProtectedTable::from_str(table_name).map_err(|_| {
        ApiError::InvalidInput(format!("'{}' is not a protected entity", table_name))
    })?;

    match action {
        RequestAction::Delete => Ok((table, None)),
        RequestAction::Edit => {
            if !table.supports_edit() {
                return Err(ApiError::InvalidInput(format!(
                    "Edit requests are not supported for {}",
                    table
                )));
            }
            let payload = payload
                .ok_or_else(|| ApiError::InvalidInput("Edit requires a payload".into()))?;
            let obj = payload
                .as_object()
                .ok_or_else(|| ApiError::InvalidInput("Payload must be a JSON object".into()))?;
            if obj.is_empty() {
                return Err(ApiError::InvalidInput("Payload must not be empty".into()));
            }
            for key in obj.keys() {
                if !table.editable_columns().contains(&key.as_str()) {
                    return Err(ApiError::InvalidInput(format!(
                        "Field '{}' is not editable on {}",
                        key, table
                    )));
                }
            }
            Ok((table, Some(payload.clone())))
        }
    }
}

async fn fetch_request(pool: &MySqlPool, id: u64) -> Result<Option<ChangeRequest>, ApiError> {
    let req = sqlx::query_as::<_, ChangeRequest>(
        r#"
        SELECT id, table_name, row_id, action, requester_id, payload, status
        FROM change_requests
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(req)
}

/// Persists a pending request. Shared with the attendance/employee/client
/// handlers that divert non-admin mutations here.
pub async fn file_request(
    pool: &MySqlPool,
    table: ProtectedTable,
    row_id: u64,
    action: RequestAction,
    requester_id: u64,
    payload: Option<Value>,
) -> Result<ChangeRequest, ApiError> {
    let result = sqlx::query(
        r#"
        INSERT INTO change_requests (table_name, row_id, action, requester_id, payload, status)
        VALUES (?, ?, ?, ?, ?, 'pending')
        "#,
    )
    .bind(table.to_string())
    .bind(row_id)
    .bind(action)
    .bind(requester_id)
    .bind(payload.map(Json))
    .execute(pool)
    .await?;

    let created = fetch_request(pool, result.last_insert_id())
        .await?
        .ok_or(ApiError::Database)?;

    info!(
        request_id = created.id,
        table = %table,
        row_id,
        action = %action,
        requester_id,
        "Change request filed"
    );

    Ok(created)
}

/// Applies the approved mutation through the registry. Runs inside the
/// approval transaction; any error here rolls the status flip back.
async fn apply_mutation(
    conn: &mut MySqlConnection,
    table: ProtectedTable,
    row_id: u64,
    action: RequestAction,
    payload: Option<&Value>,
) -> Result<(), ApiError> {
    match action {
        RequestAction::Delete => {
            let sql = format!("DELETE FROM {} WHERE id = ?", table.sql_table());
            let result = sqlx::query(&sql).bind(row_id).execute(conn).await?;
            if result.rows_affected() == 0 {
                return Err(ApiError::NotFound(format!(
                    "{} {} no longer exists",
                    table, row_id
                )));
            }
        }
        RequestAction::Edit => {
            let payload = payload
                .ok_or_else(|| ApiError::InvalidInput("Edit request has no payload".into()))?;
            let update = build_update_sql(
                table.sql_table(),
                payload,
                table.editable_columns(),
                "id",
                row_id,
            )?;
            let affected = execute_update(conn, update).await?;
            if affected == 0 {
                return Err(ApiError::NotFound(format!(
                    "{} {} no longer exists",
                    table, row_id
                )));
            }
        }
    }
    Ok(())
}

/* =========================
Submit change request
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    request_body = SubmitRequestDto,
    responses(
        (status = 201, description = "Change request filed", body = ChangeRequest),
        (status = 400, description = "Unknown table, unsupported action or bad payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "ChangeRequest"
)]
pub async fn submit_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<SubmitRequestDto>,
) -> Result<impl Responder, ApiError> {
    if auth.is_admin() {
        return Err(ApiError::Forbidden(
            "Admins apply edits and deletes directly".into(),
        ));
    }
    auth.require(REQUESTER_ROLES)?;

    let (table, edit_payload) =
        validate_submission(&payload.table_name, payload.action, payload.payload.as_ref())?;

    let created = file_request(
        pool.get_ref(),
        table,
        payload.row_id,
        payload.action,
        auth.user_id,
        edit_payload,
    )
    .await?;

    Ok(HttpResponse::Created().json(created))
}

/* =========================
List change requests
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    responses(
        (status = 200, description = "Change requests, newest first (admin: all, others: own)",
         body = Vec<ChangeRequest>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "ChangeRequest"
)]
pub async fn list_requests(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    let requests = if auth.is_admin() {
        sqlx::query_as::<_, ChangeRequest>(
            r#"
            SELECT id, table_name, row_id, action, requester_id, payload, status
            FROM change_requests
            ORDER BY id DESC
            "#,
        )
        .fetch_all(pool.get_ref())
        .await?
    } else {
        sqlx::query_as::<_, ChangeRequest>(
            r#"
            SELECT id, table_name, row_id, action, requester_id, payload, status
            FROM change_requests
            WHERE requester_id = ?
            ORDER BY id DESC
            "#,
        )
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await?
    };

    Ok(HttpResponse::Ok().json(requests))
}

/* =========================
Approve change request (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/requests/{request_id}/approve",
    params(
        ("request_id" = u64, Path, description = "ID of the change request to approve")
    ),
    responses(
        (status = 200, description = "Mutation applied and request approved", body = Object,
         example = json!({"applied": true})),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request or target row not found"),
        (status = 409, description = "Request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "ChangeRequest"
)]
pub async fn approve_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_admin()?;

    let request_id = path.into_inner();

    let request = fetch_request(pool.get_ref(), request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Change request not found".into()))?;

    // Stored rows predate the submit-time registry only if someone wrote the
    // table directly; treat that as bad input rather than panicking.
    let table = ProtectedTable::from_str(&request.table_name).map_err(|_| {
        ApiError::InvalidInput(format!(
            "'{}' is not a protected entity",
            request.table_name
        ))
    })?;

    let mut tx = pool.begin().await?;

    // Compare-and-swap: only a pending request may be approved. Zero rows
    // means a concurrent or repeated approval got there first; nothing is
    // reapplied.
    let flipped = sqlx::query(
        r#"
        UPDATE change_requests
        SET status = 'approved'
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    if flipped.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "Change request already processed".into(),
        ));
    }

    // Same transaction as the flip: a failed mutation rolls everything back
    // and the request stays pending.
    apply_mutation(
        &mut *tx,
        table,
        request.row_id,
        request.action,
        request.payload.as_ref().map(|p| &p.0),
    )
    .await?;

    tx.commit().await?;

    info!(request_id, table = %table, row_id = request.row_id, "Change request approved");

    Ok(HttpResponse::Ok().json(json!({ "applied": true })))
}

/* =========================
Reject change request (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/requests/{request_id}/reject",
    params(
        ("request_id" = u64, Path, description = "ID of the change request to reject")
    ),
    responses(
        (status = 200, description = "Request rejected, target untouched", body = Object,
         example = json!({"ok": true})),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "ChangeRequest"
)]
pub async fn reject_request(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_admin()?;

    let request_id = path.into_inner();

    if fetch_request(pool.get_ref(), request_id).await?.is_none() {
        return Err(ApiError::NotFound("Change request not found".into()));
    }

    let result = sqlx::query(
        r#"
        UPDATE change_requests
        SET status = 'rejected'
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(request_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::Conflict(
            "Change request already processed".into(),
        ));
    }

    info!(request_id, "Change request rejected");

    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_accepts_and_discards_payload() {
        let (table, payload) = validate_submission(
            "client",
            RequestAction::Delete,
            Some(&json!({"ignored": true})),
        )
        .unwrap();
        assert_eq!(table, ProtectedTable::Client);
        assert!(payload.is_none());
    }

    #[test]
    fn edit_requires_non_empty_object_payload() {
        assert!(matches!(
            validate_submission("employee", RequestAction::Edit, None),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_submission("employee", RequestAction::Edit, Some(&json!({}))),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_submission("employee", RequestAction::Edit, Some(&json!(["name"]))),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn edit_payload_keys_must_be_whitelisted() {
        let ok = validate_submission(
            "employee",
            RequestAction::Edit,
            Some(&json!({"name": "X"})),
        );
        assert!(ok.is_ok());

        let err = validate_submission(
            "employee",
            RequestAction::Edit,
            Some(&json!({"id": 99})),
        );
        assert!(matches!(err, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn edit_rejected_for_derived_snapshots() {
        for table in ["invoice", "salary"] {
            let err = validate_submission(
                table,
                RequestAction::Edit,
                Some(&json!({"total_amount": 0})),
            );
            assert!(matches!(err, Err(ApiError::InvalidInput(_))));
        }
        // deletes of the same tables are fine
        assert!(validate_submission("invoice", RequestAction::Delete, None).is_ok());
        assert!(validate_submission("salary", RequestAction::Delete, None).is_ok());
    }

    #[test]
    fn unknown_table_fails_at_submit_time() {
        let err = validate_submission("deduction", RequestAction::Delete, None);
        assert!(matches!(err, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn table_names_are_case_insensitive() {
        let (table, _) = validate_submission("Attendance", RequestAction::Delete, None).unwrap();
        assert_eq!(table, ProtectedTable::Attendance);
    }
}
