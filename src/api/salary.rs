use crate::api::change_request::file_request;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::change_request::{ProtectedTable, RequestAction};
use crate::model::employee::Employee;
use crate::model::role::Role;
use crate::model::salary::Salary;
use crate::utils::period::month_window;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const PAYROLL_ROLES: &[Role] = &[Role::Admin, Role::Accountant];

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayrollDto {
    #[schema(example = 3)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SalaryFilter {
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
}

/// Payroll arithmetic: monthly rate over a fixed 30-day divisor, deductions
/// subtracted in full. Net pay is not clamped at zero.
pub fn compute_pay(rate_per_month: f64, total_sessions: i64, deductions: f64) -> (f64, f64) {
    let rate_per_day = rate_per_month / 30.0;
    let basic_amount = rate_per_day * total_sessions as f64;
    let net_pay = basic_amount - deductions;
    (basic_amount, net_pay)
}

/* =========================
Generate salaries for a period
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/salaries/generate",
    request_body = GeneratePayrollDto,
    responses(
        (status = 201, description = "One salary snapshot per employee", body = Vec<Salary>),
        (status = 400, description = "Invalid period"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn generate_salaries(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GeneratePayrollDto>,
) -> Result<impl Responder, ApiError> {
    auth.require(PAYROLL_ROLES)?;

    let (window_start, window_end) = month_window(payload.month, payload.year)?;

    let employees = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, category, client_id, rate_per_month, phone, joined_on
        FROM employees
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    let mut generated = Vec::with_capacity(employees.len());

    for employee in &employees {
        // Only approved attendance counts toward pay.
        let total_sessions = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT CAST(COALESCE(SUM(session_count), 0) AS SIGNED)
            FROM attendance
            WHERE employee_id = ?
            AND status = 'approved'
            AND date >= ? AND date < ?
            "#,
        )
        .bind(employee.id)
        .bind(window_start)
        .bind(window_end)
        .fetch_one(pool.get_ref())
        .await?;

        // Deductions are all-time, not period-scoped.
        let deductions = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT CAST(COALESCE(SUM(amount), 0) AS DOUBLE)
            FROM deductions
            WHERE employee_id = ?
            "#,
        )
        .bind(employee.id)
        .fetch_one(pool.get_ref())
        .await?;

        let (basic_amount, net_pay) = compute_pay(employee.rate_per_month, total_sessions, deductions);

        let result = sqlx::query(
            r#"
            INSERT INTO salaries (employee_id, month, year, basic_amount, deductions, net_pay)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee.id)
        .bind(payload.month)
        .bind(payload.year)
        .bind(basic_amount)
        .bind(deductions)
        .bind(net_pay)
        .execute(pool.get_ref())
        .await?;

        generated.push(Salary {
            id: result.last_insert_id(),
            employee_id: employee.id,
            month: payload.month,
            year: payload.year,
            basic_amount,
            deductions,
            net_pay,
        });
    }

    info!(
        month = payload.month,
        year = payload.year,
        count = generated.len(),
        "Salaries generated"
    );

    Ok(HttpResponse::Created().json(generated))
}

/* =========================
List salaries
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/salaries",
    params(SalaryFilter),
    responses(
        (status = 200, description = "Salary snapshots, newest first", body = Vec<Salary>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_salaries(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SalaryFilter>,
) -> Result<impl Responder, ApiError> {
    auth.require(&[Role::Admin, Role::Accountant, Role::Hr])?;

    let salaries = match query.employee_id {
        Some(employee_id) => {
            sqlx::query_as::<_, Salary>(
                r#"
                SELECT id, employee_id, month, year, basic_amount, deductions, net_pay
                FROM salaries
                WHERE employee_id = ?
                ORDER BY id DESC
                "#,
            )
            .bind(employee_id)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, Salary>(
                r#"
                SELECT id, employee_id, month, year, basic_amount, deductions, net_pay
                FROM salaries
                ORDER BY id DESC
                "#,
            )
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(salaries))
}

/* =========================
Delete salary (Admin direct, Accountant via request)
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/salaries/{salary_id}",
    params(
        ("salary_id" = u64, Path, description = "Salary snapshot ID")
    ),
    responses(
        (status = 200, description = "Deleted directly (admin)"),
        (status = 202, description = "Change request filed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Salary not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn delete_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let salary_id = path.into_inner();

    if auth.is_admin() {
        let result = sqlx::query(r#"DELETE FROM salaries WHERE id = ?"#)
            .bind(salary_id)
            .execute(pool.get_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Salary not found".into()));
        }
        return Ok(HttpResponse::Ok().json(json!({ "message": "Salary deleted" })));
    }

    auth.require(&[Role::Accountant])?;

    let request = file_request(
        pool.get_ref(),
        ProtectedTable::Salary,
        salary_id,
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
    fn march_example_pays_four_units() {
        // rate 3000/month, approved sessions 1 + 1 + 2
        let (basic, net) = compute_pay(3000.0, 4, 0.0);
        assert_eq!(basic, 400.0);
        assert_eq!(net, 400.0);
    }

    #[test]
    fn deductions_come_off_net_pay() {
        let (basic, net) = compute_pay(3000.0, 30, 500.0);
        assert_eq!(basic, 3000.0);
        assert_eq!(net, 2500.0);
    }

    #[test]
    fn net_pay_may_go_negative() {
        let (basic, net) = compute_pay(3000.0, 1, 500.0);
        assert_eq!(basic, 100.0);
        assert_eq!(net, -400.0);
    }

    #[test]
    fn zero_sessions_zero_basic() {
        let (basic, net) = compute_pay(4500.0, 0, 0.0);
        assert_eq!(basic, 0.0);
        assert_eq!(net, 0.0);
    }
}
