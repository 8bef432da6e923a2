use crate::api::change_request::file_request;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::change_request::{ProtectedTable, RequestAction};
use crate::model::client::{Client, ClientCategory};
use crate::model::invoice::{Invoice, InvoiceLine};
use crate::model::role::Role;
use crate::utils::period::month_window;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use sqlx::types::Json;
use std::collections::BTreeMap;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const BILLING_ROLES: &[Role] = &[Role::Admin, Role::Accountant];

/// Fallback GST percentage when a client carries no explicit rate.
const DEFAULT_GST_RATE: f64 = 9.0;

#[derive(Deserialize, ToSchema)]
pub struct GenerateInvoiceDto {
    #[schema(example = 1)]
    pub client_id: u64,

    #[schema(example = 3)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct InvoiceFilter {
    #[schema(example = 1)]
    pub client_id: Option<u64>,
}

/// Day-of-month → session count for one employee; feeds the rendered
/// attendance chart only, never the financial totals.
#[derive(Serialize, ToSchema)]
pub struct EmployeeChart {
    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "Ramesh Kumar")]
    pub name: String,

    #[schema(value_type = Object)]
    pub days: BTreeMap<u32, i64>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryBreakdown {
    #[schema(example = "security guard")]
    pub category: String,

    #[schema(example = 30)]
    pub qty: i64,

    #[schema(example = 40.0)]
    pub rate: f64,

    #[schema(example = 1200.0)]
    pub amount: f64,

    pub employees: Vec<EmployeeChart>,
}

/// Structured output handed to the external PDF renderer. The invoice row
/// is already committed by the time this is returned.
#[derive(Serialize, ToSchema)]
pub struct InvoiceBreakdown {
    #[schema(example = 1)]
    pub invoice_id: u64,

    pub client: Client,

    #[schema(example = 3)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,

    pub categories: Vec<CategoryBreakdown>,

    #[schema(example = 1200.0)]
    pub subtotal: f64,

    #[schema(example = 9.0)]
    pub cgst_rate: f64,

    #[schema(example = 108.0)]
    pub cgst_amount: f64,

    #[schema(example = 9.0)]
    pub sgst_rate: f64,

    #[schema(example = 108.0)]
    pub sgst_amount: f64,

    #[schema(example = 1416.0)]
    pub grand_total: f64,
}

pub fn category_line(name: &str, rate_per_month: f64, qty: i64) -> InvoiceLine {
    let rate = rate_per_month / 30.0;
    InvoiceLine {
        category: name.to_string(),
        qty,
        rate,
        amount: rate * qty as f64,
    }
}

pub struct GstTotals {
    pub cgst_rate: f64,
    pub cgst_amount: f64,
    pub sgst_rate: f64,
    pub sgst_amount: f64,
    pub grand_total: f64,
}

pub fn gst_totals(subtotal: f64, cgst_rate: Option<f64>, sgst_rate: Option<f64>) -> GstTotals {
    let cgst_rate = cgst_rate.unwrap_or(DEFAULT_GST_RATE);
    let sgst_rate = sgst_rate.unwrap_or(DEFAULT_GST_RATE);
    let cgst_amount = subtotal * (cgst_rate / 100.0);
    let sgst_amount = subtotal * (sgst_rate / 100.0);
    GstTotals {
        cgst_rate,
        cgst_amount,
        sgst_rate,
        sgst_amount,
        grand_total: subtotal + cgst_amount + sgst_amount,
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    date: NaiveDate,
    session_count: u8,
}

/* =========================
Generate invoice for a client/period
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/invoices/generate",
    request_body = GenerateInvoiceDto,
    responses(
        (status = 201, description = "Invoice persisted; structured breakdown for rendering",
         body = InvoiceBreakdown),
        (status = 400, description = "Invalid period"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Client not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn generate_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GenerateInvoiceDto>,
) -> Result<impl Responder, ApiError> {
    auth.require(BILLING_ROLES)?;

    let (window_start, window_end) = month_window(payload.month, payload.year)?;

    let client = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, name, address, gstin, cgst_rate, sgst_rate, igst_rate
        FROM clients
        WHERE id = ?
        "#,
    )
    .bind(payload.client_id)
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
    .bind(client.id)
    .fetch_all(pool.get_ref())
    .await?;

    let mut lines = Vec::with_capacity(categories.len());
    let mut breakdowns = Vec::with_capacity(categories.len());
    let mut subtotal = 0.0;

    for category in &categories {
        // Employees are matched by category name scoped to this client, so a
        // coincidental name on another client's roster never bills here.
        let employees = sqlx::query_as::<_, (u64, String)>(
            r#"
            SELECT id, name
            FROM employees
            WHERE client_id = ? AND category = ?
            ORDER BY id ASC
            "#,
        )
        .bind(client.id)
        .bind(&category.name)
        .fetch_all(pool.get_ref())
        .await?;

        let mut qty: i64 = 0;
        let mut charts = Vec::with_capacity(employees.len());

        for (employee_id, name) in employees {
            let rows = sqlx::query_as::<_, SessionRow>(
                r#"
                SELECT date, session_count
                FROM attendance
                WHERE employee_id = ?
                AND status = 'approved'
                AND date >= ? AND date < ?
                ORDER BY date ASC
                "#,
            )
            .bind(employee_id)
            .bind(window_start)
            .bind(window_end)
            .fetch_all(pool.get_ref())
            .await?;

            let mut days = BTreeMap::new();
            for row in rows {
                qty += row.session_count as i64;
                days.insert(row.date.day(), row.session_count as i64);
            }

            charts.push(EmployeeChart {
                employee_id,
                name,
                days,
            });
        }

        let line = category_line(&category.name, category.rate_per_month, qty);
        subtotal += line.amount;

        breakdowns.push(CategoryBreakdown {
            category: line.category.clone(),
            qty: line.qty,
            rate: line.rate,
            amount: line.amount,
            employees: charts,
        });
        lines.push(line);
    }

    let totals = gst_totals(subtotal, client.cgst_rate, client.sgst_rate);

    let result = sqlx::query(
        r#"
        INSERT INTO invoices (client_id, month, year, lines, total_amount)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(client.id)
    .bind(payload.month)
    .bind(payload.year)
    .bind(Json(&lines))
    .bind(totals.grand_total)
    .execute(pool.get_ref())
    .await?;

    info!(
        invoice_id = result.last_insert_id(),
        client_id = client.id,
        month = payload.month,
        year = payload.year,
        grand_total = totals.grand_total,
        "Invoice generated"
    );

    Ok(HttpResponse::Created().json(InvoiceBreakdown {
        invoice_id: result.last_insert_id(),
        client,
        month: payload.month,
        year: payload.year,
        categories: breakdowns,
        subtotal,
        cgst_rate: totals.cgst_rate,
        cgst_amount: totals.cgst_amount,
        sgst_rate: totals.sgst_rate,
        sgst_amount: totals.sgst_amount,
        grand_total: totals.grand_total,
    }))
}

/* =========================
List invoices
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    params(InvoiceFilter),
    responses(
        (status = 200, description = "Invoices, newest first", body = Vec<Invoice>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn list_invoices(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<InvoiceFilter>,
) -> Result<impl Responder, ApiError> {
    auth.require(BILLING_ROLES)?;

    let invoices = match query.client_id {
        Some(client_id) => {
            sqlx::query_as::<_, Invoice>(
                r#"
                SELECT id, client_id, month, year, lines, total_amount
                FROM invoices
                WHERE client_id = ?
                ORDER BY id DESC
                "#,
            )
            .bind(client_id)
            .fetch_all(pool.get_ref())
            .await?
        }
        None => {
            sqlx::query_as::<_, Invoice>(
                r#"
                SELECT id, client_id, month, year, lines, total_amount
                FROM invoices
                ORDER BY id DESC
                "#,
            )
            .fetch_all(pool.get_ref())
            .await?
        }
    };

    Ok(HttpResponse::Ok().json(invoices))
}

/* =========================
Delete invoice (Admin direct, Accountant via request)
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/invoices/{invoice_id}",
    params(
        ("invoice_id" = u64, Path, description = "Invoice ID")
    ),
    responses(
        (status = 200, description = "Deleted directly (admin)"),
        (status = 202, description = "Change request filed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoice"
)]
pub async fn delete_invoice(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    let invoice_id = path.into_inner();

    if auth.is_admin() {
        let result = sqlx::query(r#"DELETE FROM invoices WHERE id = ?"#)
            .bind(invoice_id)
            .execute(pool.get_ref())
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Invoice not found".into()));
        }
        return Ok(HttpResponse::Ok().json(json!({ "message": "Invoice deleted" })));
    }

    auth.require(&[Role::Accountant])?;

    let request = file_request(
        pool.get_ref(),
        ProtectedTable::Invoice,
        invoice_id,
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

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn category_line_uses_thirty_day_divisor() {
        let line = category_line("security guard", 1200.0, 30);
        assert!(close(line.rate, 40.0));
        assert!(close(line.amount, 1200.0));
        assert_eq!(line.qty, 30);
    }

    #[test]
    fn empty_category_bills_zero_but_keeps_rate() {
        let line = category_line("gunman", 2400.0, 0);
        assert!(close(line.rate, 80.0));
        assert!(close(line.amount, 0.0));
    }

    #[test]
    fn gst_grand_total_is_subtotal_plus_both_taxes() {
        // two employees at 20 + 10 approved sessions, rate class 1200/month
        let line = category_line("security guard", 1200.0, 30);
        let totals = gst_totals(line.amount, Some(9.0), Some(9.0));
        assert!(close(totals.cgst_amount, 108.0));
        assert!(close(totals.sgst_amount, 108.0));
        assert!(close(totals.grand_total, 1416.0));
    }

    #[test]
    fn gst_rates_default_to_nine_percent() {
        let totals = gst_totals(1000.0, None, None);
        assert!(close(totals.cgst_rate, 9.0));
        assert!(close(totals.sgst_rate, 9.0));
        assert!(close(totals.grand_total, 1180.0));
    }

    #[test]
    fn asymmetric_rates_apply_independently() {
        let totals = gst_totals(1000.0, Some(2.5), Some(7.5));
        assert!(close(totals.cgst_amount, 25.0));
        assert!(close(totals.sgst_amount, 75.0));
        assert!(close(totals.grand_total, 1100.0));
    }
}
