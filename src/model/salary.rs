use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Immutable payroll snapshot; regeneration appends rather than overwrites.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Salary {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = 3)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(example = 400.0)]
    pub basic_amount: f64,

    #[schema(example = 100.0)]
    pub deductions: f64,

    /// May be negative when deductions exceed the basic amount
    #[schema(example = 300.0)]
    pub net_pay: f64,
}
