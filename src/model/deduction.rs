use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Flat deduction against an employee's net pay (advance, uniform, fine...).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Deduction {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "uniform advance")]
    pub name: String,

    #[schema(example = 500.0)]
    pub amount: f64,
}
