use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;

/// Per-category billing line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceLine {
    #[schema(example = "security guard")]
    pub category: String,

    /// Summed approved session units across the category's employees
    #[schema(example = 30)]
    pub qty: i64,

    /// rate_per_month / 30
    #[schema(example = 40.0)]
    pub rate: f64,

    #[schema(example = 1200.0)]
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Invoice {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub client_id: u64,

    #[schema(example = 3)]
    pub month: u32,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(value_type = Vec<InvoiceLine>)]
    pub lines: Json<Vec<InvoiceLine>>,

    /// Grand total including CGST and SGST
    #[schema(example = 1416.0)]
    pub total_amount: f64,
}
