use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Acme Mills Ltd",
        "address": "Plot 12, Industrial Area",
        "gstin": "22AAAAA0000A1Z5",
        "cgst_rate": 9.0,
        "sgst_rate": 9.0,
        "igst_rate": 18.0
    })
)]
pub struct Client {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Acme Mills Ltd")]
    pub name: String,

    #[schema(example = "Plot 12, Industrial Area", nullable = true)]
    pub address: Option<String>,

    #[schema(example = "22AAAAA0000A1Z5", nullable = true)]
    pub gstin: Option<String>,

    /// Percent rates; invoicing falls back to 9% when absent
    #[schema(example = 9.0, nullable = true)]
    pub cgst_rate: Option<f64>,

    #[schema(example = 9.0, nullable = true)]
    pub sgst_rate: Option<f64>,

    #[schema(example = 18.0, nullable = true)]
    pub igst_rate: Option<f64>,
}

/// One entry of a client's price list (rate class).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ClientCategory {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub client_id: u64,

    #[schema(example = "security guard")]
    pub name: String,

    #[schema(example = 1200.0)]
    pub rate_per_month: f64,
}
