use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 3,
        "name": "Ramesh Kumar",
        "category": "security guard",
        "client_id": 1,
        "rate_per_month": 3000.0,
        "phone": "+919812345678",
        "joined_on": "2024-01-01"
    })
)]
pub struct Employee {
    #[schema(example = 3)]
    pub id: u64,

    #[schema(example = "Ramesh Kumar")]
    pub name: String,

    /// Rate class; must match a category name on the assigned client
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
