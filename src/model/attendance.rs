use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[sqlx(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Pending,
    Approved,
    Rejected,
}

/// One calendar-day record for one employee.
/// session_count: 0 absent, 1 present, 2 weekly-off/holiday duty (double credit).
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-03-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = 1)]
    pub session_count: u8,

    #[schema(example = "approved")]
    pub status: AttendanceStatus,

    /// "supervisor" when the row came in through a supervisor submission
    #[schema(example = "supervisor", nullable = true)]
    pub submitted_by: Option<String>,
}
