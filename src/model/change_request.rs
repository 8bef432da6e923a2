use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[sqlx(rename_all = "lowercase")]
pub enum RequestAction {
    Edit,
    Delete,
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[sqlx(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// Registry of entities whose edits/deletes go through admin approval.
/// Anything outside this set is rejected at submit time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProtectedTable {
    Client,
    Employee,
    Attendance,
    Invoice,
    Salary,
}

impl ProtectedTable {
    pub fn sql_table(self) -> &'static str {
        match self {
            ProtectedTable::Client => "clients",
            ProtectedTable::Employee => "employees",
            ProtectedTable::Attendance => "attendance",
            ProtectedTable::Invoice => "invoices",
            ProtectedTable::Salary => "salaries",
        }
    }

    /// Invoices and salaries are derived snapshots; only deletion is approvable.
    pub fn supports_edit(self) -> bool {
        !self.editable_columns().is_empty()
    }

    pub fn editable_columns(self) -> &'static [&'static str] {
        match self {
            ProtectedTable::Client => &[
                "name",
                "address",
                "gstin",
                "cgst_rate",
                "sgst_rate",
                "igst_rate",
            ],
            ProtectedTable::Employee => &[
                "name",
                "category",
                "client_id",
                "rate_per_month",
                "phone",
                "joined_on",
            ],
            ProtectedTable::Attendance => &["date", "session_count", "status", "submitted_by"],
            ProtectedTable::Invoice | ProtectedTable::Salary => &[],
        }
    }
}

/// A deferred mutation awaiting admin approval.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ChangeRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "employee")]
    pub table_name: String,

    #[schema(example = 3)]
    pub row_id: u64,

    #[schema(example = "edit")]
    pub action: RequestAction,

    #[schema(example = 7)]
    pub requester_id: u64,

    /// Field→new-value map; present only for edit requests
    #[schema(value_type = Object, nullable = true)]
    pub payload: Option<Json<Value>>,

    #[schema(example = "pending")]
    pub status: RequestStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn table_registry_parses_known_names_only() {
        assert_eq!(ProtectedTable::from_str("client").unwrap(), ProtectedTable::Client);
        assert_eq!(ProtectedTable::from_str("Employee").unwrap(), ProtectedTable::Employee);
        assert!(ProtectedTable::from_str("deduction").is_err());
        assert!(ProtectedTable::from_str("users").is_err());
    }

    #[test]
    fn edit_support_matches_registry() {
        assert!(ProtectedTable::Client.supports_edit());
        assert!(ProtectedTable::Employee.supports_edit());
        assert!(ProtectedTable::Attendance.supports_edit());
        assert!(!ProtectedTable::Invoice.supports_edit());
        assert!(!ProtectedTable::Salary.supports_edit());
    }
}
