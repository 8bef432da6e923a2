use crate::error::ApiError;
use chrono::NaiveDate;

/// Half-open billing window [first day of month, first day of next month).
pub fn month_window(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ApiError::InvalidInput(format!("Invalid period {}/{}", month, year)))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| ApiError::InvalidInput(format!("Invalid period {}/{}", month, year)))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_year_window() {
        let (start, end) = month_window(3, 2026).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 4, 1).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_window(12, 2025).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn rejects_invalid_months() {
        assert!(month_window(0, 2026).is_err());
        assert!(month_window(13, 2026).is_err());
    }
}
