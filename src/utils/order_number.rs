use chrono::NaiveDate;

/// ORD + YYYYMMDD + 至少 4 位序号，序号超过 9999 时自然变长
pub fn format_order_number(day: NaiveDate, seq: i64) -> String {
    format!("ORD{}{:04}", day_key(day), seq)
}

/// order_sequences 表的主键
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_order_number() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(format_order_number(day, 1), "ORD202509010001");
        assert_eq!(format_order_number(day, 42), "ORD202509010042");
        assert_eq!(format_order_number(day, 12345), "ORD2025090112345");
    }

    #[test]
    fn test_day_key() {
        let day = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(day_key(day), "20251231");
    }
}
