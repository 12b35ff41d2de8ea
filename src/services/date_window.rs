use chrono::{Datelike, NaiveDate};

/// Days of the following month offered when the current month is nearly over.
pub const SPILLOVER_DAYS: u32 = 7;

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = next_month(year, month);
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28)
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Dates a customer can pick, starting at `today` and running to the end of
/// the month. When fewer than 7 days are left after `today`, the first week
/// of the next month is appended.
pub fn generate_date_window(today: NaiveDate) -> Vec<NaiveDate> {
    let last_day = last_day_of_month(today.year(), today.month());

    let mut dates: Vec<NaiveDate> = (today.day()..=last_day)
        .filter_map(|d| today.with_day(d))
        .collect();

    if last_day - today.day() < SPILLOVER_DAYS {
        let (year, month) = next_month(today.year(), today.month());
        dates.extend((1..=SPILLOVER_DAYS).filter_map(|d| NaiveDate::from_ymd_opt(year, month, d)));
    }

    dates
}

pub fn window_contains(today: NaiveDate, date: NaiveDate) -> bool {
    generate_date_window(today).contains(&date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_mid_month_runs_to_month_end() {
        let dates = generate_date_window(day("2026-10-16"));
        assert_eq!(dates.len(), 16);
        assert_eq!(dates.first(), Some(&day("2026-10-16")));
        assert_eq!(dates.last(), Some(&day("2026-10-31")));
    }

    #[test]
    fn test_exactly_seven_days_left_has_no_spillover() {
        let dates = generate_date_window(day("2026-10-24"));
        assert_eq!(dates.len(), 8);
        assert_eq!(dates.last(), Some(&day("2026-10-31")));
    }

    #[test]
    fn test_near_month_end_appends_next_week() {
        let dates = generate_date_window(day("2026-10-25"));
        assert_eq!(dates.len(), 7 + 7);
        assert_eq!(dates[6], day("2026-10-31"));
        assert_eq!(dates[7], day("2026-11-01"));
        assert_eq!(dates.last(), Some(&day("2026-11-07")));
    }

    #[test]
    fn test_december_rolls_into_january() {
        let dates = generate_date_window(day("2026-12-28"));
        assert_eq!(dates.len(), 4 + 7);
        assert_eq!(dates[4], day("2027-01-01"));
        assert_eq!(dates.last(), Some(&day("2027-01-07")));
    }

    #[test]
    fn test_last_day_of_month_itself() {
        let dates = generate_date_window(day("2026-04-30"));
        assert_eq!(dates.len(), 1 + 7);
        assert_eq!(dates[1], day("2026-05-01"));
    }

    #[test]
    fn test_leap_february() {
        assert_eq!(last_day_of_month(2028, 2), 29);
        assert_eq!(last_day_of_month(2026, 2), 28);
        let dates = generate_date_window(day("2028-02-25"));
        assert_eq!(dates[4], day("2028-02-29"));
        assert_eq!(dates[5], day("2028-03-01"));
    }

    #[test]
    fn test_window_is_ascending_and_not_before_today() {
        let today = day("2026-01-27");
        let dates = generate_date_window(today);
        assert!(dates.iter().all(|d| *d >= today));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_window_deterministic() {
        let today = day("2026-06-26");
        assert_eq!(generate_date_window(today), generate_date_window(today));
    }

    #[test]
    fn test_window_contains() {
        let today = day("2026-10-25");
        assert!(window_contains(today, day("2026-11-03")));
        assert!(!window_contains(today, day("2026-11-08")));
        assert!(!window_contains(today, day("2026-10-24")));
    }
}
