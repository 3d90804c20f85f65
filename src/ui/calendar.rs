// Month-grid date picker rendered on the server

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::utils::dates::format_date_param;

pub fn dashboard_link(date: NaiveDate) -> String {
    format!("/dashboard?date={}", format_date_param(date))
}

pub struct CalendarDay {
    pub day: u32,
    pub link: String,
    /// False for the leading/trailing days borrowed from adjacent months
    pub in_month: bool,
    pub selected: bool,
    pub today: bool,
}

pub struct CalendarMonth {
    /// e.g. `January 2024`
    pub title: String,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
    /// Full weeks, Sunday first
    pub weeks: Vec<Vec<CalendarDay>>,
}

pub const WEEKDAY_LABELS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// Grid for the month containing `selected`.
///
/// Previous/next links keep the day of month where possible (Mar 31 -> Feb 29).
pub fn build_calendar(selected: NaiveDate, today: NaiveDate) -> CalendarMonth {
    let first = selected.with_day(1).unwrap_or(selected);
    let lead = first.weekday().num_days_from_sunday() as i64;
    let grid_start = first - Duration::days(lead);

    let mut weeks = Vec::new();
    let mut day = grid_start;
    loop {
        let week: Vec<CalendarDay> = (0..7)
            .map(|offset| {
                let date = day + Duration::days(offset);
                CalendarDay {
                    day: date.day(),
                    link: dashboard_link(date),
                    in_month: date.month() == first.month() && date.year() == first.year(),
                    selected: date == selected,
                    today: date == today,
                }
            })
            .collect();
        weeks.push(week);
        day += Duration::days(7);

        if day.month() != first.month() || day.year() != first.year() {
            break;
        }
    }

    CalendarMonth {
        title: first.format("%B %Y").to_string(),
        prev_link: selected.checked_sub_months(Months::new(1)).map(dashboard_link),
        next_link: selected.checked_add_months(Months::new(1)).map(dashboard_link),
        weeks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_january_2024_grid() {
        // 1 Jan 2024 is a Monday
        let cal = build_calendar(date(2024, 1, 15), date(2024, 1, 20));
        assert_eq!(cal.title, "January 2024");
        assert_eq!(cal.weeks.len(), 5);
        assert!(cal.weeks.iter().all(|w| w.len() == 7));

        let first_week = &cal.weeks[0];
        assert_eq!(first_week[0].day, 31);
        assert!(!first_week[0].in_month);
        assert_eq!(first_week[1].day, 1);
        assert!(first_week[1].in_month);

        let selected: Vec<_> = cal.weeks.iter().flatten().filter(|d| d.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].day, 15);
        assert_eq!(selected[0].link, "/dashboard?date=2024-01-15");

        let today: Vec<_> = cal.weeks.iter().flatten().filter(|d| d.today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].day, 20);
    }

    #[test]
    fn test_every_day_of_month_present_once() {
        for (y, m, days) in [(2024, 2, 29), (2023, 2, 28), (2024, 9, 30), (2024, 12, 31)] {
            let cal = build_calendar(date(y, m, 10), date(2000, 1, 1));
            let in_month: Vec<u32> = cal
                .weeks
                .iter()
                .flatten()
                .filter(|d| d.in_month)
                .map(|d| d.day)
                .collect();
            assert_eq!(in_month, (1..=days).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_prev_next_links_clamp_day() {
        let cal = build_calendar(date(2024, 3, 31), date(2024, 3, 31));
        assert_eq!(cal.prev_link.as_deref(), Some("/dashboard?date=2024-02-29"));
        assert_eq!(cal.next_link.as_deref(), Some("/dashboard?date=2024-04-30"));

        let cal = build_calendar(date(2024, 12, 5), date(2024, 12, 5));
        assert_eq!(cal.next_link.as_deref(), Some("/dashboard?date=2025-01-05"));
    }
}
