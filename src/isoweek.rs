use chrono::{Datelike, Duration, NaiveDate};

/// ISO-8601 week number for a calendar date, in 1..=53.
///
/// Weeks run Monday through Sunday; week 1 is the week containing the year's
/// first Thursday. The date is shifted to the Thursday of its own week, so
/// days near a year boundary roll into week 1 of the next year or week 52/53
/// of the previous one.
pub fn iso_week_number(date: NaiveDate) -> u32 {
    let iso_dow = date.weekday().number_from_monday() as i64;
    let thursday = date + Duration::days(4 - iso_dow);
    // ceil(day_of_year / 7), with day_of_year counted from 1
    (thursday.ordinal() + 6) / 7
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn january_fourth_is_always_week_one() {
        for year in 1990..=2040 {
            assert_eq!(iso_week_number(date(year, 1, 4)), 1, "year {year}");
        }
    }

    #[test]
    fn known_reference_dates() {
        assert_eq!(iso_week_number(date(2021, 1, 4)), 1);
        assert_eq!(iso_week_number(date(2021, 12, 31)), 52);
        assert_eq!(iso_week_number(date(2021, 1, 11)), 2);
    }

    #[test]
    fn fifty_three_week_years() {
        // 2015, 2020 and 2026 all have 53 ISO weeks
        assert_eq!(iso_week_number(date(2015, 12, 31)), 53);
        assert_eq!(iso_week_number(date(2020, 12, 31)), 53);
        assert_eq!(iso_week_number(date(2026, 12, 31)), 53);
    }

    #[test]
    fn year_boundary_rolls_into_adjacent_week() {
        // 2021-01-01 is a Friday, still in the last week of 2020
        assert_eq!(iso_week_number(date(2021, 1, 1)), 53);
        // 2019-12-30 is a Monday, already in week 1 of 2020
        assert_eq!(iso_week_number(date(2019, 12, 30)), 1);
    }

    #[test]
    fn always_within_valid_range() {
        let mut d = date(2014, 1, 1);
        while d < date(2028, 1, 1) {
            let week = iso_week_number(d);
            assert!((1..=53).contains(&week), "{d} gave week {week}");
            d = d.succ_opt().unwrap();
        }
    }

    #[test]
    fn agrees_with_chrono_over_full_years() {
        for year in [2015, 2016, 2020, 2021, 2024, 2026] {
            let mut d = date(year, 1, 1);
            while d.year() == year {
                assert_eq!(iso_week_number(d), d.iso_week().week(), "{d}");
                d = d.succ_opt().unwrap();
            }
        }
    }
}
