//! Calendar-month partitioning of the overall harvest range.
//!
//! The requested `[start, end]` range is split into consecutive sub-ranges,
//! one per calendar month, truncated at both overall bounds. Sub-ranges are
//! contiguous and exhaustive, and each one is handed to exactly one worker.

use chrono::{Datelike, Days, NaiveDate};

/// An inclusive span of calendar days assigned to one worker.
///
/// Invariant: `start <= end`. Never mutated once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Split `[start, end]` into single-month sub-ranges.
pub fn month_partitions(start: NaiveDate, end: NaiveDate) -> Vec<DateRange> {
    let mut ranges = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        let month_end = last_day_of_month(cursor).min(end);
        ranges.push(DateRange {
            start: cursor,
            end: month_end,
        });
        cursor = month_end + Days::new(1);
    }
    ranges
}

fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    let next_month = if day.month() == 12 {
        NaiveDate::from_ymd_opt(day.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(day.year(), day.month() + 1, 1)
    };
    next_month.unwrap().pred_opt().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_truncated_first_and_last_month() {
        let ranges = month_partitions(date(2023, 1, 15), date(2023, 3, 10));
        assert_eq!(
            ranges,
            vec![
                DateRange {
                    start: date(2023, 1, 15),
                    end: date(2023, 1, 31)
                },
                DateRange {
                    start: date(2023, 2, 1),
                    end: date(2023, 2, 28)
                },
                DateRange {
                    start: date(2023, 3, 1),
                    end: date(2023, 3, 10)
                },
            ]
        );
    }

    #[test]
    fn test_single_day_range() {
        let ranges = month_partitions(date(2023, 6, 7), date(2023, 6, 7));
        assert_eq!(
            ranges,
            vec![DateRange {
                start: date(2023, 6, 7),
                end: date(2023, 6, 7)
            }]
        );
    }

    #[test]
    fn test_year_rollover() {
        let ranges = month_partitions(date(2022, 12, 20), date(2023, 1, 5));
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].end, date(2022, 12, 31));
        assert_eq!(ranges[1].start, date(2023, 1, 1));
    }

    #[test]
    fn test_leap_february() {
        let ranges = month_partitions(date(2024, 2, 1), date(2024, 3, 1));
        assert_eq!(ranges[0].end, date(2024, 2, 29));
    }

    #[test]
    fn test_partitions_are_contiguous_and_exhaustive() {
        let start = date(2017, 4, 1);
        let end = date(2017, 11, 18);
        let ranges = month_partitions(start, end);

        assert_eq!(ranges.first().unwrap().start, start);
        assert_eq!(ranges.last().unwrap().end, end);
        for range in &ranges {
            assert!(range.start <= range.end);
            // confined to one calendar month
            assert_eq!(range.start.year(), range.end.year());
            assert_eq!(range.start.month(), range.end.month());
        }
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end + Days::new(1), pair[1].start);
        }
    }
}
