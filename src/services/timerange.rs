//! Half-open interval arithmetic shared by the availability engine.
//!
//! All ranges are [start, end): a range ending at 10:00 does not collide
//! with one starting at 10:00.

/// True when [a_start, a_end) and [b_start, b_end) share any point.
/// Empty ranges (end <= start) overlap nothing.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Minutes since local midnight, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_min: i32,
    pub end_min: i32,
}

impl TimeRange {
    pub fn new(start_min: i32, end_min: i32) -> Self {
        Self { start_min, end_min }
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        overlaps(self.start_min, self.end_min, other.start_min, other.end_min)
    }

    pub fn duration_minutes(&self) -> i32 {
        (self.end_min - self.start_min).max(0)
    }
}

/// Sorts and collapses overlapping or touching ranges into a minimal
/// disjoint set.
pub fn merge_ranges(mut ranges: Vec<TimeRange>) -> Vec<TimeRange> {
    ranges.retain(|r| r.end_min > r.start_min);
    ranges.sort_by_key(|r| (r.start_min, r.end_min));

    let mut merged: Vec<TimeRange> = Vec::new();
    for range in ranges {
        if let Some(last) = merged.last_mut() {
            if range.start_min <= last.end_min {
                last.end_min = last.end_min.max(range.end_min);
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

/// Minutes covered by the union of `ranges`. Double-counted overlap is
/// collapsed first, so stacked blocks never exceed 1440 for one day.
pub fn total_covered_minutes(ranges: &[TimeRange]) -> i32 {
    merge_ranges(ranges.to_vec())
        .iter()
        .map(|r| r.duration_minutes())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_half_open() {
        assert!(overlaps(60, 120, 90, 150));
        assert!(overlaps(60, 120, 0, 61));
        assert!(!overlaps(60, 120, 120, 180));
        assert!(!overlaps(60, 120, 0, 60));
    }

    #[test]
    fn contained_range_overlaps() {
        assert!(overlaps(0, 1440, 600, 630));
        assert!(overlaps(600, 630, 0, 1440));
    }

    #[test]
    fn empty_range_overlaps_nothing() {
        assert!(!overlaps(100, 100, 0, 1440));
        assert!(!overlaps(120, 60, 0, 1440));
    }

    #[test]
    fn overlap_works_on_datetimes() {
        use chrono::NaiveDate;
        let d = |h: u32, m: u32| {
            NaiveDate::from_ymd_opt(2030, 6, 17)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap()
        };
        assert!(overlaps(d(10, 0), d(11, 0), d(10, 30), d(12, 0)));
        assert!(!overlaps(d(10, 0), d(11, 0), d(11, 0), d(12, 0)));
    }

    #[test]
    fn merge_collapses_overlapping() {
        let merged = merge_ranges(vec![
            TimeRange::new(100, 300),
            TimeRange::new(200, 400),
            TimeRange::new(500, 600),
        ]);
        assert_eq!(
            merged,
            vec![TimeRange::new(100, 400), TimeRange::new(500, 600)]
        );
    }

    #[test]
    fn merge_collapses_adjacent() {
        let merged = merge_ranges(vec![TimeRange::new(100, 200), TimeRange::new(200, 300)]);
        assert_eq!(merged, vec![TimeRange::new(100, 300)]);
    }

    #[test]
    fn merge_sorts_input() {
        let merged = merge_ranges(vec![TimeRange::new(500, 600), TimeRange::new(100, 200)]);
        assert_eq!(
            merged,
            vec![TimeRange::new(100, 200), TimeRange::new(500, 600)]
        );
    }

    #[test]
    fn merge_drops_empty_ranges() {
        let merged = merge_ranges(vec![TimeRange::new(100, 100), TimeRange::new(300, 200)]);
        assert!(merged.is_empty());
    }

    #[test]
    fn covered_minutes_ignore_double_blocking() {
        let total = total_covered_minutes(&[
            TimeRange::new(0, 720),
            TimeRange::new(600, 900),
            TimeRange::new(600, 900),
        ]);
        assert_eq!(total, 900);
    }
}
