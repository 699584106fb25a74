use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::Serialize;
use utoipa::ToSchema;

/// Attendance row shape the reconstruction works on. Decoupled from the
/// database row so the module stays free of I/O.
#[derive(Debug, Clone)]
pub struct AttendanceDay {
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

/// An approved leave interval, inclusive on both ends.
#[derive(Debug, Clone, Copy)]
pub struct LeaveSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LeaveSpan {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Derived status for a single day. Never persisted; recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum_macros::Display)]
pub enum DayStatus {
    Present,
    #[serde(rename = "Present (Checked In Only)")]
    #[strum(serialize = "Present (Checked In Only)")]
    CheckedInOnly,
    Absent,
    Leave,
    Holiday,
}

impl DayStatus {
    /// Both full days and checked-in-only days count towards presence.
    pub fn is_present(self) -> bool {
        matches!(self, DayStatus::Present | DayStatus::CheckedInOnly)
    }

    /// Days that do not count into the percentage denominator.
    pub fn is_excluded(self) -> bool {
        matches!(self, DayStatus::Leave | DayStatus::Holiday)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayRecord {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: DayStatus,
    #[schema(value_type = Option<String>, format = "time")]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, format = "time")]
    pub check_out: Option<NaiveTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Summary {
    pub present_days: u32,
    pub absent_days: u32,
    pub leave_days: u32,
    pub holiday_days: u32,
    /// Days counted into the percentage denominator (excludes Leave/Holiday).
    pub total_days: u32,
    #[schema(example = 87.5)]
    pub percent: f64,
}

/// Derive the status of one date. Precedence: leave, weekend, recorded row,
/// absent. A row with a check-out but no check-in is treated as Absent.
fn status_for(
    date: NaiveDate,
    row: Option<&AttendanceDay>,
    leaves: &[LeaveSpan],
) -> DayStatus {
    if leaves.iter().any(|span| span.contains(date)) {
        return DayStatus::Leave;
    }
    if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        return DayStatus::Holiday;
    }
    match row {
        Some(att) if att.check_in.is_some() && att.check_out.is_some() => DayStatus::Present,
        Some(att) if att.check_in.is_some() => DayStatus::CheckedInOnly,
        _ => DayStatus::Absent,
    }
}

/// Reconstruct the per-day status timeline for `[join_date, today]`,
/// inclusive. Returns one record per calendar day in ascending date order;
/// empty when `today` precedes `join_date`.
pub fn reconstruct_timeline(
    join_date: NaiveDate,
    today: NaiveDate,
    rows: &[AttendanceDay],
    leaves: &[LeaveSpan],
) -> Vec<DayRecord> {
    let by_date: HashMap<NaiveDate, &AttendanceDay> =
        rows.iter().map(|r| (r.date, r)).collect();

    join_date
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|date| {
            let row = by_date.get(&date).copied();
            DayRecord {
                date,
                status: status_for(date, row, leaves),
                check_in: row.and_then(|r| r.check_in),
                check_out: row.and_then(|r| r.check_out),
            }
        })
        .collect()
}

/// Aggregate a timeline into day counts and the attendance percentage.
pub fn aggregate(timeline: &[DayRecord]) -> Summary {
    let mut summary = Summary::default();

    for day in timeline {
        match day.status {
            DayStatus::Present | DayStatus::CheckedInOnly => summary.present_days += 1,
            DayStatus::Absent => summary.absent_days += 1,
            DayStatus::Leave => summary.leave_days += 1,
            DayStatus::Holiday => summary.holiday_days += 1,
        }
        if !day.status.is_excluded() {
            summary.total_days += 1;
        }
    }

    summary.percent = percentage(summary.present_days, summary.total_days);
    summary
}

/// `present / total * 100`, rounded to two decimals; 0 when total is 0.
pub fn percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(f64::from(present) / f64::from(total) * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Dates in `[join_date, today]` without an attendance row. Feeds the
/// idempotent absent-backfill: inserting exactly these dates (guarded by the
/// per-user-per-date unique key) leaves the row set unchanged on re-runs.
pub fn missing_dates(
    join_date: NaiveDate,
    today: NaiveDate,
    existing: &HashSet<NaiveDate>,
) -> Vec<NaiveDate> {
    join_date
        .iter_days()
        .take_while(|d| *d <= today)
        .filter(|d| !existing.contains(d))
        .collect()
}

/// Month-calendar marker. The calendar view intentionally uses looser rules
/// than the full reconstruction: approved leave wins, a recorded row maps by
/// its times, and days with no row stay blank (no weekend rule here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum CalendarMark {
    Present,
    #[serde(rename = "Half-Day")]
    HalfDay,
    Absent,
    Leave,
}

/// Per-day markers for one month: `(day_of_month, mark)` with `None` where
/// no attendance row exists and no leave applies.
pub fn calendar_marks(
    year: i32,
    month: u32,
    rows: &[AttendanceDay],
    leaves: &[LeaveSpan],
) -> Vec<(u32, Option<CalendarMark>)> {
    let in_month: HashMap<u32, &AttendanceDay> = rows
        .iter()
        .filter(|r| r.date.year() == year && r.date.month() == month)
        .map(|r| (r.date.day(), r))
        .collect();

    (1..=31)
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day).map(|date| (day, date)))
        .map(|(day, date)| {
            let mark = if leaves.iter().any(|span| span.contains(date)) {
                Some(CalendarMark::Leave)
            } else {
                in_month.get(&day).map(|att| {
                    if att.check_in.is_some() && att.check_out.is_some() {
                        CalendarMark::Present
                    } else if att.check_in.is_some() {
                        CalendarMark::HalfDay
                    } else {
                        CalendarMark::Absent
                    }
                })
            };
            (day, mark)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn row(date: NaiveDate, check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> AttendanceDay {
        AttendanceDay { date, check_in, check_out }
    }

    #[test]
    fn timeline_covers_every_day_inclusive() {
        let timeline = reconstruct_timeline(d(2025, 1, 1), d(2025, 1, 10), &[], &[]);
        assert_eq!(timeline.len(), 10);
        assert_eq!(timeline[0].date, d(2025, 1, 1));
        assert_eq!(timeline[9].date, d(2025, 1, 10));
    }

    #[test]
    fn timeline_empty_when_today_before_join() {
        assert!(reconstruct_timeline(d(2025, 1, 10), d(2025, 1, 1), &[], &[]).is_empty());
    }

    #[test]
    fn leave_beats_weekend_and_attendance() {
        // 2025-01-04 is a Saturday; a leave span and an attendance row both
        // cover it. Leave must win over both.
        let rows = vec![row(d(2025, 1, 4), Some(t(9, 0)), Some(t(17, 0)))];
        let leaves = vec![LeaveSpan { start: d(2025, 1, 3), end: d(2025, 1, 5) }];
        let timeline = reconstruct_timeline(d(2025, 1, 3), d(2025, 1, 5), &rows, &leaves);
        assert!(timeline.iter().all(|r| r.status == DayStatus::Leave));
    }

    #[test]
    fn weekends_are_holidays_outside_leave() {
        // 2025-01-04/05 are Sat/Sun.
        let timeline = reconstruct_timeline(d(2025, 1, 3), d(2025, 1, 6), &[], &[]);
        assert_eq!(timeline[0].status, DayStatus::Absent); // Fri
        assert_eq!(timeline[1].status, DayStatus::Holiday); // Sat
        assert_eq!(timeline[2].status, DayStatus::Holiday); // Sun
        assert_eq!(timeline[3].status, DayStatus::Absent); // Mon
    }

    #[test]
    fn row_with_both_times_is_present() {
        let rows = vec![row(d(2025, 1, 6), Some(t(9, 0)), Some(t(17, 0)))];
        let timeline = reconstruct_timeline(d(2025, 1, 6), d(2025, 1, 6), &rows, &[]);
        assert_eq!(timeline[0].status, DayStatus::Present);
        assert_eq!(timeline[0].check_in, Some(t(9, 0)));
        assert_eq!(timeline[0].check_out, Some(t(17, 0)));
    }

    #[test]
    fn row_with_check_in_only() {
        let rows = vec![row(d(2025, 1, 6), Some(t(9, 0)), None)];
        let timeline = reconstruct_timeline(d(2025, 1, 6), d(2025, 1, 6), &rows, &[]);
        assert_eq!(timeline[0].status, DayStatus::CheckedInOnly);
        assert!(timeline[0].status.is_present());
    }

    #[test]
    fn empty_row_and_missing_row_are_absent() {
        let rows = vec![row(d(2025, 1, 6), None, None)];
        let timeline = reconstruct_timeline(d(2025, 1, 6), d(2025, 1, 7), &rows, &[]);
        assert_eq!(timeline[0].status, DayStatus::Absent);
        assert_eq!(timeline[1].status, DayStatus::Absent);
    }

    #[test]
    fn check_out_without_check_in_is_absent() {
        // Should not occur under normal flow; the rule deliberately keeps
        // the historical behavior instead of erroring.
        let rows = vec![row(d(2025, 1, 6), None, Some(t(17, 0)))];
        let timeline = reconstruct_timeline(d(2025, 1, 6), d(2025, 1, 6), &rows, &[]);
        assert_eq!(timeline[0].status, DayStatus::Absent);
        assert_eq!(timeline[0].check_out, Some(t(17, 0)));
    }

    #[test]
    fn mixed_month_reconstruction_and_aggregation() {
        // Join 2025-01-01, today 2025-01-10, approved leave 01-03..01-04,
        // full-day rows on 01-06 and 01-07. 01-04/05 fall on Sat/Sun; the
        // Saturday is covered by the leave, the Sunday becomes Holiday.
        let rows = vec![
            row(d(2025, 1, 6), Some(t(9, 0)), Some(t(17, 0))),
            row(d(2025, 1, 7), Some(t(9, 5)), Some(t(16, 55))),
        ];
        let leaves = vec![LeaveSpan { start: d(2025, 1, 3), end: d(2025, 1, 4) }];
        let timeline = reconstruct_timeline(d(2025, 1, 1), d(2025, 1, 10), &rows, &leaves);

        let statuses: Vec<DayStatus> = timeline.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                DayStatus::Absent,        // 01 Wed
                DayStatus::Absent,        // 02 Thu
                DayStatus::Leave,         // 03 Fri
                DayStatus::Leave,         // 04 Sat (leave wins)
                DayStatus::Holiday,       // 05 Sun
                DayStatus::Present,       // 06 Mon
                DayStatus::Present,       // 07 Tue
                DayStatus::Absent,        // 08 Wed
                DayStatus::Absent,        // 09 Thu
                DayStatus::Absent,        // 10 Fri
            ]
        );

        let summary = aggregate(&timeline);
        assert_eq!(summary.present_days, 2);
        assert_eq!(summary.leave_days, 2);
        assert_eq!(summary.holiday_days, 1);
        assert_eq!(summary.total_days, 7); // excludes the 2 leave + 1 holiday
        assert_eq!(summary.percent, round2(2.0 / 7.0 * 100.0));
    }

    #[test]
    fn percent_zero_when_no_countable_days() {
        // A single Saturday: everything excluded from the denominator.
        let timeline = reconstruct_timeline(d(2025, 1, 4), d(2025, 1, 4), &[], &[]);
        let summary = aggregate(&timeline);
        assert_eq!(summary.total_days, 0);
        assert_eq!(summary.percent, 0.0);
    }

    #[test]
    fn percent_bounds() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(0, 10), 0.0);
        assert_eq!(percentage(10, 10), 100.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
    }

    #[test]
    fn missing_dates_skips_existing_and_is_idempotent() {
        let existing: HashSet<NaiveDate> =
            [d(2025, 1, 2), d(2025, 1, 4)].into_iter().collect();
        let missing = missing_dates(d(2025, 1, 1), d(2025, 1, 5), &existing);
        assert_eq!(missing, vec![d(2025, 1, 1), d(2025, 1, 3), d(2025, 1, 5)]);

        // After backfilling the missing dates, nothing is left to insert.
        let mut filled = existing.clone();
        filled.extend(missing);
        assert!(missing_dates(d(2025, 1, 1), d(2025, 1, 5), &filled).is_empty());
    }

    #[test]
    fn calendar_marks_follow_stored_rows_with_leave_overlay() {
        let rows = vec![
            row(d(2025, 1, 6), Some(t(9, 0)), Some(t(17, 0))), // Present
            row(d(2025, 1, 7), Some(t(9, 0)), None),           // Half-Day
            row(d(2025, 1, 8), None, None),                    // Absent
        ];
        let leaves = vec![LeaveSpan { start: d(2025, 1, 8), end: d(2025, 1, 9) }];
        let marks = calendar_marks(2025, 1, &rows, &leaves);

        assert_eq!(marks.len(), 31);
        assert_eq!(marks[5], (6, Some(CalendarMark::Present)));
        assert_eq!(marks[6], (7, Some(CalendarMark::HalfDay)));
        assert_eq!(marks[7], (8, Some(CalendarMark::Leave))); // leave wins
        assert_eq!(marks[8], (9, Some(CalendarMark::Leave)));
        assert_eq!(marks[9], (10, None)); // no row, no leave
    }

    #[test]
    fn status_display_strings() {
        assert_eq!(DayStatus::Present.to_string(), "Present");
        assert_eq!(
            DayStatus::CheckedInOnly.to_string(),
            "Present (Checked In Only)"
        );
        assert_eq!(DayStatus::Holiday.to_string(), "Holiday");
    }
}
