//! Rolling per-period usage counters
//!
//! Each account accumulates, per asset and per counterparty account type,
//! how much it received and spent during the current day, ISO week, month
//! and year. The counters are cleared lazily: nothing runs at period
//! boundaries, instead every reader and writer first drops the buckets whose
//! period has ended since the last update.
//!
//! Periods are treated as strictly nested. A week straddling a month
//! boundary restarts at the first of the month, so the weekly bucket never
//! outlives its month and the monthly bucket never outlives its year. The
//! same nesting governs both clearing and delta application, which keeps
//! apply/cancel pairs symmetric across period boundaries.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::AccountType;

/// Rolling counters for one (account, asset, counterparty type) bucket.
///
/// All amounts are in asset base units. `updated_at` is the instant of the
/// last applied delta and anchors the lazy clearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatistics {
    /// Received today
    pub daily_income: i64,
    /// Spent today
    pub daily_outcome: i64,
    /// Received this ISO week
    pub weekly_income: i64,
    /// Spent this ISO week
    pub weekly_outcome: i64,
    /// Received this month
    pub monthly_income: i64,
    /// Spent this month
    pub monthly_outcome: i64,
    /// Received this year
    pub annual_income: i64,
    /// Spent this year
    pub annual_outcome: i64,
    /// Instant of the last applied delta
    pub updated_at: DateTime<Utc>,
}

impl AccountStatistics {
    /// Fresh zeroed counters anchored at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            daily_income: 0,
            daily_outcome: 0,
            weekly_income: 0,
            weekly_outcome: 0,
            monthly_income: 0,
            monthly_outcome: 0,
            annual_income: 0,
            annual_outcome: 0,
            updated_at: now,
        }
    }

    /// Zeroes every bucket whose period ended between `updated_at` and `now`.
    ///
    /// The cascade is hierarchical: a year change clears everything, a month
    /// change clears month, week and day, a week change clears week and day,
    /// a day change clears only the day. `updated_at` is left untouched so
    /// that repeated clearing against the same `now` is a no-op.
    pub fn clear_obsolete(&mut self, now: DateTime<Utc>) {
        let last = self.updated_at;
        if last.year() != now.year() {
            self.annual_income = 0;
            self.annual_outcome = 0;
            self.monthly_income = 0;
            self.monthly_outcome = 0;
            self.weekly_income = 0;
            self.weekly_outcome = 0;
            self.daily_income = 0;
            self.daily_outcome = 0;
        } else if last.month() != now.month() {
            self.monthly_income = 0;
            self.monthly_outcome = 0;
            self.weekly_income = 0;
            self.weekly_outcome = 0;
            self.daily_income = 0;
            self.daily_outcome = 0;
        } else if last.iso_week() != now.iso_week() {
            self.weekly_income = 0;
            self.weekly_outcome = 0;
            self.daily_income = 0;
            self.daily_outcome = 0;
        } else if last.date_naive() != now.date_naive() {
            self.daily_income = 0;
            self.daily_outcome = 0;
        }
    }

    /// Applies a signed delta for an event that happened at `event_time`.
    ///
    /// The delta lands in every bucket whose current period, anchored at
    /// `now`, still contains `event_time` under the nested-period rule.
    /// For a live payment `event_time == now` and all four buckets move;
    /// a cancellation replays the original event time, so buckets whose
    /// period has since rolled over are correctly skipped. `updated_at`
    /// advances to `now` but never moves backwards.
    pub fn update(
        &mut self,
        delta: i64,
        event_time: DateTime<Utc>,
        now: DateTime<Utc>,
        is_income: bool,
    ) {
        let same_year = event_time.year() == now.year();
        let same_month = same_year && event_time.month() == now.month();
        let same_week = same_month && event_time.iso_week() == now.iso_week();
        let same_day = event_time.date_naive() == now.date_naive();

        if is_income {
            if same_year {
                self.annual_income = self.annual_income.saturating_add(delta);
            }
            if same_month {
                self.monthly_income = self.monthly_income.saturating_add(delta);
            }
            if same_week {
                self.weekly_income = self.weekly_income.saturating_add(delta);
            }
            if same_day {
                self.daily_income = self.daily_income.saturating_add(delta);
            }
        } else {
            if same_year {
                self.annual_outcome = self.annual_outcome.saturating_add(delta);
            }
            if same_month {
                self.monthly_outcome = self.monthly_outcome.saturating_add(delta);
            }
            if same_week {
                self.weekly_outcome = self.weekly_outcome.saturating_add(delta);
            }
            if same_day {
                self.daily_outcome = self.daily_outcome.saturating_add(delta);
            }
        }

        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    /// True when every counter is zero
    pub fn is_zero(&self) -> bool {
        self.daily_income == 0
            && self.daily_outcome == 0
            && self.weekly_income == 0
            && self.weekly_outcome == 0
            && self.monthly_income == 0
            && self.monthly_outcome == 0
            && self.annual_income == 0
            && self.annual_outcome == 0
    }
}

/// Statistics of one (account, asset) pair, broken down by the account type
/// of the counterparty
pub type StatsByCounterparty = HashMap<AccountType, AccountStatistics>;

/// Returns a copy of `stats` with obsolete periods cleared in every bucket.
///
/// Readers call this before summing so that counters from finished periods
/// never leak into limit decisions. The underlying stored value is not
/// modified; persistence of the cleared state happens on the next write.
pub fn normalized(stats: &StatsByCounterparty, now: DateTime<Utc>) -> StatsByCounterparty {
    let mut out = stats.clone();
    for entry in out.values_mut() {
        entry.clear_obsolete(now);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn filled(now: DateTime<Utc>) -> AccountStatistics {
        let mut s = AccountStatistics::new(now);
        s.update(100, now, now, true);
        s.update(40, now, now, false);
        s
    }

    #[test]
    fn update_fills_all_buckets_for_live_event() {
        let now = at(2025, 3, 12, 10);
        let s = filled(now);
        assert_eq!(s.daily_income, 100);
        assert_eq!(s.weekly_income, 100);
        assert_eq!(s.monthly_income, 100);
        assert_eq!(s.annual_income, 100);
        assert_eq!(s.daily_outcome, 40);
        assert_eq!(s.annual_outcome, 40);
        assert_eq!(s.updated_at, now);
    }

    #[test]
    fn clear_on_day_change_keeps_week_month_year() {
        let mut s = filled(at(2025, 3, 12, 10));
        s.clear_obsolete(at(2025, 3, 13, 1));
        assert_eq!(s.daily_income, 0);
        assert_eq!(s.daily_outcome, 0);
        assert_eq!(s.weekly_income, 100);
        assert_eq!(s.monthly_income, 100);
        assert_eq!(s.annual_income, 100);
    }

    #[test]
    fn clear_on_week_change_keeps_month_year() {
        // 2025-03-14 is a Friday, 2025-03-17 the following Monday
        let mut s = filled(at(2025, 3, 14, 10));
        s.clear_obsolete(at(2025, 3, 17, 1));
        assert_eq!(s.daily_income, 0);
        assert_eq!(s.weekly_income, 0);
        assert_eq!(s.monthly_income, 100);
        assert_eq!(s.annual_income, 100);
    }

    #[test]
    fn clear_on_month_change_keeps_year() {
        let mut s = filled(at(2025, 3, 31, 10));
        s.clear_obsolete(at(2025, 4, 1, 1));
        assert_eq!(s.daily_income, 0);
        assert_eq!(s.weekly_income, 0);
        assert_eq!(s.monthly_income, 0);
        assert_eq!(s.annual_income, 100);
    }

    #[test]
    fn clear_on_year_change_zeroes_everything() {
        let mut s = filled(at(2024, 12, 31, 10));
        s.clear_obsolete(at(2025, 1, 1, 1));
        assert!(s.is_zero());
    }

    #[test]
    fn clear_does_not_touch_updated_at() {
        let stamp = at(2025, 3, 12, 10);
        let mut s = filled(stamp);
        s.clear_obsolete(at(2025, 3, 20, 1));
        assert_eq!(s.updated_at, stamp);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut s = filled(at(2025, 3, 14, 10));
        let now = at(2025, 3, 17, 1);
        s.clear_obsolete(now);
        let once = s.clone();
        s.clear_obsolete(now);
        assert_eq!(s, once);
    }

    #[test]
    fn cancellation_across_day_boundary_skips_daily() {
        let applied_at = at(2025, 3, 12, 23);
        let mut s = filled(applied_at);

        // Cancel the 100 income the next day.
        let now = at(2025, 3, 13, 1);
        s.clear_obsolete(now);
        s.update(-100, applied_at, now, true);

        // Daily was already cleared and must not go negative.
        assert_eq!(s.daily_income, 0);
        assert_eq!(s.weekly_income, 0);
        assert_eq!(s.monthly_income, 0);
        assert_eq!(s.annual_income, 0);
    }

    #[test]
    fn week_bucket_is_clipped_to_its_month() {
        // Fri 2025-01-31 and Sat 2025-02-01 share ISO week 2025-W05.
        let applied_at = at(2025, 1, 31, 12);
        let mut s = filled(applied_at);

        let now = at(2025, 2, 1, 9);
        s.clear_obsolete(now);
        // Month changed, so week and day were cleared despite the shared
        // ISO week. Cancelling must not resurrect the weekly bucket.
        s.update(-100, applied_at, now, true);

        assert_eq!(s.weekly_income, 0);
        assert_eq!(s.daily_income, 0);
        assert_eq!(s.monthly_income, 0);
        assert_eq!(s.annual_income, 0);
    }

    #[test]
    fn week_bucket_is_clipped_to_its_year() {
        // Wed 2024-12-31 and Thu 2025-01-02 share ISO week 2025-W01.
        let applied_at = at(2024, 12, 31, 12);
        let mut s = filled(applied_at);

        let now = at(2025, 1, 2, 9);
        s.clear_obsolete(now);
        s.update(-100, applied_at, now, true);

        assert!(s.is_zero());
    }

    #[test]
    fn updated_at_never_moves_backwards() {
        let late = at(2025, 3, 12, 10);
        let mut s = filled(late);
        s.update(5, at(2025, 3, 12, 8), at(2025, 3, 12, 8), true);
        assert_eq!(s.updated_at, late);
    }

    #[test]
    fn normalized_clears_copies_only() {
        let mut stats = StatsByCounterparty::new();
        stats.insert(AccountType::Merchant, filled(at(2025, 3, 12, 10)));

        let view = normalized(&stats, at(2025, 3, 13, 1));
        assert_eq!(view[&AccountType::Merchant].daily_income, 0);
        assert_eq!(view[&AccountType::Merchant].weekly_income, 100);
        // Source untouched.
        assert_eq!(stats[&AccountType::Merchant].daily_income, 100);
    }
}
