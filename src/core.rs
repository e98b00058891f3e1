use crate::errors::{ReaperError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// Shorter periods are refused outright.
pub const MINIMUM_INACTIVITY_MONTHS: i64 = 6;

/// A month is always counted as 30 days, not calendar months.
pub const DAYS_PER_MONTH: i64 = 30;

/// Never deleted, on top of the repository's default branch.
pub const PROTECTED_BRANCHES: [&str; 2] = ["develop", "stage"];

pub fn check_inactivity_period(months: i64) -> Result<()> {
    if months < MINIMUM_INACTIVITY_MONTHS {
        return Err(ReaperError::PeriodTooShort {
            months,
            minimum: MINIMUM_INACTIVITY_MONTHS,
        });
    }
    Ok(())
}

/// `now - months * 30 days`
pub fn cutoff_date(now: DateTime<Utc>, months: i64) -> Result<DateTime<Utc>> {
    months
        .checked_mul(DAYS_PER_MONTH)
        .and_then(Duration::try_days)
        .and_then(|offset| now.checked_sub_signed(offset))
        .ok_or(ReaperError::CutoffOutOfRange(months))
}

pub fn excluded_branches(default_branch: &str, extra: &[String]) -> HashSet<String> {
    let mut excluded: HashSet<String> = PROTECTED_BRANCHES.iter().map(|name| name.to_string()).collect();
    excluded.insert(default_branch.to_string());
    excluded.extend(extra.iter().cloned());
    excluded
}

/// A commit is inactive when it is at or before the cutoff.
pub fn is_stale(last_commit: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    last_commit <= cutoff
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_period_floor() {
        assert!(check_inactivity_period(6).is_ok());
        assert!(check_inactivity_period(24).is_ok());

        for months in [5, 3, 0, -1] {
            let err = check_inactivity_period(months).unwrap_err();
            assert!(matches!(err, ReaperError::PeriodTooShort { minimum: 6, .. }));
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn test_cutoff_uses_thirty_day_months() {
        // 6 * 30 = 180 days, which is not the same as "six calendar months ago"
        let cutoff = cutoff_date(now(), 6).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2023, 9, 3, 12, 0, 0).unwrap());

        let cutoff = cutoff_date(now(), 12).unwrap();
        assert_eq!(now() - cutoff, Duration::days(360));
    }

    #[test]
    fn test_cutoff_out_of_range() {
        assert!(matches!(
            cutoff_date(now(), i64::MAX),
            Err(ReaperError::CutoffOutOfRange(_))
        ));
    }

    #[test]
    fn test_is_stale_boundary() {
        let cutoff = cutoff_date(now(), 6).unwrap();
        assert!(is_stale(cutoff, cutoff));
        assert!(is_stale(cutoff - Duration::seconds(1), cutoff));
        assert!(!is_stale(cutoff + Duration::seconds(1), cutoff));
    }

    #[test]
    fn test_excluded_branches() {
        let excluded = excluded_branches("trunk", &["release".to_string()]);
        assert_eq!(excluded.len(), 4);
        for name in ["trunk", "develop", "stage", "release"] {
            assert!(excluded.contains(name));
        }

        // default branch may coincide with a protected name
        let excluded = excluded_branches("develop", &[]);
        assert_eq!(excluded.len(), 2);
    }
}
