//! Relative time literals such as `3d`, `-2wk` or `NOW`.
//!
//! Months are 30 days and years are 365 days; no calendar arithmetic is done.

use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;

use super::error::{QueryError, QueryResult};

/// Literal meaning "no offset from now".
pub const NOW: &str = "NOW";

static TIMEDELTA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-+]?\d+)(m|min|h|hr|d|w|wk|M|mo|y|yr)$").expect("timedelta pattern is valid")
});

/// Parses a relative time literal into a duration.
///
/// Units are case-sensitive: `m`/`min` are minutes, `M`/`mo` are months.
///
/// # Errors
///
/// Returns [`QueryError::InvalidTimedelta`] if `input` is not `NOW` and not
/// of the form `[-+]?<integer><unit>`, or if the duration overflows.
///
/// # Example
///
/// ```
/// use chrono::TimeDelta;
/// use recall_search::search::parse_timedelta;
///
/// assert_eq!(parse_timedelta("3d").unwrap(), TimeDelta::days(3));
/// assert_eq!(parse_timedelta("-1M").unwrap(), TimeDelta::days(-30));
/// assert_eq!(parse_timedelta("NOW").unwrap(), TimeDelta::zero());
/// assert!(parse_timedelta("soon").is_err());
/// ```
pub fn parse_timedelta(input: &str) -> QueryResult<TimeDelta> {
    if input == NOW {
        return Ok(TimeDelta::zero());
    }

    let invalid = || QueryError::invalid_timedelta(input);

    let caps = TIMEDELTA_RE.captures(input).ok_or_else(invalid)?;
    let amount: i64 = caps[1].parse().map_err(|_| invalid())?;

    let delta = match &caps[2] {
        "m" | "min" => TimeDelta::try_minutes(amount),
        "h" | "hr" => TimeDelta::try_hours(amount),
        "d" => TimeDelta::try_days(amount),
        "w" | "wk" => TimeDelta::try_weeks(amount),
        "M" | "mo" => amount.checked_mul(30).and_then(TimeDelta::try_days),
        "y" | "yr" => amount.checked_mul(365).and_then(TimeDelta::try_days),
        _ => None,
    };

    delta.ok_or_else(invalid)
}
