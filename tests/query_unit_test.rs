//! Unit tests for page query arguments.
//!
//! Run with: cargo test --test query_unit_test

use meteo_dashboard::query::{self, DEFAULT_LAST_HOURS};

#[test]
fn lasthours_parses_integer() {
    assert_eq!(query::last_hours("?lasthours=48"), 48);
    assert_eq!(query::last_hours("lasthours=48"), 48);
    assert_eq!(query::last_hours("?title=Garden&lasthours=12"), 12);
    assert_eq!(query::last_hours("?lasthours=24h"), 24);
}

#[test]
fn lasthours_defaults_to_72() {
    assert_eq!(DEFAULT_LAST_HOURS, 72);

    // Absent, empty, valueless or non-numeric all fall back
    assert_eq!(query::last_hours(""), 72);
    assert_eq!(query::last_hours("?"), 72);
    assert_eq!(query::last_hours("?lasthours"), 72);
    assert_eq!(query::last_hours("?lasthours="), 72);
    assert_eq!(query::last_hours("?lasthours=abc"), 72);
    assert_eq!(query::last_hours("?LastHours=48"), 72);
}

#[test]
fn lasthours_value_is_percent_decoded() {
    assert_eq!(query::last_hours("?lasthours=%2036"), 36);
}
