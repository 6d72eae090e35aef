use descache_api::DescriptorDb;
use std::time::Duration;

/// Whether `db` holds a usable entry for `address` at unix time `now`.
///
/// Every matching entry is considered; one fresh entry is enough. An entry
/// whose `last_update` lies in the future counts as fresh.
pub fn is_valid(db: &DescriptorDb, address: &str, now: i64, ttl: Duration) -> bool {
    db.hosts_for(address)
        .fold(false, |valid, host| valid | is_fresh(host.last_update, now, ttl))
}

/// Whether a timestamp taken at `last_update` is still within `ttl` at `now`.
///
/// An age that does not fit in an `i64` is stale; a window wider than
/// `i64::MAX` seconds never expires.
pub fn is_fresh(last_update: i64, now: i64, ttl: Duration) -> bool {
    let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    match now.checked_sub(last_update) {
        Some(age) => age <= ttl,
        None => false,
    }
}
