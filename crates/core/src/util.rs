use std::time::{SystemTime, UNIX_EPOCH};

/// Whole seconds since the unix epoch; negative for instants before it.
pub fn unix_seconds(at: SystemTime) -> i64 {
    match at.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

pub fn unix_now() -> i64 {
    unix_seconds(SystemTime::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unix_seconds_truncates() {
        let at = UNIX_EPOCH + Duration::from_millis(5_999);
        assert_eq!(unix_seconds(at), 5);
    }

    #[test]
    fn test_unix_seconds_before_epoch() {
        let at = UNIX_EPOCH - Duration::from_secs(3);
        assert_eq!(unix_seconds(at), -3);
    }
}
