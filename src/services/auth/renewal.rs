/// Sliding-renewal decision: renew once more than half of the token's
/// validity window has elapsed.
///
/// Purely derived from the timestamps the client-held session already
/// carries; nothing is persisted and no timer is involved. The check
/// runs cooperatively on each authenticated request.
pub fn should_renew(issued_at: i64, expires_at: i64, now: i64) -> bool {
    let valid_window = expires_at - issued_at;
    let refresh_threshold = issued_at + valid_window / 2;

    now > refresh_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const IAT: i64 = 1_000_000;
    const EXP: i64 = 1_000_000 + 1800; // 30 minute window

    #[test]
    fn fresh_token_is_not_renewed() {
        assert!(!should_renew(IAT, EXP, IAT + 60));
    }

    #[test]
    fn token_at_half_window_is_not_yet_renewed() {
        // Exactly at the threshold: not past it yet
        assert!(!should_renew(IAT, EXP, IAT + 900));
    }

    #[test]
    fn token_past_half_window_is_renewed() {
        assert!(should_renew(IAT, EXP, IAT + 901));
    }

    #[test]
    fn sixty_second_token_renews_after_thirty_one_seconds() {
        let exp = IAT + 60;
        assert!(!should_renew(IAT, exp, IAT + 30));
        assert!(should_renew(IAT, exp, IAT + 31));
    }

    #[test]
    fn decision_still_fires_past_expiry() {
        // The validate step rejects expired tokens before the monitor
        // ever runs; the bare decision is monotonic in `now`.
        assert!(should_renew(IAT, EXP, EXP + 10));
    }
}
