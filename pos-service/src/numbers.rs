//! Receipt and purchase-order number generation.
//!
//! Numbers are `RCP-`/`PO-` followed by an uppercase base36 token. The
//! token is derived from a wall-clock milliseconds value forced to be
//! strictly increasing process-wide, so rapid generation cannot collide.

use std::sync::atomic::{AtomicI64, Ordering};

static LAST_TOKEN: AtomicI64 = AtomicI64::new(0);

/// Next strictly-increasing token value.
fn next_token() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_TOKEN.load(Ordering::Relaxed);
    loop {
        let candidate = if now > last { now } else { last + 1 };
        match LAST_TOKEN.compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

/// Encode a non-negative value as uppercase base36.
fn base36(mut value: i64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value <= 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Shared identifier linking all sale rows of one checkout.
pub fn receipt_number() -> String {
    format!("RCP-{}", base36(next_token()))
}

/// Unique purchase-order number.
pub fn order_number() -> String {
    format!("PO-{}", base36(next_token()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "Z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(36 * 36 + 1), "101");
    }

    #[test]
    fn numbers_carry_their_prefixes() {
        assert!(receipt_number().starts_with("RCP-"));
        assert!(order_number().starts_with("PO-"));
    }

    #[test]
    fn rapid_generation_never_collides() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(receipt_number()));
        }
    }

    #[test]
    fn tokens_are_uppercase_base36() {
        let number = receipt_number();
        let token = number.trim_start_matches("RCP-");
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
