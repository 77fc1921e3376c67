//! Safe arithmetic helpers - no unwrap, no panics

/// Add u128 with saturation at MAX
pub fn add_u128(a: u128, b: u128) -> u128 {
    a.saturating_add(b)
}

/// Subtract u128 with saturation at 0
pub fn sub_u128(a: u128, b: u128) -> u128 {
    a.saturating_sub(b)
}

/// Multiply u128 with saturation
pub fn mul_u128(a: u128, b: u128) -> u128 {
    a.saturating_mul(b)
}

/// floor(a * b / denom) without an intermediate overflow
///
/// Splits `a = q * denom + r` so the result is `q * b + floor(r * b / denom)`,
/// then splits `b` the same way if `r * b` still overflows. Exact whenever the
/// true result fits in u128 and `denom <= 2^64`, which covers every caller in
/// this crate. Returns 0 if `denom` is 0 and saturates at `u128::MAX`.
pub fn mul_div_floor(a: u128, b: u128, denom: u128) -> u128 {
    if denom == 0 {
        return 0;
    }
    let q = a / denom;
    let r = a % denom;

    let whole = mul_u128(q, b);
    let part = match r.checked_mul(b) {
        Some(n) => n / denom,
        None => {
            let qb = b / denom;
            let rb = b % denom;
            // r, rb < denom <= 2^64
            let tail = r.checked_mul(rb).map_or(0, |n| n / denom);
            add_u128(mul_u128(r, qb), tail)
        }
    };
    add_u128(whole, part)
}

/// Non-negative difference `b - a` of two timestamps as u128
pub fn span_u128(a: i64, b: i64) -> u128 {
    if b <= a {
        0
    } else {
        // i64 difference fits in u64 once b > a
        (b as i128 - a as i128) as u128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_floor_small() {
        assert_eq!(mul_div_floor(10, 3, 4), 7);
        assert_eq!(mul_div_floor(0, 3, 4), 0);
        assert_eq!(mul_div_floor(10, 0, 4), 0);
    }

    #[test]
    fn test_mul_div_floor_zero_denom() {
        assert_eq!(mul_div_floor(10, 3, 0), 0);
    }

    #[test]
    fn test_mul_div_floor_wide_product() {
        // a * b overflows u128 but the quotient fits
        let a = u128::MAX / 2;
        assert_eq!(mul_div_floor(a, 4, 8), a / 2);
        assert_eq!(mul_div_floor(a, 10_000, 10_000), a);
    }

    #[test]
    fn test_mul_div_floor_saturates() {
        assert_eq!(mul_div_floor(u128::MAX, 3, 1), u128::MAX);
    }

    #[test]
    fn test_span() {
        assert_eq!(span_u128(1000, 2000), 1000);
        assert_eq!(span_u128(2000, 1000), 0);
        assert_eq!(span_u128(i64::MIN, i64::MAX), u64::MAX as u128);
    }
}
