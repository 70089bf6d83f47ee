use num_bigint::{BigInt, BigUint};

/// Fractional digits of the token's smallest unit.
pub const TOKEN_DECIMALS: usize = 7;

/// Renders an integer amount of smallest units as a fixed-point decimal with
/// exactly `decimals` fractional digits, e.g. `1013` at 7 places is
/// `0.0001013`.
pub fn format_units(value: &BigUint, decimals: usize) -> String {
    let digits = value.to_str_radix(10);
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let split = padded.len() - decimals;
    format!("{}.{}", &padded[..split], &padded[split..])
}

/// Divides by `10^exponent`, truncating.
pub fn rescale(value: &BigUint, exponent: u32) -> BigUint {
    value / BigUint::from(10u32).pow(exponent)
}

/// Signed counterpart of [`rescale`]; truncates toward zero.
pub fn rescale_signed(value: &BigInt, exponent: u32) -> BigInt {
    value / BigInt::from(10u32).pow(exponent)
}
