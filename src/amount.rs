use alloy_primitives::U256;

/// 10^12 wei, one millionth of the base unit.
const WEI_PER_MICRO: U256 = U256::from_limbs([1_000_000_000_000, 0, 0, 0]);
const HALF_MICRO: U256 = U256::from_limbs([500_000_000_000, 0, 0, 0]);
const MICROS_PER_UNIT: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

/// Renders a wei amount in the base unit (10^18 wei) with exactly six
/// fractional digits, rounding half up.
pub fn format_amount(wei: U256) -> String {
    let (mut micros, remainder) = wei.div_rem(WEI_PER_MICRO);
    if remainder >= HALF_MICRO {
        micros += U256::from(1u64);
    }

    let (whole, fraction) = micros.div_rem(MICROS_PER_UNIT);
    format!("{}.{:06}", whole, fraction.to::<u64>())
}
