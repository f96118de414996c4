use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::CoreError;

/// 10^8, the number of satoshis in one BTC.
const SAT_PER_BTC: i64 = 100_000_000;

/// Convert a decimal-exact BTC amount to an integer satoshi count.
///
/// `btc` is parsed as an arbitrary-precision decimal (never a binary float)
/// so that amounts like `0.1` round-trip exactly. The result must be an
/// integer number of satoshis; any remaining fractional component is an
/// error rather than being rounded away.
pub fn btc_to_sat(btc: &str) -> Result<i64, CoreError> {
    let decimal = Decimal::from_str(btc)
        .map_err(|e| CoreError::FractionalSatoshi(format!("not a decimal amount: {e}")))?;

    let sats = decimal * Decimal::from(SAT_PER_BTC);

    if sats.fract() != Decimal::ZERO {
        return Err(CoreError::FractionalSatoshi(format!(
            "{btc} BTC is not a whole number of satoshis"
        )));
    }

    sats.trunc()
        .to_string()
        .parse::<i64>()
        .map_err(|e| CoreError::ValueOverflow(format!("{btc} BTC overflows i64 satoshis: {e}")))
}

/// Convert an integer satoshi count to a decimal BTC string.
///
/// This direction is output-only (for display/logging) and is not on the
/// safety-critical path that `btc_to_sat` guards.
pub fn sat_to_btc(sats: i64) -> String {
    let decimal = Decimal::from(sats) / Decimal::from(SAT_PER_BTC);
    decimal.normalize().to_string()
}
