//! Water-balance chemistry. The only derived quantity is the Langelier
//! Saturation Index; values between -0.3 and +0.5 are considered balanced.

/// Default total dissolved solids (ppm) when no measurement is available.
pub const DEFAULT_TDS: f64 = 320.0;

/// Langelier Saturation Index from pH, water temperature (°C), calcium
/// hardness (ppm) and total alkalinity (ppm). Returns `None` if any input is
/// missing.
///
/// Precondition: all numeric arguments except pH must be > 0 (and tds > 1);
/// the log terms are undefined otherwise. Callers keep junk out, this
/// function does not check.
#[must_use]
pub fn saturation_index(
    ph: Option<f64>,
    water_temp_c: Option<f64>,
    calcium_hardness: Option<f64>,
    total_alkalinity: Option<f64>,
    tds: Option<f64>,
) -> Option<f64> {
    let ph = ph?;
    let temp = water_temp_c?;
    let ca = calcium_hardness?;
    let ta = total_alkalinity?;
    let tds = tds.unwrap_or(DEFAULT_TDS);

    let a = (tds - 1.0).log10() / 10.0;
    let b = -13.12 * (temp + 273.0).log10() + 34.55;
    let c = ca.log10() - 0.4;
    let d = ta.log10();
    let ph_s = (9.3 + a + b) - (c + d);
    Some(ph - ph_s)
}
