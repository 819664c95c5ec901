//! Scalar unit conversions.
//!
//! Field sensors report speed in km/h; the simulator works in m/s.

/// Multiply a km/h value by this to get m/s.
pub const KPH_TO_MPS: f64 = 1000.0 / 3600.0;

/// Multiply a m/s value by this to get km/h.
pub const MPS_TO_KPH: f64 = 3600.0 / 1000.0;

#[inline]
pub fn kph_to_mps(kph: f64) -> f64 {
    kph * KPH_TO_MPS
}

#[inline]
pub fn mps_to_kph(mps: f64) -> f64 {
    mps * MPS_TO_KPH
}
