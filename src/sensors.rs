//! Sensor access. The HTTP layer and scheduler only see the [`SensorHub`]
//! trait; the binary wires in [`MockSensors`] until real probes are attached.

use rand::Rng;

/// Hardware probes attached to the pool controller.
///
/// Implementations must be cheap to call; capture runs on the request path
/// for `/api/readings/current`.
pub trait SensorHub: Send + Sync {
    /// Current pH. The probe compensates internally using the temperature
    /// last pushed via [`SensorHub::set_ph_compensation`].
    fn ph(&self) -> f64;

    /// Water temperature (°C)
    fn water_temperature(&self) -> f64;

    /// Air temperature (°C)
    fn air_temperature(&self) -> f64;

    /// Controller CPU temperature (°C)
    fn internal_temperature(&self) -> f64;

    /// Push a new temperature-compensation value to the pH probe.
    fn set_ph_compensation(&self, temperature_c: f64);
}

/// Randomized stand-in with plausible backyard-pool ranges.
#[derive(Debug, Default)]
pub struct MockSensors;

impl SensorHub for MockSensors {
    fn ph(&self) -> f64 {
        rand::rng().random_range(7.0..7.5)
    }

    fn water_temperature(&self) -> f64 {
        rand::rng().random_range(20.0..30.0)
    }

    fn air_temperature(&self) -> f64 {
        rand::rng().random_range(30.0..38.0)
    }

    fn internal_temperature(&self) -> f64 {
        rand::rng().random_range(40.0..50.0)
    }

    fn set_ph_compensation(&self, temperature_c: f64) {
        tracing::debug!(temperature_c, "Mock probe compensation set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_values_stay_in_range() {
        let hub = MockSensors;
        for _ in 0..100 {
            assert!((7.0..7.5).contains(&hub.ph()));
            assert!((20.0..30.0).contains(&hub.water_temperature()));
            assert!((30.0..38.0).contains(&hub.air_temperature()));
            assert!((40.0..50.0).contains(&hub.internal_temperature()));
        }
    }
}
