// tw-core/src/units.rs

use uom::si::f64::{
    ElectricalResistance as UomElectricalResistance, Frequency as UomFrequency,
    Inductance as UomInductance,
};

// Public canonical unit types (SI, f64)
pub type Frequency = UomFrequency;
pub type Inductance = UomInductance;
pub type Resistance = UomElectricalResistance;

#[inline]
pub fn hz(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v)
}

#[inline]
pub fn ohm(v: f64) -> Resistance {
    use uom::si::electrical_resistance::ohm;
    Resistance::new::<ohm>(v)
}

#[inline]
pub fn henry(v: f64) -> Inductance {
    use uom::si::inductance::henry;
    Inductance::new::<henry>(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::frequency::kilohertz;
    use uom::si::inductance::microhenry;

    #[test]
    fn constructors_store_si_values() {
        assert_eq!(ohm(1.5).value, 1.5);
        assert!((hz(2500.0).get::<kilohertz>() - 2.5).abs() < 1e-12);
        assert!((henry(3e-6).get::<microhenry>() - 3.0).abs() < 1e-9);
    }
}
