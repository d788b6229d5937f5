//! Temperature value and the thermal-zone fixed-point decoding.

use std::fmt;

/// A temperature reading in degrees Celsius.
///
/// Produced fresh on every poll; never cached past one decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature(f64);

impl Temperature {
    pub const fn from_celsius(celsius: f64) -> Self {
        Self(celsius)
    }

    pub const fn celsius(self) -> f64 {
        self.0
    }

    /// Decodes the raw contents of a thermal-zone `temp` file.
    ///
    /// The digit string is split after its second character and read back as
    /// `integer.fraction`, so `"52616"` becomes 52.616 and `"1000"` becomes
    /// 10.00. Surrounding whitespace (the kernel's trailing newline) is ignored.
    pub fn from_raw(raw: &str) -> Result<Self, String> {
        let digits = raw.trim();
        let unsigned = digits.strip_prefix('-').unwrap_or(digits);
        if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("unexpected sensor value {raw:?}"));
        }

        // ASCII only past this point, so a byte split is a char split.
        let (integer, fraction) = digits.split_at(digits.len().min(2));
        format!("{integer}.{fraction}")
            .parse::<f64>()
            .map(Self)
            .map_err(|e| format!("unexpected sensor value {raw:?}: {e}"))
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        write!(f, "{:.*}", precision, self.0)
    }
}

impl From<f64> for Temperature {
    fn from(celsius: f64) -> Self {
        Self(celsius)
    }
}
