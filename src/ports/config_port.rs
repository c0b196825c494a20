//! Configuration access port trait.
//!
//! Values are addressed by `[section] key`. Blank values count as absent.
//! Typed getters return `Ok(None)` for an absent key and `InvalidConfig` for
//! a value that is present but does not parse.

use crate::domain::error::EpitomeError;

pub trait ConfigPort {
    /// Value as written, if the key exists.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Finite float.
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, EpitomeError>;

    /// Non-negative integer.
    fn get_usize(&self, section: &str, key: &str) -> Result<Option<usize>, EpitomeError>;

    /// Trimmed, non-blank value.
    fn get_value(&self, section: &str, key: &str) -> Option<String> {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
