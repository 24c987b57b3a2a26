//! Configuration access port trait.
//!
//! Numeric getters fall back to `default` when the key is absent or does
//! not parse; run `config_validation` first to reject bad values loudly.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_usize(&self, section: &str, key: &str, default: usize) -> usize;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;
}
