//! Envelope passed across a spawn boundary

use crate::config::Config;

/// Pairs a config with opaque caller-supplied input so both cross the spawn
/// boundary in one argument.
///
/// Built by the caller immediately before spawning a unit and consumed
/// exactly once by the corresponding spawn adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    config: Config,
    input: T,
}

impl<T> Envelope<T> {
    /// Pair a config with the unit's input
    #[inline]
    #[must_use]
    pub fn new(config: Config, input: T) -> Self {
        Self { config, input }
    }

    /// The embedded config
    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The caller-supplied input
    #[inline]
    #[must_use]
    pub fn input(&self) -> &T {
        &self.input
    }

    /// Split into config and input
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (Config, T) {
        (self.config, self.input)
    }
}

impl Envelope<()> {
    /// Envelope with no input
    #[inline]
    #[must_use]
    pub fn bare(config: Config) -> Self {
        Self::new(config, ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_config_and_input() {
        let config = Config::new("t1");
        let envelope = Envelope::new(config.clone(), 7u32);
        assert_eq!(envelope.config(), &config);
        assert_eq!(*envelope.input(), 7);

        let (out_config, out_input) = envelope.into_parts();
        assert_eq!(out_config, config);
        assert_eq!(out_input, 7);
    }

    #[test]
    fn bare_envelope_has_unit_input() {
        let envelope = Envelope::bare(Config::new("t1"));
        assert_eq!(*envelope.input(), ());
    }
}
