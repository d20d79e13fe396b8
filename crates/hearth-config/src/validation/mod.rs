//! Full configuration validation.
//!
//! Validates numeric ranges and the relations between presence timings,
//! collecting every error into a single `ConfigError`.

mod helpers;
mod presence;

#[cfg(test)]
mod tests;

use crate::schema::HearthConfig;
use hearth_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &HearthConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    presence::validate_server(&mut errors, config);
    presence::validate_presence(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
