//! Localized strings
//!
//! The card only needs one string, the label of the untracked row, but it is
//! looked up by the same key the host's translation tables use.

use alloc::string::{String, ToString};

/// Key of the untracked consumption label.
pub const UNTRACKED_CONSUMPTION_KEY: &str =
    "ui.panel.lovelace.cards.energy.energy_devices_detail_graph.untracked_consumption";

/// Translates a key into display text.
pub trait Localize {
    fn localize(&self, key: &str) -> String;
}

impl<F: Fn(&str) -> String> Localize for F {
    fn localize(&self, key: &str) -> String {
        self(key)
    }
}

/// Built-in English table; unknown keys are returned as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocale;

impl Localize for EnglishLocale {
    fn localize(&self, key: &str) -> String {
        match key {
            UNTRACKED_CONSUMPTION_KEY => "Untracked consumption".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_untracked_label() {
        assert_eq!(
            EnglishLocale.localize(UNTRACKED_CONSUMPTION_KEY),
            "Untracked consumption"
        );
        assert_eq!(EnglishLocale.localize("ui.unknown"), "ui.unknown");
    }

    #[test]
    fn test_closure_locale() {
        let german = |key: &str| match key {
            UNTRACKED_CONSUMPTION_KEY => String::from("Nicht erfasster Verbrauch"),
            _ => String::new(),
        };
        assert_eq!(
            german.localize(UNTRACKED_CONSUMPTION_KEY),
            "Nicht erfasster Verbrauch"
        );
    }
}
