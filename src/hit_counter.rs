//! The retro "visitors" counter.
//!
//! It counts entries into the retro theme, not unique visits: every
//! activation adds one.

use std::time::Duration;

use crate::config::HitConfig;
use crate::storage::Storage;

/// Adds one to the stored count and returns the new value.
///
/// A missing or unreadable count restarts from `config.seed`. A failed
/// write is logged; the incremented value is still returned for display.
pub fn increment(storage: &dyn Storage, key: &str, config: &HitConfig) -> u64 {
    let current = match storage.get(key) {
        Ok(Some(raw)) => raw.trim().parse::<u64>().unwrap_or_else(|err| {
            tracing::warn!(%err, %raw, "resetting unreadable hit counter");
            config.seed
        }),
        Ok(None) => config.seed,
        Err(err) => {
            tracing::warn!(%err, "could not read hit counter");
            config.seed
        }
    };
    let next = current.saturating_add(1);
    if let Err(err) = storage.set(key, &next.to_string()) {
        tracing::warn!(%err, "could not save hit counter");
    }
    next
}

/// `value` left-padded with zeros to `width` digits.
pub fn counter_digits(value: u64, width: usize) -> String {
    format!("{value:0width$}")
}

/// When each digit of the counter shows up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitReveal {
    pub digit: char,
    /// CSS `animation-delay` of the digit's flip animation.
    pub animation_delay: Duration,
    /// When the placeholder `0` is replaced by the real digit.
    pub reveal_after: Duration,
}

pub fn reveal_schedule(digits: &str, config: &HitConfig) -> Vec<DigitReveal> {
    let stagger = Duration::from_millis(u64::from(config.stagger_ms));
    let initial = Duration::from_millis(u64::from(config.initial_delay_ms));
    digits
        .chars()
        .zip(0u32..)
        .map(|(digit, index)| DigitReveal {
            digit,
            animation_delay: stagger * index,
            reveal_after: initial + stagger * index,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::BlockedStorage;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_counter_starts_above_seed() {
        let storage = MemoryStorage::new();
        let config = HitConfig::default();
        assert_eq!(increment(&storage, "retro-hits", &config), 1338);
        assert_eq!(increment(&storage, "retro-hits", &config), 1339);
        assert_eq!(
            storage.get("retro-hits").unwrap().as_deref(),
            Some("1339")
        );
    }

    #[test]
    fn unreadable_counter_restarts_from_seed() {
        let storage = MemoryStorage::new();
        storage.set("retro-hits", "lots").unwrap();
        assert_eq!(increment(&storage, "retro-hits", &HitConfig::default()), 1338);
        assert_eq!(increment(&BlockedStorage, "retro-hits", &HitConfig::default()), 1338);
    }

    #[test]
    fn digits_are_zero_padded() {
        assert_eq!(counter_digits(1338, 6), "001338");
        assert_eq!(counter_digits(12_345_678, 6), "12345678");
    }

    #[test]
    fn reveal_is_staggered() {
        let schedule = reveal_schedule("042", &HitConfig::default());
        let ms = |n| Duration::from_millis(n);
        assert_eq!(
            schedule,
            vec![
                DigitReveal { digit: '0', animation_delay: ms(0), reveal_after: ms(500) },
                DigitReveal { digit: '4', animation_delay: ms(100), reveal_after: ms(600) },
                DigitReveal { digit: '2', animation_delay: ms(200), reveal_after: ms(700) },
            ]
        );
    }
}
