//! Human-readable device identifiers.
//!
//! # Invariants
//! - Ids are `PM-` plus 8 symbols from a 32-symbol alphabet without the
//!   look-alikes `O`, `I`, `0` and `1`; total length 11.
//! - Uniqueness is not checked here.

use rand::Rng;

const DEVICE_ID_PREFIX: &str = "PM-";
const DEVICE_ID_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const DEVICE_ID_SYMBOLS: usize = 8;

/// Generates a device id using the thread-local RNG.
pub fn generate_device_id() -> String {
    generate_device_id_with(&mut rand::thread_rng())
}

/// Generates a device id from the given RNG.
pub fn generate_device_id_with(rng: &mut impl Rng) -> String {
    let mut id = String::with_capacity(DEVICE_ID_PREFIX.len() + DEVICE_ID_SYMBOLS);
    id.push_str(DEVICE_ID_PREFIX);
    for _ in 0..DEVICE_ID_SYMBOLS {
        let index = rng.gen_range(0..DEVICE_ID_ALPHABET.len());
        id.push(char::from(DEVICE_ID_ALPHABET[index]));
    }
    id
}

/// Whether `value` has the shape of a generated device id.
pub fn is_device_id(value: &str) -> bool {
    value
        .strip_prefix(DEVICE_ID_PREFIX)
        .is_some_and(|symbols| {
            symbols.len() == DEVICE_ID_SYMBOLS
                && symbols.bytes().all(|b| DEVICE_ID_ALPHABET.contains(&b))
        })
}

#[cfg(test)]
mod tests {
    use super::{generate_device_id_with, is_device_id};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn seeded_generation_is_deterministic() {
        let first = generate_device_id_with(&mut StdRng::seed_from_u64(7));
        let second = generate_device_id_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(first, second);
        assert!(is_device_id(&first));
    }

    #[test]
    fn is_device_id_rejects_ambiguous_symbols() {
        assert!(is_device_id("PM-ABCDEFGH"));
        assert!(!is_device_id("PM-ABCDEFG0"));
        assert!(!is_device_id("PM-ABCDEFGO"));
        assert!(!is_device_id("XX-ABCDEFGH"));
        assert!(!is_device_id("PM-ABC"));
    }
}
