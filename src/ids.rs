//! Customer-facing identifiers for orders and reservations.
//!
//! Identifiers are a fixed prefix followed by random uppercase base-36
//! characters. Uniqueness is enforced by the mirror actor, which regenerates
//! on a collision with a known row or a duplicate-key rejection.

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const ORDER_PREFIX: &str = "ORD-";
pub const ORDER_SUFFIX_LEN: usize = 6;
pub const RESERVATION_PREFIX: &str = "RSV-";
pub const RESERVATION_SUFFIX_LEN: usize = 5;

/// Generates `prefix` followed by `len` random characters from `[0-9A-Z]`.
pub fn generate(prefix: &str, len: usize) -> String {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(prefix.len() + len);
    id.push_str(prefix);
    for _ in 0..len {
        let idx = rng.gen_range(0..ALPHABET.len());
        id.push(ALPHABET[idx] as char);
    }
    id
}

pub fn order_id() -> String {
    generate(ORDER_PREFIX, ORDER_SUFFIX_LEN)
}

pub fn reservation_id() -> String {
    generate(RESERVATION_PREFIX, RESERVATION_SUFFIX_LEN)
}

/// Trims and uppercases user input so `" ord-abc123 "` finds `ORD-ABC123`.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// True when `id` is `prefix` plus exactly `len` characters from the alphabet.
pub fn is_well_formed(id: &str, prefix: &str, len: usize) -> bool {
    match id.strip_prefix(prefix) {
        Some(rest) => rest.len() == len && rest.bytes().all(|b| ALPHABET.contains(&b)),
        None => false,
    }
}
