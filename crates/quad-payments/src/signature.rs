//! Payment confirmation signatures.
//!
//! The gateway signs `"{order_id}|{payment_id}"` with the shared key secret
//! (HMAC-SHA256, hex). A client echoes that signature back when confirming an
//! unlock; verification here is the first hard gate against a fabricated
//! "payment succeeded" callback.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, order_id: &str, payment_id: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac
}

/// Hex digest over `"{order_id}|{payment_id}"`. Pure; no I/O.
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    hex::encode(mac_for(secret, order_id, payment_id).finalize().into_bytes())
}

/// Verify a client-submitted hex signature. Comparison is constant-time
/// (`Mac::verify_slice`), never a short-circuit string equality. Anything
/// that is not valid hex of the right length simply fails.
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    provided: &str,
) -> bool {
    let Ok(provided) = hex::decode(provided) else {
        return false;
    };
    mac_for(secret, order_id, payment_id)
        .verify_slice(&provided)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_key_secret";
    const ORDER: &str = "order_Nx7iQ2aFd1";
    const PAYMENT: &str = "pay_Km3oP9bGe2";

    #[test]
    fn signature_is_deterministic_hex_sha256() {
        let a = payment_signature(SECRET, ORDER, PAYMENT);
        let b = payment_signature(SECRET, ORDER, PAYMENT);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn valid_signature_verifies() {
        let sig = payment_signature(SECRET, ORDER, PAYMENT);
        assert!(verify_payment_signature(SECRET, ORDER, PAYMENT, &sig));
    }

    #[test]
    fn any_mutated_input_fails_verification() {
        let sig = payment_signature(SECRET, ORDER, PAYMENT);
        assert!(!verify_payment_signature(SECRET, "order_Nx7iQ2aFd2", PAYMENT, &sig));
        assert!(!verify_payment_signature(SECRET, ORDER, "pay_Km3oP9bGe3", &sig));
        assert!(!verify_payment_signature("other_secret", ORDER, PAYMENT, &sig));
    }

    #[test]
    fn mutated_signature_fails_verification() {
        let sig = payment_signature(SECRET, ORDER, PAYMENT);
        // Flip one hex digit.
        let mut bytes = sig.into_bytes();
        bytes[0] = if bytes[0] == b'0' { b'1' } else { b'0' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert!(!verify_payment_signature(SECRET, ORDER, PAYMENT, &tampered));
    }

    #[test]
    fn garbage_signatures_fail_closed() {
        assert!(!verify_payment_signature(SECRET, ORDER, PAYMENT, ""));
        assert!(!verify_payment_signature(SECRET, ORDER, PAYMENT, "not-hex!!"));
        // Valid hex, wrong length.
        assert!(!verify_payment_signature(SECRET, ORDER, PAYMENT, "deadbeef"));
    }

    #[test]
    fn separator_is_part_of_the_message() {
        // "a|bc" and "ab|c" must not collide.
        let one = payment_signature(SECRET, "a", "bc");
        let two = payment_signature(SECRET, "ab", "c");
        assert_ne!(one, two);
    }
}
