use rand::{Rng, RngCore};

use crate::models::referralmodel::{REFERRAL_CODE_LENGTH, REFERRAL_CODE_PREFIX};

/// 256 bits from the thread-local CSPRNG, hex encoded.
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Uniform over `CODE_CHARSET`, one draw per character.
pub fn generate_referral_code() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..REFERRAL_CODE_LENGTH)
        .map(|_| char::from(CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())]))
        .collect();

    format!("{}{}", REFERRAL_CODE_PREFIX, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_token_shape() {
        let a = generate_secure_token();
        let b = generate_secure_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_referral_code_format() {
        let pattern = regex::Regex::new(r"^INVITE-[A-Z0-9]{8}$").unwrap();
        for _ in 0..50 {
            let code = generate_referral_code();
            assert!(pattern.is_match(&code), "bad code {}", code);
        }
    }

    #[test]
    fn test_referral_code_chars_are_evenly_drawn() {
        let mut counts = [0usize; 36];
        for _ in 0..2_000 {
            let code = generate_referral_code();
            for byte in code[REFERRAL_CODE_PREFIX.len()..].bytes() {
                let idx = CODE_CHARSET.iter().position(|&c| c == byte).unwrap();
                counts[idx] += 1;
            }
        }

        // 16_000 draws over 36 symbols: about 444 each, 4_444 digits in total
        let digits: usize = counts[26..].iter().sum();
        assert!(counts.iter().all(|&n| n > 250 && n < 650), "{:?}", counts);
        assert!(digits > 3_500, "digits {}", digits);
    }
}
