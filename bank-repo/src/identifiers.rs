//! Random card number and IBAN generation.
//!
//! Each value mixes the current time in milliseconds, a random component and
//! the owner's tax number. Card numbers carry a Luhn check digit and IBANs
//! carry ISO 7064 mod-97 check digits.

use rand::Rng;

use bank_types::{CardNumber, IdentifierGenerator, Iban};

const CARD_BODY_MODULUS: u64 = 100_000_000_000_000; // 10^14
const ACCOUNT_NUMBER_MODULUS: u128 = 10_000_000_000_000_000_000; // 10^19

/// Generates Ukrainian style identifiers: `4…` cards and `UA` IBANs.
#[derive(Debug, Clone)]
pub struct RandomIdentifierGenerator {
    /// 6-digit bank code embedded in every IBAN
    bank_code: String,
}

impl RandomIdentifierGenerator {
    pub const DEFAULT_BANK_CODE: &'static str = "322001";

    /// Returns `None` unless `bank_code` is exactly six digits.
    pub fn new(bank_code: impl Into<String>) -> Option<Self> {
        let bank_code = bank_code.into();
        (bank_code.len() == 6 && bank_code.bytes().all(|b| b.is_ascii_digit()))
            .then_some(Self { bank_code })
    }
}

impl Default for RandomIdentifierGenerator {
    fn default() -> Self {
        Self {
            bank_code: Self::DEFAULT_BANK_CODE.to_string(),
        }
    }
}

impl IdentifierGenerator for RandomIdentifierGenerator {
    fn generate(&self, tax_id: i64) -> (CardNumber, Iban) {
        let mut rng = rand::rng();
        let millis = chrono::Utc::now().timestamp_millis().unsigned_abs();
        let seed = tax_id.unsigned_abs();

        let card_body = rng
            .random_range(0..CARD_BODY_MODULUS)
            .wrapping_add(millis)
            .wrapping_add(seed)
            % CARD_BODY_MODULUS;
        let payload = format!("4{:014}", card_body);
        let card = format!("{}{}", payload, luhn_check_digit(&payload));

        let account_number = rng
            .random_range(0..ACCOUNT_NUMBER_MODULUS)
            .wrapping_add(u128::from(millis))
            .wrapping_add(u128::from(seed))
            % ACCOUNT_NUMBER_MODULUS;
        let bban = format!("{}{:019}", self.bank_code, account_number);
        let iban = format!("UA{:02}{}", iban_check_digits("UA", &bban), bban);

        (
            CardNumber::new(card).expect("generated card number is 16 digits"),
            Iban::new(iban).expect("generated IBAN is 29 alphanumerics"),
        )
    }
}

/// Luhn check digit for a string of decimal digits.
pub fn luhn_check_digit(payload: &str) -> u32 {
    let sum: u32 = payload
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 0 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    (10 - sum % 10) % 10
}

/// ISO 7064 mod-97-10 check digits for an IBAN.
pub fn iban_check_digits(country: &str, bban: &str) -> u32 {
    98 - mod97(&format!("{}{}00", bban, country))
}

/// Remainder of the IBAN numeric form (letters as 10..35) modulo 97.
pub fn mod97(rearranged: &str) -> u32 {
    rearranged.chars().fold(0u32, |acc, c| {
        let value = c.to_digit(36).unwrap_or(0);
        if value >= 10 {
            (acc * 100 + value) % 97
        } else {
            (acc * 10 + value) % 97
        }
    })
}
