use super::luhn;
use crate::error::{BankError, Result};
use rand::Rng;

/// How the last digit of a generated number is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumMode {
    /// A uniformly random digit. Such numbers usually fail Luhn validation.
    Random,
    #[default]
    Luhn,
}

/// Layout of an issued card number: `MII ‖ IIN ‖ AIN ‖ CHECK`.
///
/// A `CardFormat` can only be built with a non-empty account segment, so
/// every generator created from it is infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFormat {
    mii: u8,
    iin: String,
    total_length: usize,
    checksum: ChecksumMode,
}

impl Default for CardFormat {
    fn default() -> Self {
        Self {
            mii: 4,
            iin: "00000".to_string(),
            total_length: 16,
            checksum: ChecksumMode::Luhn,
        }
    }
}

impl CardFormat {
    pub fn new(
        mii: u8,
        iin: impl Into<String>,
        total_length: usize,
        checksum: ChecksumMode,
    ) -> Result<Self> {
        let iin = iin.into();
        if mii > 9 {
            return Err(BankError::Configuration(format!(
                "MII must be a single digit, got {mii}"
            )));
        }
        if !iin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BankError::Configuration(format!(
                "IIN must contain digits only, got '{iin}'"
            )));
        }
        // MII and check digit take one position each.
        if total_length <= iin.len() + 2 {
            return Err(BankError::Configuration(format!(
                "length {total_length} leaves no room for an account identifier after a {}-digit prefix",
                iin.len() + 1
            )));
        }
        Ok(Self {
            mii,
            iin,
            total_length,
            checksum,
        })
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn checksum(&self) -> ChecksumMode {
        self.checksum
    }

    /// Issuer prefix, `MII ‖ IIN`.
    pub fn prefix(&self) -> String {
        format!("{}{}", self.mii, self.iin)
    }

    pub fn ain_length(&self) -> usize {
        self.total_length - self.iin.len() - 2
    }

    /// Whether `number` could be a receiver: right length, digits only and a
    /// correct Luhn check digit, whatever mode this format issues with.
    pub fn accepts(&self, number: &str) -> bool {
        number.len() == self.total_length && luhn::is_valid(number)
    }
}

/// Draws card numbers and PINs for a [`CardFormat`].
#[derive(Debug, Clone, Default)]
pub struct NumberGenerator {
    format: CardFormat,
}

impl NumberGenerator {
    pub fn new(format: CardFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &CardFormat {
        &self.format
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let mut number = self.format.prefix();
        number.reserve(self.format.total_length - number.len());

        // Digit by digit is uniform over all zero-padded AINs and has no
        // upper bound on the segment length.
        for _ in 0..self.format.ain_length() {
            number.push(char::from(b'0' + rng.gen_range(0..10u8)));
        }

        let check = match self.format.checksum {
            ChecksumMode::Luhn => luhn::check_digit(&number),
            ChecksumMode::Random => rng.gen_range(0..10u8),
        };
        number.push(char::from(b'0' + check));
        number
    }

    pub fn generate_pin<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        format!("{:04}", rng.gen_range(0..=9999u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_default_format() {
        let format = CardFormat::default();
        assert_eq!(format.prefix(), "400000");
        assert_eq!(format.ain_length(), 9);
        assert_eq!(format.checksum(), ChecksumMode::Luhn);
    }

    #[test]
    fn test_generated_numbers_follow_layout() {
        let generator = NumberGenerator::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let number = generator.generate(&mut rng);
            assert_eq!(number.len(), 16);
            assert!(number.starts_with('4'));
            assert_eq!(&number[1..6], "00000");
            assert!(luhn::is_valid(&number), "{number} should pass Luhn");
        }
    }

    #[test]
    fn test_custom_issuer() {
        let format = CardFormat::new(5, "12345", 19, ChecksumMode::Luhn).unwrap();
        let number = NumberGenerator::new(format.clone()).generate(&mut StdRng::seed_from_u64(1));
        assert_eq!(number.len(), 19);
        assert!(number.starts_with("512345"));
        assert!(format.accepts(&number));
    }

    #[test]
    fn test_random_checksum_keeps_layout() {
        let format = CardFormat::new(4, "00000", 16, ChecksumMode::Random).unwrap();
        let generator = NumberGenerator::new(format);
        let mut rng = StdRng::seed_from_u64(42);
        let numbers: Vec<String> = (0..100).map(|_| generator.generate(&mut rng)).collect();
        assert!(numbers.iter().all(|n| n.len() == 16 && n.starts_with("400000")));
        // A random check digit is right about one time in ten.
        assert!(numbers.iter().any(|n| !luhn::is_valid(n)));
    }

    #[test]
    fn test_impossible_length_is_rejected() {
        assert!(matches!(
            CardFormat::new(4, "00000", 7, ChecksumMode::Luhn),
            Err(BankError::Configuration(_))
        ));
        assert!(CardFormat::new(4, "00000", 8, ChecksumMode::Luhn).is_ok());
    }

    #[test]
    fn test_malformed_issuer_is_rejected() {
        assert!(matches!(
            CardFormat::new(12, "00000", 16, ChecksumMode::Luhn),
            Err(BankError::Configuration(_))
        ));
        assert!(matches!(
            CardFormat::new(4, "00a00", 16, ChecksumMode::Luhn),
            Err(BankError::Configuration(_))
        ));
    }

    #[test]
    fn test_pin_is_zero_padded() {
        let generator = NumberGenerator::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let pin = generator.generate_pin(&mut rng);
            assert_eq!(pin.len(), 4);
            assert!(pin.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_accepts_checks_length() {
        let format = CardFormat::default();
        assert!(format.accepts("4000003305160034"));
        // Valid Luhn, wrong length.
        assert!(!format.accepts("18"));
        assert!(!format.accepts("40000033051600341"));
    }
}
