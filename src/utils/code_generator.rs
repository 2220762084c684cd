use rand::Rng;
use rand::distributions::Alphanumeric;

/// One-time passcode in `100000..=999999`
pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(100000..=999999))
}

/// Lower-case alphanumeric suffix for stored file names
pub fn generate_file_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_six_digit_code() {
        for _ in 0..100 {
            let code = generate_six_digit_code();
            assert_eq!(code.len(), 6);
            let code_num: u32 = code.parse().unwrap();
            assert!((100000..=999999).contains(&code_num));
        }
    }

    #[test]
    fn test_file_suffix() {
        let suffix = generate_file_suffix(12);
        assert_eq!(suffix.len(), 12);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }
}
