//! Pure normalizers that turn raw contact data into comparison keys.
//! All three are deterministic, side-effect-free, and idempotent.

/// Normalize free text: trim, fold the fixed Turkish diacritic set to ASCII,
/// lowercase, strip everything except word characters / whitespace / `@` /
/// `.` / `-`, collapse internal whitespace to single spaces.
pub fn normalize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.trim().chars() {
        let folded = match c {
            'ç' | 'Ç' => 'c',
            'ğ' | 'Ğ' => 'g',
            'ı' | 'İ' => 'i',
            'ö' | 'Ö' => 'o',
            'ş' | 'Ş' => 's',
            'ü' | 'Ü' => 'u',
            other => other,
        };
        for lc in folded.to_lowercase() {
            if lc.is_ascii_alphanumeric()
                || lc == '_'
                || lc == '@'
                || lc == '.'
                || lc == '-'
                || lc.is_whitespace()
            {
                out.push(lc);
            }
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a phone number: digits only, keeping the last 10 (drops any
/// country code).
pub fn normalize_phone(input: &str) -> String {
    let digits: Vec<char> = input.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(10);
    digits[start..].iter().collect()
}

/// Normalize an email address: lowercase + trim.
pub fn normalize_email(input: &str) -> String {
    input.trim().to_lowercase()
}
