//! ASCII sentence framing: `$...*HH\r\n` with an XOR checksum over
//! everything between `$` and `*` (§4.1, §6).

/// XOR of every byte in `body` (the bytes strictly between `$` and `*`).
pub fn xor_checksum(body: &[u8]) -> u8 {
    body.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Validate a complete sentence (without the trailing `\r\n`) and, if the
/// checksum matches, return the talker+sentence-type tag (e.g. "GPGGA").
pub fn validate(sentence: &[u8]) -> Option<String> {
    if sentence.first() != Some(&b'$') {
        return None;
    }
    let star = sentence.iter().rposition(|&b| b == b'*')?;
    if sentence.len() < star + 3 {
        return None;
    }
    let body = &sentence[1..star];
    let hex = std::str::from_utf8(&sentence[star + 1..star + 3]).ok()?;
    let claimed = u8::from_str_radix(hex, 16).ok()?;
    if xor_checksum(body) != claimed {
        return None;
    }
    let tag_end = body.iter().position(|&b| b == b',').unwrap_or(body.len());
    Some(String::from_utf8_lossy(&body[..tag_end]).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_checksum_of_known_sentence_body_matches() {
        // $GPGGA,...*47 is a commonly cited textbook example body/checksum.
        let body = b"GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        let star = body.iter().rposition(|&b| b == b'*').unwrap();
        assert_eq!(xor_checksum(&body[..star]), 0x47);
    }

    #[test]
    fn validate_accepts_correct_checksum_and_extracts_tag() {
        let sentence = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        assert_eq!(validate(sentence), Some("GPGGA".to_string()));
    }

    #[test]
    fn validate_rejects_wrong_checksum() {
        let sentence = b"$GPGGA,123519*00";
        assert_eq!(validate(sentence), None);
    }

    #[test]
    fn validate_rejects_missing_dollar_or_star() {
        assert_eq!(validate(b"GPGGA,123519*00"), None);
        assert_eq!(validate(b"$GPGGA,123519"), None);
    }
}
