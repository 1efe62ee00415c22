//! Self-contained `data:` URLs for generated images

use crate::{MuseError, Result};
use base64::{engine::general_purpose, Engine as _};

/// Encode `bytes` as `data:<mime>;base64,<payload>`.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, general_purpose::STANDARD.encode(bytes))
}

/// Split a base64 data URL into its MIME type and decoded bytes.
pub fn parse(url: &str) -> Result<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| MuseError::Decode("not a data URL".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| MuseError::Decode("data URL has no payload".into()))?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| MuseError::Decode("data URL is not base64 encoded".into()))?;

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| MuseError::Decode(format!("invalid data URL payload: {}", e)))?;

    Ok((mime_type.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg() {
        let url = encode("image/jpeg", &[0xff, 0xd8, 0xff]);
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_parse_recovers_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let (mime, decoded) = parse(&encode("image/jpeg", &bytes)).unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse("http://example.com/a.jpg").is_err());
        assert!(parse("data:image/jpeg;base64").is_err());
        assert!(parse("data:image/jpeg,rawtext").is_err());
        assert!(parse("data:image/jpeg;base64,@@@").is_err());
    }
}
