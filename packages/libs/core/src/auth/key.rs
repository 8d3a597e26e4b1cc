//! 토큰 키 재료 파싱
//!
//! 설정값 형식: `kid:material` 또는 `material`
//!
//! material은 다음 중 하나여야 합니다:
//! - 64자리 hex
//! - 32바이트의 base64url(no padding) / base64
//! - 정확히 32바이트인 원문 문자열

use base64::{engine::general_purpose, Engine as _};

/// PASETO v4.local 대칭 키
#[derive(Clone)]
pub struct TokenKey {
    pub kid: Option<String>,
    pub(crate) bytes: [u8; 32],
}

impl TokenKey {
    /// 설정 문자열에서 키 파싱
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();

        if let Some((kid, material)) = trimmed.split_once(':') {
            if !kid.is_empty() {
                if let Some(bytes) = parse_key_material(material) {
                    return Some(Self {
                        kid: Some(kid.to_string()),
                        bytes,
                    });
                }
            }
        }

        parse_key_material(trimmed).map(|bytes| Self { kid: None, bytes })
    }
}

impl std::fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKey")
            .field("kid", &self.kid)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

fn parse_key_material(raw: &str) -> Option<[u8; 32]> {
    let trimmed = raw.trim();

    if trimmed.len() == 64 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
        let bytes = decode_hex(trimmed)?;
        return bytes.as_slice().try_into().ok();
    }

    if let Ok(bytes) = general_purpose::URL_SAFE_NO_PAD.decode(trimmed) {
        if bytes.len() == 32 {
            return bytes.as_slice().try_into().ok();
        }
    }

    if let Ok(bytes) = general_purpose::STANDARD.decode(trimmed) {
        if bytes.len() == 32 {
            return bytes.as_slice().try_into().ok();
        }
    }

    let raw_bytes = trimmed.as_bytes();
    if raw_bytes.len() == 32 {
        return raw_bytes.try_into().ok();
    }

    None
}

fn decode_hex(input: &str) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }

    let mut bytes = Vec::with_capacity(input.len() / 2);
    let mut chars = input.chars();
    while let (Some(h), Some(l)) = (chars.next(), chars.next()) {
        let hi = h.to_digit(16)?;
        let lo = l.to_digit(16)?;
        bytes.push(((hi << 4) | lo) as u8);
    }
    Some(bytes)
}
