use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;
use thiserror::Error;

/// Width of every short code. Codes shorter than this are left-padded
/// with `'0'` (the zero digit of the alphabet).
pub const SHORT_CODE_LEN: usize = 7;

/// Number of distinct codes: `62^7`.
const CODE_SPACE: i64 = 3_521_614_606_208;

/// Errors produced when constructing or parsing a [`ShortCode`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortCodeError {
    #[error("id {0} is outside the encodable range [0, 62^7)")]
    OutOfRange(i64),
    #[error("short code must be exactly {SHORT_CODE_LEN} characters, got {0}")]
    BadLength(usize),
    #[error("short code contains a character outside the base-62 alphabet: '{0}'")]
    InvalidCharacter(String),
}

/// A fixed-width base-62 short code.
///
/// The alphabet is `0-9 a-z A-Z`, most significant character first, so a
/// code is the 7-digit base-62 rendering of a 64-bit ID. The decoded ID is
/// kept alongside the text so lookups never re-parse.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ShortCode {
    code: SmolStr,
    id: i64,
}

impl ShortCode {
    /// Encodes an allocator-issued ID as a short code.
    pub fn from_id(id: i64) -> Result<Self, ShortCodeError> {
        if !(0..CODE_SPACE).contains(&id) {
            return Err(ShortCodeError::OutOfRange(id));
        }
        let digits = base62::encode_alternative(id as u64);
        let mut code = String::with_capacity(SHORT_CODE_LEN);
        for _ in digits.len()..SHORT_CODE_LEN {
            code.push('0');
        }
        code.push_str(&digits);
        Ok(Self {
            code: SmolStr::new(code),
            id,
        })
    }

    /// Parses a short code received over the wire.
    ///
    /// The input must be exactly seven base-62 characters.
    pub fn parse(code: &str) -> Result<Self, ShortCodeError> {
        if code.len() != SHORT_CODE_LEN {
            return Err(ShortCodeError::BadLength(code.len()));
        }
        let id = base62::decode_alternative(code)
            .map_err(|_| ShortCodeError::InvalidCharacter(code.to_string()))?;
        Ok(Self {
            code: SmolStr::new(code),
            id: id as i64,
        })
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Returns the 64-bit ID this code encodes.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Generates the full shortened URL for the configured public base.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/short/{}", base_url.trim_end_matches('/'), self.code)
    }
}

impl std::fmt::Debug for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShortCode").field(&self.code).finish()
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code)
    }
}

impl Serialize for ShortCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.code.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShortCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
