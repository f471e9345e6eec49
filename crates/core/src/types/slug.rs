//! URL-safe slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SlugError {
    /// The input string is empty, or empties out after normalization.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[a-z0-9-]`.
    #[error("slug may only contain lowercase letters, digits, and hyphens")]
    InvalidCharacter,
}

/// A URL-safe unique identifier derived from a display name.
///
/// Slugs are the stable identity of categories and products: once a product
/// references a category slug, the slug never changes.
///
/// ## Constraints
///
/// - Length: 1-120 characters
/// - Only lowercase ASCII letters, digits, and hyphens
/// - No leading, trailing, or doubled hyphens
///
/// ## Examples
///
/// ```
/// use carniceria_core::Slug;
///
/// let slug = Slug::derive("Carne de Res").unwrap();
/// assert_eq!(slug.as_str(), "carne-de-res");
///
/// // Accented display names fold to ASCII
/// assert_eq!(Slug::derive("Jamón Serrano").unwrap().as_str(), "jamon-serrano");
///
/// // Round-tripping an existing slug is accepted as-is
/// assert!(Slug::parse("carne-de-res").is_ok());
/// assert!(Slug::parse("Carne de Res").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 120;

    /// Derive a slug from a display name.
    ///
    /// Lowercases, folds common accented characters to ASCII, and collapses
    /// every run of non-alphanumeric characters into a single hyphen.
    ///
    /// # Errors
    ///
    /// Returns [`SlugError::Empty`] if nothing survives normalization, or
    /// [`SlugError::TooLong`] if the result exceeds [`Self::MAX_LENGTH`].
    pub fn derive(name: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(name.len());
        let mut pending_hyphen = false;

        for c in name.chars() {
            for folded in fold_char(c) {
                if folded.is_ascii_alphanumeric() {
                    if pending_hyphen && !out.is_empty() {
                        out.push('-');
                    }
                    pending_hyphen = false;
                    out.push(folded.to_ascii_lowercase());
                } else {
                    pending_hyphen = true;
                }
            }
        }

        if out.is_empty() {
            return Err(SlugError::Empty);
        }
        if out.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(out))
    }

    /// Parse a string that is already in slug form.
    ///
    /// Unlike [`Self::derive`], this rejects input that is not already
    /// normalized rather than fixing it up.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, contains a character
    /// outside `[a-z0-9-]`, or has a leading/trailing/doubled hyphen.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(SlugError::InvalidCharacter);
        }
        if s.starts_with('-') || s.ends_with('-') || s.contains("--") {
            return Err(SlugError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Fold a single character: accented vowels and `ñ`/`ç` map to their ASCII
/// base; everything else passes through unchanged.
fn fold_char(c: char) -> impl Iterator<Item = char> {
    let folded = match c {
        'á' | 'à' | 'ä' | 'â' | 'Á' | 'À' | 'Ä' | 'Â' => 'a',
        'é' | 'è' | 'ë' | 'ê' | 'É' | 'È' | 'Ë' | 'Ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' | 'Í' | 'Ì' | 'Ï' | 'Î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'Ó' | 'Ò' | 'Ö' | 'Ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' | 'Ú' | 'Ù' | 'Ü' | 'Û' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        other => other,
    };
    std::iter::once(folded)
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_basic() {
        assert_eq!(Slug::derive("Carne de Res").unwrap().as_str(), "carne-de-res");
        assert_eq!(Slug::derive("Pollo").unwrap().as_str(), "pollo");
    }

    #[test]
    fn test_derive_collapses_punctuation() {
        assert_eq!(
            Slug::derive("Costilla  (corte especial)").unwrap().as_str(),
            "costilla-corte-especial"
        );
        assert_eq!(Slug::derive("--Res--").unwrap().as_str(), "res");
    }

    #[test]
    fn test_derive_folds_accents() {
        assert_eq!(Slug::derive("Jamón Serrano").unwrap().as_str(), "jamon-serrano");
        assert_eq!(Slug::derive("Ñoqui").unwrap().as_str(), "noqui");
    }

    #[test]
    fn test_derive_empty() {
        assert!(matches!(Slug::derive(""), Err(SlugError::Empty)));
        assert!(matches!(Slug::derive("!!!"), Err(SlugError::Empty)));
    }

    #[test]
    fn test_derive_too_long() {
        let long = "a".repeat(Slug::MAX_LENGTH + 1);
        assert!(matches!(Slug::derive(&long), Err(SlugError::TooLong { .. })));
    }

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("carne-de-res").is_ok());
        assert!(Slug::parse("res2").is_ok());
    }

    #[test]
    fn test_parse_rejects_unnormalized() {
        assert!(Slug::parse("Carne").is_err());
        assert!(Slug::parse("carne res").is_err());
        assert!(Slug::parse("-carne").is_err());
        assert!(Slug::parse("carne-").is_err());
        assert!(Slug::parse("carne--res").is_err());
    }

    #[test]
    fn test_derive_is_parse_stable() {
        let derived = Slug::derive("Arrachera Marinada 500g").unwrap();
        let parsed = Slug::parse(derived.as_str()).unwrap();
        assert_eq!(derived, parsed);
    }

    #[test]
    fn test_serde_roundtrip() {
        let slug = Slug::derive("Carne de Res").unwrap();
        let json = serde_json::to_string(&slug).unwrap();
        assert_eq!(json, "\"carne-de-res\"");

        let parsed: Slug = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, slug);
    }
}
