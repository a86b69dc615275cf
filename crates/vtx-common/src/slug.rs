//! Slug derivation and key normalization
//!
//! Slugs are the natural keys of the taxonomy: `vehicle_makes.slug` and
//! `(make_id, slug)` for models. Two rules live here:
//!
//! - [`slugify`] turns a display name into a slug. Cyrillic letters are
//!   transliterated with a fixed table, ASCII letters and digits pass through,
//!   and any other run of characters collapses into a single `-`.
//! - [`normalize_key`] / [`model_name_key`] build the comparison keys used by
//!   the presence check (exact, case-insensitive) and the duplicate detector
//!   (brand prefix stripped).

use crate::error::{Result, TaxonomyError};

/// Separator placed between slug segments
pub const SEPARATOR: char = '-';

/// Transliteration of a single lower-case Cyrillic letter.
///
/// Covers the Russian alphabet plus the Ukrainian and Belarusian letters that
/// appear in marketplace brand names. Hard and soft signs vanish.
fn transliterate(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'ґ' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'є' => "ye",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'і' => "i",
        'ї' => "yi",
        'й' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ў' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

/// Derive a slug from a display name.
///
/// The result contains only `[a-z0-9-]`, never starts or ends with `-` and
/// never contains `--`. Applying `slugify` to its own output is a no-op.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    // Set when a separator is owed before the next alphanumeric segment
    let mut pending_separator = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        let piece: Option<&str> = if c.is_ascii_alphanumeric() {
            None
        } else if let Some(latin) = transliterate(c) {
            if latin.is_empty() {
                continue;
            }
            Some(latin)
        } else {
            pending_separator = true;
            continue;
        };

        if pending_separator && !slug.is_empty() {
            slug.push(SEPARATOR);
        }
        pending_separator = false;

        match piece {
            Some(latin) => slug.push_str(latin),
            None => slug.push(c),
        }
    }

    slug
}

/// Check that a value is already a well-formed slug
pub fn validate(slug: &str) -> Result<()> {
    if slug.is_empty() {
        return Err(TaxonomyError::invalid_slug(slug, "slug cannot be empty"));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == SEPARATOR)
    {
        return Err(TaxonomyError::invalid_slug(slug, "only [a-z0-9-] allowed"));
    }
    if slug.starts_with(SEPARATOR) || slug.ends_with(SEPARATOR) || slug.contains("--") {
        return Err(TaxonomyError::invalid_slug(
            slug,
            "no leading, trailing or repeated hyphens",
        ));
    }
    Ok(())
}

/// Key used by the presence check.
///
/// Slug presence is exact-match: only surrounding whitespace and letter case
/// are ignored.
pub fn normalize_key(slug: &str) -> String {
    slug.trim().to_lowercase()
}

/// Key used to cluster store models that are the same vehicle line.
///
/// The display name is slugified, then a leading brand prefix (the make's
/// slugified name or its slug) is removed, so "BMW 5 Series" and "5-series"
/// under make `bmw` share the key `5-series`.
pub fn model_name_key(make_slug: &str, make_name: &str, model_name: &str) -> String {
    let key = slugify(model_name);
    let prefixes = [slugify(make_name), normalize_key(make_slug)];

    for prefix in prefixes.iter().filter(|p| !p.is_empty()) {
        if let Some(rest) = key
            .strip_prefix(prefix.as_str())
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
        {
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }

    key
}

/// Key used to spot near-duplicate generation codes ("E39", "e-39", "E 39")
pub fn generation_code_key(code: &str) -> String {
    code.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slugify_cyrillic() {
        assert_eq!(slugify("Электроника"), "elektronika");
        assert_eq!(slugify("ВАЗ 2106"), "vaz-2106");
        assert_eq!(slugify("Москвич-412"), "moskvich-412");
        assert_eq!(slugify("Запорожец ЗАЗ-968М"), "zaporozhets-zaz-968m");
    }

    #[test]
    fn test_slugify_signs_are_dropped() {
        assert_eq!(slugify("Объём"), "obyom");
    }

    #[test]
    fn test_slugify_ascii() {
        assert_eq!(slugify("Mercedes-Benz"), "mercedes-benz");
        assert_eq!(slugify("  Alfa   Romeo  "), "alfa-romeo");
        assert_eq!(slugify("Land Rover / Range Rover"), "land-rover-range-rover");
        assert_eq!(slugify("Citroën C4"), "citro-n-c4");
    }

    #[test]
    fn test_slugify_empty_and_symbols() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify("!?"), "");
    }

    #[test]
    fn test_validate() {
        assert!(validate("5-series").is_ok());
        assert!(validate("").is_err());
        assert!(validate("5--series").is_err());
        assert!(validate("-bmw").is_err());
        assert!(validate("BMW").is_err());
    }

    #[test]
    fn test_normalize_key_is_exact() {
        assert_eq!(normalize_key(" 5-Series "), "5-series");
        assert_ne!(normalize_key("5-series"), normalize_key("5 series"));
    }

    #[test]
    fn test_model_name_key_strips_brand_prefix() {
        assert_eq!(model_name_key("bmw", "BMW", "BMW 5 Series"), "5-series");
        assert_eq!(model_name_key("bmw", "BMW", "5-series"), "5-series");
        assert_eq!(
            model_name_key("mercedes-benz", "Mercedes-Benz", "Mercedes-Benz E-Class"),
            "e-class"
        );
    }

    #[test]
    fn test_model_name_key_keeps_bare_brand() {
        // A model literally named after its make keeps its key
        assert_eq!(model_name_key("lada", "Лада", "Лада"), "lada");
    }

    #[test]
    fn test_generation_code_key() {
        assert_eq!(generation_code_key("E39"), "E39");
        assert_eq!(generation_code_key("e-39"), "E39");
        assert_eq!(generation_code_key("E 39 "), "E39");
    }

    proptest! {
        #[test]
        fn prop_slugify_charset(input in "\\PC{0,40}") {
            let slug = slugify(&input);
            prop_assert!(slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(!slug.contains("--"));
        }

        #[test]
        fn prop_slugify_idempotent(input in "\\PC{0,40}") {
            let once = slugify(&input);
            prop_assert_eq!(slugify(&once), once.clone());
            prop_assert_eq!(slugify(&input), once);
        }
    }
}
