//! Country slug generation.

/// Convert a country or region name into its storage slug.
///
/// Drops everything except ASCII letters, hyphens and spaces, turns each
/// space into a hyphen, then lowercases. Runs of spaces are not collapsed:
/// `"A  B"` becomes `"a--b"`. Slugs are part of the natural key in storage,
/// so this must stay stable across releases.
pub fn country_slug(name: &str) -> String {
    name.chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' => Some('-'),
            c if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/slug_tests.rs"]
mod tests;
