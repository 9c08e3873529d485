/// Locale-specific letters folded to their base Latin equivalent.
const FOLDS: [(char, char); 6] = [
    ('ç', 'c'),
    ('ğ', 'g'),
    ('ı', 'i'),
    ('ö', 'o'),
    ('ş', 's'),
    ('ü', 'u'),
];

/// Generate an identifier candidate from a product display name.
///
/// Lower-cases the name, folds Turkish letters to ASCII, turns spaces and
/// slashes into hyphens and drops `.`, `,`, `(` and `)`. Other characters are
/// kept as-is. An empty name yields an empty candidate.
#[must_use]
pub fn slug_candidate(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '/' | '\\' => Some('-'),
            '.' | ',' | '(' | ')' => None,
            other => Some(fold(other)),
        })
        .collect()
}

fn fold(c: char) -> char {
    FOLDS
        .iter()
        .find(|(from, _)| *from == c)
        .map_or(c, |(_, to)| *to)
}
