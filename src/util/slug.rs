use lazy_static::lazy_static;
use regex::Regex;

/// Derives a URL-safe identifier from a display name: lower-cases, collapses
/// every run of non-alphanumeric characters to a single '-' and strips
/// leading/trailing separators. Uniqueness is the repositories' concern, not
/// this function's.
pub fn slugify(name: &str) -> String {
    lazy_static! {
        static ref SEPARATOR_RUNS: Regex = Regex::new("[^a-z0-9]+").unwrap();
    }

    let name = name.to_lowercase();
    SEPARATOR_RUNS
        .replace_all(&name, "-")
        .trim_matches('-')
        .to_owned()
}
