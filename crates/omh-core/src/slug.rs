//! Naming rules that turn Obsidian file names into Hugo-safe identifiers.

/// Strip every character that is not safe in a destination file name.
///
/// Letters, digits, `-` and `_` are kept; everything else (spaces, quotes,
/// punctuation, path separators) is removed rather than replaced.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

/// Convert a name to lower kebab case.
///
/// Words break on whitespace, `_`, `-` and `.`, on a lower-to-upper case
/// change and before the last capital of an acronym (`HTTPServer` becomes
/// `http-server`). Other characters are kept as part of their word.
#[must_use]
pub fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_whitespace() || matches!(c, '_' | '-' | '.') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
    words.join("-")
}

/// Default naming policy: kebab-case the base name, then sanitize.
///
/// Runs of `-` left behind by removed characters are collapsed.
#[must_use]
pub fn convert_name(name: &str) -> String {
    sanitize(&kebab_case(name))
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Heading anchor as Hugo generates it for Markdown headings.
///
/// Letters and digits are lower-cased, each whitespace character becomes
/// `-`, `-` and `_` are kept and all other characters are dropped. Words are
/// not split on case or `.` boundaries: `v1.2 Notes` becomes `v12-notes`.
#[must_use]
pub fn anchorize(heading: &str) -> String {
    let mut anchor = String::with_capacity(heading.len());
    for c in heading.trim().chars() {
        if c.is_alphanumeric() {
            anchor.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            anchor.push('-');
        } else if matches!(c, '-' | '_') {
            anchor.push(c);
        }
    }
    anchor
}
