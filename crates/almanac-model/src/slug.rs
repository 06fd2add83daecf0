use std::borrow::Cow;

use crate::ingest::RawRow;

/// Canonicalize a column name into a slug, preserving case.
///
/// A trailing footnote marker (`*...*`, with any whitespace before it) is
/// dropped, characters outside ASCII alphanumerics / `_` / `-` / space are
/// removed, and runs of spaces in the trimmed remainder become single `-`.
pub fn slugify_same_case(name: &str) -> String {
    let name = strip_footnote_marker(name);

    let mut cleaned = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | ' ') {
            cleaned.push(ch);
        }
    }

    let trimmed = cleaned.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut pending_gap = false;
    for ch in trimmed.chars() {
        if ch == ' ' {
            pending_gap = true;
            continue;
        }
        if pending_gap {
            out.push('-');
            pending_gap = false;
        }
        out.push(ch);
    }
    out
}

/// Lowercasing variant of [`slugify_same_case`].
pub fn slugify(name: &str) -> String {
    slugify_same_case(&name.to_lowercase())
}

/// Remove the first `*...*` footnote marker together with the whitespace
/// immediately before it. The marker must enclose at least one character.
fn strip_footnote_marker(name: &str) -> Cow<'_, str> {
    let Some(open) = name.find('*') else {
        return Cow::Borrowed(name);
    };
    let Some(close_rel) = name[open + 1..].rfind('*') else {
        return Cow::Borrowed(name);
    };
    if close_rel == 0 {
        return Cow::Borrowed(name);
    }
    let close = open + 1 + close_rel;
    let prefix = name[..open].trim_end();
    Cow::Owned(format!("{}{}", prefix, &name[close + 1..]))
}

/// Rename every field whose name differs from its slug, across all rows, in
/// place.
///
/// The rename set is computed from the **first row only** and applied
/// uniformly; callers must guarantee schema uniformity across rows, since a
/// field absent from the first row is never considered for renaming. When no
/// field needs renaming, the input is left untouched (no-op fast path).
pub fn standardize_slugs(rows: &mut [RawRow]) {
    let Some(first) = rows.first() else {
        return;
    };

    let renames: Vec<(String, String)> = first
        .keys()
        .filter_map(|name| {
            let slug = slugify_same_case(name);
            (slug != *name).then(|| (name.clone(), slug))
        })
        .collect();
    if renames.is_empty() {
        return;
    }

    for row in rows.iter_mut() {
        for (name, slug) in &renames {
            if let Some(value) = row.remove(name) {
                row.insert(slug.clone(), value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_case_and_joins_words() {
        assert_eq!(slugify_same_case("Country"), "Country");
        assert_eq!(slugify_same_case("GDP per capita"), "GDP-per-capita");
        assert_eq!(slugify_same_case("  Pop (millions)  "), "Pop-millions");
    }

    #[test]
    fn drops_footnote_markers() {
        assert_eq!(slugify_same_case("Deaths *per 100k*"), "Deaths");
        assert_eq!(slugify_same_case("A*B"), "AB");
    }

    #[test]
    fn is_idempotent() {
        for input in ["Country", "GDP-per-capita", "pop_2020"] {
            assert_eq!(slugify_same_case(input), input);
        }
    }
}
