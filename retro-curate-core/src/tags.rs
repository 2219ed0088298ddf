//! Tag extraction from No-Intro style dump names.
//!
//! Dump names encode release metadata in parenthesised segments:
//! ```text
//! Game Name (USA, Europe) (Rev 1) (Beta)
//! ```
//! Each segment becomes one tag, or several when it holds a comma list.

/// Extract the ordered tag list from a dump name (extension already removed).
///
/// Only innermost segments are recognised: in `A (x (y) z)` the enclosing
/// segment is skipped and only `y` is emitted. An unbalanced `(` is ignored.
///
/// ```
/// use retro_curate_core::tags::extract_tags;
///
/// assert_eq!(extract_tags("Game (USA, Europe) (Rev 1)"), vec!["USA", "Europe", "Rev 1"]);
/// assert!(extract_tags("Plain Name").is_empty());
/// ```
pub fn extract_tags(name: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut open: Option<usize> = None;

    for (i, ch) in name.char_indices() {
        match ch {
            '(' => open = Some(i + ch.len_utf8()),
            ')' => {
                if let Some(start) = open.take() {
                    push_segment(&name[start..i], &mut tags);
                }
            }
            _ => {}
        }
    }

    tags
}

fn push_segment(content: &str, tags: &mut Vec<String>) {
    if content.contains(',') {
        for part in content.split(',') {
            let part = part.trim();
            if !part.is_empty() {
                tags.push(part.to_string());
            }
        }
    } else {
        let whole = content.trim();
        if !whole.is_empty() {
            tags.push(whole.to_string());
        }
    }
}

/// The parenthesis-stripped base name: everything before the first `(`, trimmed.
pub fn base_name(name: &str) -> &str {
    match name.find('(') {
        Some(pos) => name[..pos].trim(),
        None => name.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_comma_segments() {
        assert_eq!(
            extract_tags("Demo (USA, Beta) (Proto)"),
            vec!["USA", "Beta", "Proto"]
        );
    }

    #[test]
    fn no_segments() {
        assert!(extract_tags("Tetris").is_empty());
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(extract_tags("G (  Rev 1 ) ( En , Fr )"), vec!["Rev 1", "En", "Fr"]);
    }

    #[test]
    fn repeated_tags_are_kept() {
        assert_eq!(extract_tags("G (USA) (USA)"), vec!["USA", "USA"]);
    }

    #[test]
    fn nested_segment_only_yields_inner() {
        assert_eq!(extract_tags("G (a (b) c) (USA)"), vec!["b", "USA"]);
    }

    #[test]
    fn unbalanced_open_is_ignored() {
        assert_eq!(extract_tags("G (USA) (Rev"), vec!["USA"]);
        assert_eq!(extract_tags("G ) (USA)"), vec!["USA"]);
    }

    #[test]
    fn empty_segments_emit_nothing() {
        assert!(extract_tags("G () ( , )").is_empty());
    }

    #[test]
    fn base_name_strips_tags() {
        assert_eq!(base_name("Game (USA) (Rev 1)"), "Game");
        assert_eq!(base_name("  Game  "), "Game");
        assert_eq!(base_name("Game [b] (USA)"), "Game [b]");
        assert_eq!(base_name("(Prototype) Thing"), "");
    }

    #[test]
    fn extract_rebuild_extract_is_stable() {
        let names = [
            "Game (USA, Europe) (Rev 1)",
            "Other (Japan) (En,Fr,De) (Beta)",
            "Plain",
            "Dup (USA) (USA)",
        ];
        for name in names {
            let tags = extract_tags(name);
            let rebuilt = tags.iter().fold(base_name(name).to_string(), |mut acc, t| {
                acc.push_str(&format!(" ({t})"));
                acc
            });
            let mut again = extract_tags(&rebuilt);
            let mut original = tags.clone();
            again.sort();
            original.sort();
            assert_eq!(again, original, "{name}");
        }
    }
}
