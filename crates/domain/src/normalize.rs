//! Name normalization
//!
//! Every matching strategy compares names in their normalized form. Normalization folds case,
//! turns separators into single spaces, singularizes words and replaces common spellings by a
//! canonical one. Applying it twice yields the same result as applying it once.

const SYNONYMS: [(&str, &str); 15] = [
    ("bb", "barbell"),
    ("chinup", "chin up"),
    ("db", "dumbbell"),
    ("dumbell", "dumbbell"),
    ("kb", "kettlebell"),
    ("pressup", "push up"),
    ("pullup", "pull up"),
    ("pushup", "push up"),
    ("rdl", "romanian deadlift"),
    ("situp", "sit up"),
    ("skullcrusher", "skull crusher"),
    ("stepup", "step up"),
    ("ups", "up"),
    ("ohp", "overhead press"),
    ("jumpingjack", "jumping jack"),
];

const STOP_WORDS: [&str; 8] = ["a", "an", "and", "for", "of", "on", "the", "with"];

#[must_use]
pub fn normalize(raw: &str) -> String {
    fold_separators(raw)
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(singularize)
        .map(|word| {
            SYNONYMS
                .iter()
                .find(|(from, _)| *from == word)
                .map_or(word.clone(), |(_, to)| (*to).to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keyword tokens of a normalized name in order of appearance, without duplicates and stop
/// words.
#[must_use]
pub fn keywords(normalized: &str) -> Vec<&str> {
    let mut keywords = Vec::new();
    for word in normalized.split(' ') {
        if !word.is_empty() && !STOP_WORDS.contains(&word) && !keywords.contains(&word) {
            keywords.push(word);
        }
    }
    keywords
}

/// Human-readable name for an input which could not be matched, e.g. `"Dynamic Elevators"`
/// for `"dynamic_elevators"`.
#[must_use]
pub fn display_name(raw: &str) -> String {
    fold_separators(raw)
        .split(' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_separators(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            folded.push(c);
        } else if c == '\'' || c == '’' {
            continue;
        } else if !folded.ends_with(' ') {
            folded.push(' ');
        }
    }
    folded.trim().to_string()
}

fn singularize(word: &str) -> String {
    if word.chars().count() <= 3
        || !word.ends_with('s')
        || word.ends_with("ss")
        || word.ends_with("us")
        || word.ends_with("is")
    {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{stem}y");
    }

    word[..word.len() - 1].to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("mountain_climbers", "mountain climber")]
    #[case("Mountain-Climbers", "mountain climber")]
    #[case("  Barbell   Bench  Press ", "barbell bench press")]
    #[case("pushups", "push up")]
    #[case("Push-Ups", "push up")]
    #[case("DB curls", "dumbbell curl")]
    #[case("Farmer's Walk", "farmer walk")]
    #[case("dumbbell flies", "dumbbell fly")]
    #[case("abs", "abs")]
    #[case("cross", "cross")]
    #[case("triceps", "tricep")]
    #[case("RDLs", "romanian deadlift")]
    #[case("sit-ups (weighted)", "sit up weighted")]
    #[case("", "")]
    #[case("___", "")]
    fn test_normalize(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize(raw), expected);
    }

    #[rstest]
    #[case("mountain_climbers")]
    #[case("Pushups")]
    #[case("stepups and pullups")]
    #[case("KB swings")]
    #[case("dbs")]
    #[case("ladies' presses")]
    #[case("series of flies")]
    #[case("ÜBUNGEN für Bäuche")]
    #[case("3x10 squats @ 80%")]
    #[case("ssss sss ss s")]
    fn test_normalize_idempotent(#[case] raw: &str) {
        let normalized = normalize(raw);
        assert_eq!(normalize(&normalized), normalized);
    }

    #[test]
    fn test_synonym_targets_are_normalized() {
        for (from, to) in SYNONYMS {
            assert_eq!(normalize(from), to);
            assert_eq!(normalize(to), to);
        }
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            keywords("push up with a push up on bench"),
            vec!["push", "up", "bench"]
        );
        assert!(keywords("").is_empty());
    }

    #[rstest]
    #[case("dynamic_elevators", "Dynamic Elevators")]
    #[case("  reverse-hyper ", "Reverse Hyper")]
    #[case("", "")]
    fn test_display_name(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(display_name(raw), expected);
    }
}
