//! Whole-word matching and highlighted snippets for the in-memory store.

/// Words of context kept around the first match.
const SNIPPET_WORDS: usize = 15;

/// Marks text cut from either side of a snippet.
const ELLIPSIS: &str = "…";

/// Lower-cased search words of a term.
pub(crate) fn terms(term: &str) -> Vec<String> {
    term.split_whitespace()
        .map(|token| split_token(token).1.to_lowercase())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Split a whitespace token into leading punctuation, word and trailing
/// punctuation.
fn split_token(token: &str) -> (&str, &str, &str) {
    let Some(start) = token.find(|c: char| c.is_alphanumeric()) else {
        return (token, "", "");
    };
    let end = token
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_alphanumeric())
        .map_or(token.len(), |(i, c)| i + c.len_utf8());
    (&token[..start], &token[start..end], &token[end..])
}

fn is_match(word: &str, terms: &[String]) -> bool {
    !word.is_empty() && terms.iter().any(|t| *t == word.to_lowercase())
}

/// Number of words in `text` equal to one of `terms`, ignoring case.
///
/// Zero unless every term occurs at least once.
pub(crate) fn match_count(text: &str, terms: &[String]) -> usize {
    let mut seen = vec![false; terms.len()];
    let mut count = 0;
    for token in text.split_whitespace() {
        let word = split_token(token).1.to_lowercase();
        if word.is_empty() {
            continue;
        }
        let mut hit = false;
        for (i, term) in terms.iter().enumerate() {
            if *term == word {
                seen[i] = true;
                hit = true;
            }
        }
        if hit {
            count += 1;
        }
    }
    if seen.iter().all(|s| *s) {
        count
    } else {
        0
    }
}

/// `text` windowed around its first match with every match wrapped in the
/// markers.
pub(crate) fn snippet(text: &str, terms: &[String], start: &str, end: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let (from, to) = if tokens.len() <= SNIPPET_WORDS {
        (0, tokens.len())
    } else {
        let first = tokens
            .iter()
            .position(|token| is_match(split_token(token).1, terms))
            .unwrap_or(0);
        let from = first
            .saturating_sub(SNIPPET_WORDS / 3)
            .min(tokens.len() - SNIPPET_WORDS);
        (from, from + SNIPPET_WORDS)
    };

    let body: Vec<String> = tokens[from..to]
        .iter()
        .map(|token| {
            let (lead, word, trail) = split_token(token);
            if is_match(word, terms) {
                format!("{}{}{}{}{}", lead, start, word, end, trail)
            } else {
                (*token).to_string()
            }
        })
        .collect();

    let mut out = String::new();
    if from > 0 {
        out.push_str(ELLIPSIS);
    }
    out.push_str(&body.join(" "));
    if to < tokens.len() {
        out.push_str(ELLIPSIS);
    }
    out
}
