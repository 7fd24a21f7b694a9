//! Text folding and term matching
//!
//! Every dictionary lookup in the pipeline runs on *folded* text: lowercase,
//! Portuguese diacritics removed, punctuation turned into spaces and runs of
//! whitespace collapsed. Dictionary terms are stored already folded.

/// Fold a string for matching ("Salário, R$ 1.500" -> "salario r 1 500")
pub fn fold(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut previous_space = true;

    for character in text.chars().flat_map(char::to_lowercase) {
        let folded = strip_diacritic(character);
        if folded.is_alphanumeric() {
            output.push(folded);
            previous_space = false;
        } else if !previous_space {
            output.push(' ');
            previous_space = true;
        }
    }

    if output.ends_with(' ') {
        output.pop();
    }
    output
}

fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Whole-word (or whole-phrase) containment on already-folded text
///
/// `contains_term("paguei a conta de luz", "conta de luz")` is true,
/// `contains_term("pagou", "pago")` is false.
pub fn contains_term(folded_text: &str, term: &str) -> bool {
    if term.is_empty() || folded_text.len() < term.len() {
        return false;
    }
    folded_text.match_indices(term).any(|(start, _)| {
        let end = start + term.len();
        let before_ok = start == 0 || folded_text.as_bytes()[start - 1] == b' ';
        let after_ok = end == folded_text.len() || folded_text.as_bytes()[end] == b' ';
        before_ok && after_ok
    })
}

/// Find the first term of `terms` present in `folded_text`
pub fn first_match<'a>(folded_text: &str, terms: &[&'a str]) -> Option<&'a str> {
    terms
        .iter()
        .copied()
        .find(|term| contains_term(folded_text, term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents_and_punctuation() {
        assert_eq!(fold("Salário, R$ 1.500!"), "salario r 1 500");
        assert_eq!(fold("  Alimentação   e  Saúde "), "alimentacao e saude");
        assert_eq!(fold("DOAÇÕES"), "doacoes");
        assert_eq!(fold(""), "");
    }

    #[test]
    fn test_contains_term_respects_word_boundaries() {
        let text = fold("Paguei a conta de luz");
        assert!(contains_term(&text, "paguei"));
        assert!(contains_term(&text, "conta de luz"));
        assert!(!contains_term(&text, "pague"));
        assert!(!contains_term(&text, "luz e"));
        assert!(!contains_term(&fold("pagou"), "pago"));
    }

    #[test]
    fn test_contains_term_later_occurrence() {
        // First occurrence is inside a word, second is standalone
        assert!(contains_term("supermercado e mercado", "mercado"));
    }

    #[test]
    fn test_first_match_order() {
        let text = fold("recebi e gastei");
        assert_eq!(first_match(&text, &["gastei", "recebi"]), Some("gastei"));
        assert_eq!(first_match(&text, &["comprei"]), None);
    }
}
