

use std::collections::BTreeSet;


/// Lower-cases `s` and replaces every non-alphabetic character with a space.
///
/// This is the logical key of a concept name and the cleaning step applied to
/// patient phrases before fragmentation.
pub fn normalize_text(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect()
}


/// Distinct whitespace-delimited words of `s`, in sorted order.
pub fn distinct_words(s: &str) -> BTreeSet<&str> {
    s.split_whitespace().collect()
}


pub fn shares_word(a: &str, b: &str) -> bool {
    let words_a = distinct_words(a);
    b.split_whitespace().any(|w| words_a.contains(w))
}


pub fn contains_word(text: &str, word: &str) -> bool {
    text.split_whitespace().any(|w| w == word)
}


#[inline]
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_non_alpha() {
        assert_eq!(normalize_text("Pain, Chest (acute)"), "pain  chest  acute ");
    }

    #[test]
    fn test_normalize_digits_and_case() {
        assert_eq!(normalize_text("Type-2 DIABETES"), "type   diabetes");
    }

    #[test]
    fn test_normalize_expanding_lowercase() {
        assert_eq!(normalize_text("İ"), "i\u{307}");
    }

    #[test]
    fn test_distinct_words_collapses_duplicates() {
        let words = distinct_words("pain in the chest pain");
        assert_eq!(words.len(), 4);
        assert_eq!(words.iter().next(), Some(&"chest"));
    }

    #[test]
    fn test_distinct_words_empty() {
        assert!(distinct_words("   ").is_empty());
    }

    #[test]
    fn test_shares_word() {
        assert!(shares_word("chest pain", "pain"));
        assert!(!shares_word("chest pain", "headache"));
        assert!(!shares_word("chest painful", "pain"));
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("general symptoms", "symptoms"));
        assert!(!contains_word("symptomsx", "symptoms"));
    }

    #[test]
    fn test_safe_truncate_multibyte() {
        assert_eq!(safe_truncate("dolore toracico", 6), "dolore");
        assert_eq!(safe_truncate("hi", 10), "hi");
    }
}
