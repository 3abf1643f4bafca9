//! Observation acquisition boundary.
//!
//! The decoder only needs "a finite ordered sequence of symbols"; where
//! those symbols come from (a genomic text dump, a token list, a canned
//! demo sequence) is a collaborator concern behind [`ObservationSource`].

/// Anything that can produce a finite, ordered observation sequence.
pub trait ObservationSource {
    /// The symbols, in observation order.
    fn observations(&self) -> Vec<String>;
}

impl ObservationSource for Vec<String> {
    fn observations(&self) -> Vec<String> {
        self.clone()
    }
}

impl ObservationSource for &[&str] {
    fn observations(&self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

/// Free-form text treated as a DNA read: every `a`/`c`/`g`/`t` character
/// (case-insensitive) becomes one observation symbol; everything else
/// (digits, whitespace, headers) is skipped.
#[derive(Debug, Clone)]
pub struct DnaText {
    text: String,
}

impl DnaText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ObservationSource for DnaText {
    fn observations(&self) -> Vec<String> {
        self.text
            .chars()
            .filter_map(|c| match c.to_ascii_lowercase() {
                b @ ('a' | 'c' | 'g' | 't') => Some(b.to_string()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dna_text_keeps_only_bases() {
        let src = DnaText::new("1 acgt\n2 GG xx TT\n");
        assert_eq!(
            src.observations(),
            vec!["a", "c", "g", "t", "g", "g", "t", "t"]
        );
    }

    #[test]
    fn empty_text_is_an_empty_sequence() {
        assert!(DnaText::new("0123 \n").observations().is_empty());
    }

    #[test]
    fn slices_pass_through() {
        let obs: &[&str] = &["walk", "shop"];
        assert_eq!(obs.observations(), vec!["walk", "shop"]);
    }
}
