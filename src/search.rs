use regex::{Regex, RegexBuilder};

pub const HIGHLIGHT_TAG: &str = "mark";
pub const HIGHLIGHT_CLASS: &str = "search-highlight";

/// Case-insensitive substring test. The empty term matches everything.
pub fn matches(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(&term.to_lowercase())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    /// Value for `style.display`: empty restores the stylesheet's display.
    pub fn display(self) -> &'static str {
        match self {
            Self::Shown => "",
            Self::Hidden => "none",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterDecision {
    pub visibility: Visibility,
    pub highlight: bool,
}

pub fn decide(text: &str, term: &str) -> FilterDecision {
    let shown = matches(text, term);
    FilterDecision {
        visibility: if shown { Visibility::Shown } else { Visibility::Hidden },
        highlight: shown && !term.is_empty(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Plain(&'a str),
    Mark(&'a str),
}

/// Literal, case-insensitive matcher for one search term.
#[derive(Clone, Debug)]
pub struct Highlighter {
    pattern: Option<Regex>,
}

impl Highlighter {
    pub fn new(term: &str) -> Self {
        if term.is_empty() {
            return Self { pattern: None };
        }
        let pattern = RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build();
        match pattern {
            Ok(pattern) => Self {
                pattern: Some(pattern),
            },
            Err(err) => {
                log::warn!("cannot highlight `{term}`: {err}");
                Self { pattern: None }
            }
        }
    }

    /// Splits `text` into plain and marked runs; `None` when nothing matches.
    pub fn segments<'a>(&self, text: &'a str) -> Option<Vec<Segment<'a>>> {
        let pattern = self.pattern.as_ref()?;
        let mut out = Vec::new();
        let mut cursor = 0usize;
        for found in pattern.find_iter(text) {
            if found.start() == found.end() {
                continue;
            }
            if found.start() > cursor {
                out.push(Segment::Plain(&text[cursor..found.start()]));
            }
            out.push(Segment::Mark(found.as_str()));
            cursor = found.end();
        }
        if cursor == 0 && out.is_empty() {
            return None;
        }
        if cursor < text.len() {
            out.push(Segment::Plain(&text[cursor..]));
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_shows_exactly_matching_subset() {
        let items = ["Linear Algebra", "Organic chemistry", "ALGEBRA II", "Poetry"];
        let shown: Vec<_> = items
            .iter()
            .filter(|t| decide(t, "algebra").visibility == Visibility::Shown)
            .collect();
        assert_eq!(shown, vec![&"Linear Algebra", &"ALGEBRA II"]);
        assert_eq!(decide("Poetry", "algebra").display_pair(), ("none", false));
    }

    #[test]
    fn empty_term_shows_everything_without_highlight() {
        let decision = decide("anything", "");
        assert_eq!(decision.visibility, Visibility::Shown);
        assert!(!decision.highlight);
    }

    #[test]
    fn segments_preserve_original_case() {
        let highlighter = Highlighter::new("alg");
        let segments = highlighter.segments("Algebra and algorithms").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Mark("Alg"),
                Segment::Plain("ebra and "),
                Segment::Mark("alg"),
                Segment::Plain("orithms"),
            ]
        );
    }

    #[test]
    fn metacharacters_match_literally() {
        let highlighter = Highlighter::new("c++ (");
        assert_eq!(
            highlighter.segments("learn C++ (basics)").unwrap(),
            vec![
                Segment::Plain("learn "),
                Segment::Mark("C++ ("),
                Segment::Plain("basics)"),
            ]
        );
        assert!(Highlighter::new(".*").segments("abc").is_none());
    }

    #[test]
    fn no_match_or_empty_term_yields_none() {
        assert!(Highlighter::new("zzz").segments("abc").is_none());
        assert!(Highlighter::new("").segments("abc").is_none());
    }

    impl FilterDecision {
        fn display_pair(self) -> (&'static str, bool) {
            (self.visibility.display(), self.highlight)
        }
    }
}
