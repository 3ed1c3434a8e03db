//! Quote- and bracket-aware splitter for query strings.
//!
//! The same splitter is used at every level of the grammar: on `" OR "` to
//! find alternatives, on whitespace to find terms, and on the operator set to
//! break a term into `field op value`.
//!
//! - `"..."` suppresses splitting; the quote characters are dropped.
//! - `(...)` suppresses splitting; the parentheses are dropped. Only a single
//!   level is tracked: an inner `(` is kept as text and the first unescaped
//!   `)` closes the group.
//! - A backslash before a quote, a parenthesis or a separator makes it a
//!   plain character. The backslash itself is kept.

/// Splits `input` on any of `separators`, honouring quotes and brackets.
///
/// Separators are tried longest first at each position. When
/// `keep_separators` is set, each matched separator is emitted as its own
/// token between the surrounding ones.
///
/// # Example
///
/// ```
/// use recall_search::search::split;
///
/// assert_eq!(split("a>=b", &[">="], true), vec!["a", ">=", "b"]);
/// assert_eq!(split(r#"deck:"My Deck" tag:x"#, &[" "], false), vec!["deck:My Deck", "tag:x"]);
/// ```
pub fn split(input: &str, separators: &[&str], keep_separators: bool) -> Vec<String> {
    Splitter::new(input, separators, keep_separators).split()
}

/// Removes one pair of parentheses wrapping the whole input, if any.
///
/// The pair must match: `(a) OR (b)` is left untouched.
pub fn strip_brackets(input: &str) -> &str {
    if input.len() < 2 || !input.starts_with('(') || !input.ends_with(')') {
        return input;
    }

    let chars: Vec<char> = input.chars().collect();
    let last = chars.len() - 1;
    let mut depth = 0usize;
    let mut in_quote = false;

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && chars[i - 1] == '\\' {
            continue;
        }
        match c {
            '"' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i != last {
                    return input;
                }
            }
            _ => {}
        }
    }

    if depth == 0 {
        &input[1..input.len() - 1]
    } else {
        input
    }
}

/// Single-pass splitter over the characters of one input string.
struct Splitter {
    chars: Vec<char>,
    /// Candidate separators, longest first.
    separators: Vec<Vec<char>>,
    keep_separators: bool,
}

impl Splitter {
    fn new(input: &str, separators: &[&str], keep_separators: bool) -> Self {
        let mut separators: Vec<Vec<char>> = separators
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| s.chars().collect())
            .collect();
        separators.sort_by(|a, b| b.len().cmp(&a.len()));

        Self {
            chars: strip_brackets(input).chars().collect(),
            separators,
            keep_separators,
        }
    }

    /// Returns true if the character at `index` is preceded by a backslash.
    fn is_escaped(&self, index: usize) -> bool {
        index > 0 && self.chars[index - 1] == '\\'
    }

    /// Returns the separator starting at `index`, if any.
    fn separator_at(&self, index: usize) -> Option<&[char]> {
        if self.is_escaped(index) {
            return None;
        }
        let rest = &self.chars[index..];
        self.separators
            .iter()
            .find(|sep| rest.starts_with(sep))
            .map(Vec::as_slice)
    }

    fn split(self) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut in_quote = false;
        let mut in_bracket = false;
        let mut i = 0;

        while i < self.chars.len() {
            let c = self.chars[i];

            if !self.is_escaped(i) {
                if c == '"' {
                    in_quote = !in_quote;
                    i += 1;
                    continue;
                }
                if !in_quote && !in_bracket && c == '(' {
                    in_bracket = true;
                    i += 1;
                    continue;
                }
                if !in_quote && in_bracket && c == ')' {
                    in_bracket = false;
                    i += 1;
                    continue;
                }
            }

            if !in_quote && !in_bracket {
                if let Some(sep) = self.separator_at(i) {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    if self.keep_separators {
                        tokens.push(sep.iter().collect());
                    }
                    i += sep.len();
                    continue;
                }
            }

            current.push(c);
            i += 1;
        }

        if !current.is_empty() {
            tokens.push(current);
        }

        tokens
    }
}
