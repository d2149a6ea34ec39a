/// One input line broken into words, with any comment held aside verbatim.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceLine<'a> {
    pub words: Vec<String>,
    /// Everything from the first '(' to the end of the line.
    pub comment: &'a str,
}
impl<'a> SourceLine<'a> {
    pub fn split(input: &'a str) -> Self {
        let (code, comment) = match input.find('(') {
            Some(start) => input.split_at(start),
            None => (input, ""),
        };
        SourceLine {
            words: code.split_whitespace().map(|word| word.trim().to_string()).collect(),
            comment,
        }
    }
    /// Removes every word starting with `head`, returning the removed words in order.
    pub fn take_words(&mut self, head: char) -> Vec<String> {
        let (taken, kept): (Vec<String>, Vec<String>) = std::mem::take(&mut self.words).into_iter().partition(|word| word.starts_with(head));
        self.words = kept;
        taken
    }
    pub fn word_strs(&self) -> impl Iterator<Item = &str> + Clone {
        self.words.iter().map(String::as_str)
    }
}

/// Parses the number following a word's letter, e.g. `10.5` from `F10.5`.
pub fn word_value<T: std::str::FromStr>(word: &str) -> Option<T> {
    let mut chars = word.chars();
    chars.next()?;
    chars.as_str().parse().ok()
}
