/// Lowercase a document and split it into whitespace-delimited tokens.
///
/// This is the whole tokenization story for line-oriented corpora: no
/// stemming, no punctuation stripping. Anything smarter belongs to the
/// caller before the tokens reach a `Dictionary`.
pub fn simple_tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(|t| t.to_lowercase()).collect()
}
