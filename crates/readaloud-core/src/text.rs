//! Text preprocessing for reading aloud.
//!
//! Splits document text into sentence-sized units, one synthesis + playback
//! step each, and assembles multi-chapter text for "read from here" requests.

use serde::{Deserialize, Serialize};

/// Fragments with this many characters or fewer are punctuation noise
/// (`"."`, `"--"`, `"1."`), not content.
const MAX_NOISE_CHARS: usize = 2;

/// Text read by the "test voice" action.
pub const SAMPLE_TEXT: &str =
    "Olá! Este é um teste do leitor de livros digitais. O sistema está funcionando perfeitamente.";

/// One unit of text read aloud as a single synthesis + playback step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Position in the session, `0..N` without gaps.
    pub index: usize,

    /// Trimmed sentence text, including its closing punctuation.
    pub text: String,
}

/// Split text into sentences.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace (or at the end of
/// the input). Pieces are trimmed and anything of two characters or fewer is
/// dropped. Empty or whitespace-only input yields an empty list.
#[must_use]
pub fn segment(text: &str) -> Vec<Sentence> {
    split_sentences(text)
        .into_iter()
        .map(str::trim)
        .filter(|piece| piece.chars().count() > MAX_NOISE_CHARS)
        .enumerate()
        .map(|(index, piece)| Sentence {
            index,
            text: piece.to_string(),
        })
        .collect()
}

/// Join chapters into one text, each introduced by its title.
///
/// Produces `"<title>. <text>"` per chapter, separated by a space, so the
/// title is read as its own sentence. Chapters without text are skipped.
pub fn compose_chapters<'a, I>(chapters: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    chapters
        .into_iter()
        .filter(|(_, body)| !body.trim().is_empty())
        .map(|(title, body)| {
            let title = title.trim();
            if title.is_empty() {
                body.trim().to_string()
            } else {
                format!("{title}. {}", body.trim())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cut `text` after every `.`/`!`/`?` that is followed by whitespace.
///
/// The whitespace run after the punctuation is consumed; whitespace elsewhere
/// stays inside the piece.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }

        let end = i + c.len_utf8();
        let mut resume = end;
        while let Some(&(j, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            resume = j + next.len_utf8();
            chars.next();
        }

        if resume > end {
            pieces.push(&text[start..end]);
            start = resume;
        }
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}
