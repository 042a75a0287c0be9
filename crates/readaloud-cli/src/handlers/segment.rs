//! Segment command handler.

use std::path::Path;

use anyhow::Result;
use readaloud_core::{Sentence, segment};

use crate::handlers::read_text;

/// Execute `readaloud segment`.
pub fn execute(file: &Path, json: bool) -> Result<()> {
    let sentences = segment(&read_text(file)?);
    if json {
        println!("{}", serde_json::to_string_pretty(&sentences)?);
    } else {
        print!("{}", render(&sentences));
        println!("{} sentences", sentences.len());
    }
    Ok(())
}

fn render(sentences: &[Sentence]) -> String {
    let width = sentences.len().max(1).to_string().len();
    sentences
        .iter()
        .map(|s| format!("{:>width$}  {}\n", s.index + 1, s.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_numbers() {
        let text = (1..=10)
            .map(|i| format!("Line {i}."))
            .collect::<Vec<_>>()
            .join(" ");
        let rendered = render(&segment(&text));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], " 1  Line 1.");
        assert_eq!(lines[9], "10  Line 10.");
    }
}
