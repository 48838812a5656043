//! Prompt builder: system preamble, ranked chunk texts, then the question.

use chunk_store::Chunk;

/// Default instructions sent ahead of the context.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert in the documents provided, which are \
documents pertaining to the state of Peruvian education and youth. Answer the questions based \
on the data in the documents.";

const SEPARATOR: &str = "\n\n";
const QUESTION_LABEL: &str = "Question: ";

/// Builds the prompt for one question.
///
/// Layout: `system`, a blank line, each chunk's content in ranked order
/// separated by blank lines, a blank line, then `Question: <question>`.
/// Nothing is truncated.
///
/// ```
/// use chunk_store::Chunk;
/// use contextor::prompt::assemble;
///
/// let a = Chunk::new("alpha");
/// let b = Chunk::new("beta");
/// assert_eq!(
///     assemble("SYS", &[&a, &b], "why?"),
///     "SYS\n\nalpha\n\nbeta\n\nQuestion: why?"
/// );
/// assert_eq!(assemble("SYS", &[], "why?"), "SYS\n\nQuestion: why?");
/// ```
pub fn assemble(system: &str, ranked: &[&Chunk], question: &str) -> String {
    let body_len: usize = ranked.iter().map(|c| c.content.len() + SEPARATOR.len()).sum();
    let mut out = String::with_capacity(
        system.len() + body_len + SEPARATOR.len() + QUESTION_LABEL.len() + question.len(),
    );

    out.push_str(system);
    out.push_str(SEPARATOR);
    for chunk in ranked {
        out.push_str(&chunk.content);
        out.push_str(SEPARATOR);
    }
    out.push_str(QUESTION_LABEL);
    out.push_str(question);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_with_labeled_question() {
        let c = Chunk::new("Literacy rose in 2019.");
        let p = assemble(DEFAULT_SYSTEM_PROMPT, &[&c], "What happened in 2019?");
        assert!(p.starts_with(DEFAULT_SYSTEM_PROMPT));
        assert!(p.ends_with("\n\nQuestion: What happened in 2019?"));
        assert!(p.contains("\n\nLiteracy rose in 2019.\n\n"));
    }

    #[test]
    fn keeps_ranked_order_and_is_deterministic() {
        let a = Chunk::new("second-ranked");
        let b = Chunk::new("first-ranked");
        let p1 = assemble("S", &[&b, &a], "q");
        let p2 = assemble("S", &[&b, &a], "q");
        assert_eq!(p1, p2);
        assert!(p1.find("first-ranked") < p1.find("second-ranked"));
    }

    #[test]
    fn question_is_verbatim() {
        let p = assemble("S", &[], "  ¿Qué tal?  ");
        assert_eq!(p, "S\n\nQuestion:   ¿Qué tal?  ");
    }
}
