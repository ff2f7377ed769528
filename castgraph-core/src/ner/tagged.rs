use crate::core::{Chunk, Mention, PERSON_GROUP};
use crate::text::normalize_whitespace;

const OPEN_TAG: &str = "<PER>";
const CLOSE_TAG: &str = "</PER>";

/// A tagged person span on the tag-stripped word stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSpan {
    /// Words inside the tags
    pub words: Vec<String>,
    /// Character offset of the first word in the stripped text
    pub start: usize,
    /// Character offset just past the last word
    pub end: usize,
}

impl TaggedSpan {
    /// Surface form of the span
    pub fn surface(&self) -> String {
        self.words.join(" ")
    }
}

/// Text annotated with `<PER> … </PER>` tags, split into plain text and spans
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedDocument {
    /// Text with tags removed and whitespace collapsed
    pub text: String,
    /// Tagged spans in reading order
    pub spans: Vec<TaggedSpan>,
}

impl TaggedDocument {
    /// Spans as person mentions on [`TaggedDocument::text`]
    pub fn mentions(&self) -> Vec<Mention> {
        self.spans
            .iter()
            .map(|span| Mention::with_group(span.surface(), span.start, span.end, PERSON_GROUP))
            .collect()
    }

    /// The whole document as a single chunk
    pub fn into_chunk(self) -> Chunk {
        let mentions = self.mentions();
        Chunk::new(self.text, mentions)
    }
}

/// Parse `<PER> … </PER>` annotated text
///
/// Tags may be separated from the words by spaces or glued to them. A closing
/// tag without an opening tag is ignored, an opening tag left open at the end
/// of the text closes there, and empty spans are dropped.
pub fn parse_tagged_text(tagged: &str) -> TaggedDocument {
    let spaced = tagged
        .replace(OPEN_TAG, &format!(" {OPEN_TAG} "))
        .replace(CLOSE_TAG, &format!(" {CLOSE_TAG} "));

    let mut document = TaggedDocument::default();
    let mut position = 0usize;
    let mut open: Option<TaggedSpan> = None;

    for word in spaced.split_whitespace() {
        match word {
            OPEN_TAG => {
                close_span(&mut document, open.take());
                open = Some(TaggedSpan {
                    words: Vec::new(),
                    start: position,
                    end: position,
                });
            },
            CLOSE_TAG => close_span(&mut document, open.take()),
            _ => {
                if !document.text.is_empty() {
                    document.text.push(' ');
                    position += 1;
                }
                if let Some(span) = open.as_mut() {
                    if span.words.is_empty() {
                        span.start = position;
                    }
                    span.words.push(word.to_string());
                }
                document.text.push_str(word);
                position += word.chars().count();
                if let Some(span) = open.as_mut() {
                    span.end = position;
                }
            },
        }
    }
    close_span(&mut document, open);

    document
}

/// Write mentions back into `text` as `<PER> … </PER>` tags
///
/// Offsets are characters on `text`. Tags are separated from the words by a
/// space and the result is whitespace-normalised, so parsing it back with
/// [`parse_tagged_text`] yields the same spans whenever `text` is already
/// normalised and mentions sit on word boundaries. Mentions overlapping an
/// earlier one or reaching past the end of the text are left untagged.
pub fn render_tagged_text(text: &str, mentions: &[Mention]) -> String {
    let char_count = text.chars().count();
    let mut spans: Vec<(usize, usize)> = mentions
        .iter()
        .filter(|m| m.start < m.end && m.end <= char_count)
        .map(|m| (m.start, m.end))
        .collect();
    spans.sort_unstable();

    let mut kept = Vec::with_capacity(spans.len());
    let mut last_end = 0;
    for (start, end) in spans {
        if start >= last_end {
            kept.push((start, end));
            last_end = end;
        }
    }
    if kept.len() < mentions.len() {
        tracing::debug!(
            skipped = mentions.len() - kept.len(),
            "mentions left untagged"
        );
    }

    let mut out = String::with_capacity(text.len() + kept.len() * (OPEN_TAG.len() + CLOSE_TAG.len() + 4));
    let mut pending = kept.into_iter().peekable();
    let mut open_until = None;

    for (position, c) in text.chars().enumerate() {
        if open_until == Some(position) {
            out.push_str(&format!(" {CLOSE_TAG} "));
            open_until = None;
        }
        if open_until.is_none() && pending.peek().is_some_and(|&(start, _)| start == position) {
            if let Some((_, end)) = pending.next() {
                out.push_str(&format!(" {OPEN_TAG} "));
                open_until = Some(end);
            }
        }
        out.push(c);
    }
    if open_until.is_some() {
        out.push_str(&format!(" {CLOSE_TAG}"));
    }

    normalize_whitespace(&out)
}

fn close_span(document: &mut TaggedDocument, span: Option<TaggedSpan>) {
    if let Some(span) = span.filter(|s| !s.words.is_empty()) {
        document.spans.push(span);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::char_slice;

    #[test]
    fn test_parse_spaced_tags() {
        let doc = parse_tagged_text("<PER> Hari Seldon </PER> salua <PER> Cléon </PER> .");
        assert_eq!(doc.text, "Hari Seldon salua Cléon .");
        assert_eq!(doc.spans.len(), 2);
        assert_eq!(doc.spans[0].surface(), "Hari Seldon");
        assert_eq!((doc.spans[1].start, doc.spans[1].end), (18, 23));

        for mention in doc.mentions() {
            assert_eq!(char_slice(&doc.text, mention.start, mention.end), mention.word);
        }
    }

    #[test]
    fn test_parse_glued_and_unbalanced_tags() {
        let doc = parse_tagged_text("</PER> Alors<PER>Dors</PER> répondit à <PER> Hummin");
        assert_eq!(doc.text, "Alors Dors répondit à Hummin");
        let words: Vec<String> = doc.spans.iter().map(TaggedSpan::surface).collect();
        assert_eq!(words, vec!["Dors", "Hummin"]);
    }

    fn spans(mentions: &[Mention]) -> Vec<(&str, usize, usize)> {
        mentions.iter().map(|m| (m.word.as_str(), m.start, m.end)).collect()
    }

    #[test]
    fn test_rendered_tags_parse_back_to_the_same_spans() {
        let text = "Hari Seldon salua Cléon , puis Dors sourit .";
        let mentions = vec![
            Mention::new("Cléon", 18, 23),
            Mention::new("Hari Seldon", 0, 11),
            Mention::new("Dors", 31, 35),
        ];

        let tagged = render_tagged_text(text, &mentions);
        assert_eq!(
            tagged,
            "<PER> Hari Seldon </PER> salua <PER> Cléon </PER> , puis <PER> Dors </PER> sourit ."
        );

        let doc = parse_tagged_text(&tagged);
        assert_eq!(doc.text, text);
        let mut expected = mentions.clone();
        expected.sort_by_key(|m| m.start);
        assert_eq!(spans(&doc.mentions()), spans(&expected));
    }

    #[test]
    fn test_render_closes_span_at_end_of_text() {
        let tagged = render_tagged_text("salut Raych", &[Mention::new("Raych", 6, 11)]);
        assert_eq!(tagged, "salut <PER> Raych </PER>");
    }

    #[test]
    fn test_render_skips_overlapping_and_out_of_range_mentions() {
        let mentions = vec![
            Mention::new("Hari Seldon", 0, 11),
            Mention::new("Seldon", 5, 11),
            Mention::new("Dors", 40, 99),
        ];
        let tagged = render_tagged_text("Hari Seldon arriva", &mentions);
        assert_eq!(tagged, "<PER> Hari Seldon </PER> arriva");
    }

    #[test]
    fn test_empty_spans_are_dropped() {
        let doc = parse_tagged_text("<PER> </PER> personne");
        assert!(doc.spans.is_empty());
        assert_eq!(doc.into_chunk().text, "personne");
    }
}
