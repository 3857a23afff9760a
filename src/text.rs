use crate::entity::EntityIndex;

static ESCAPES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

pub fn unescape(text: &str) -> String {
    unescape_with_removals(text).0
}

/// Unescapes `text` and moves every entity's indices so they keep pointing
/// at the same characters of the unescaped text.
pub fn unescape_and_slide_entity_indices(text: &str, entities: &mut [&mut dyn EntityIndex]) -> String {
    let (unescaped, removals) = unescape_with_removals(text);
    if removals.is_empty() {
        return unescaped;
    }

    let slide = |index: usize| -> usize {
        let removed: usize = removals
            .iter()
            .take_while(|(at, _)| *at < index)
            .map(|(_, n)| n)
            .sum();
        index.saturating_sub(removed)
    };
    for entity in entities.iter_mut() {
        let (start, end) = (slide(entity.start()), slide(entity.end()));
        entity.set_indices(start, end);
    }

    unescaped
}

/// Returns the unescaped text along with `(char offset in the escaped text,
/// chars removed)` for every escape sequence replaced, in text order.
fn unescape_with_removals(text: &str) -> (String, Vec<(usize, usize)>) {
    let mut unescaped = String::with_capacity(text.len());
    let mut removals = vec![];
    let mut rest = text;
    let mut offset = 0;

    while let Some(c) = rest.chars().next() {
        if c == '&' {
            if let Some((escape, replacement)) = ESCAPES.iter().find(|(e, _)| rest.starts_with(e)) {
                unescaped.push(*replacement);
                // Escapes are ascii, so bytes and chars agree
                removals.push((offset, escape.len() - 1));
                offset += escape.len();
                rest = &rest[escape.len()..];
                continue;
            }
        }
        unescaped.push(c);
        offset += 1;
        rest = &rest[c.len_utf8()..];
    }

    (unescaped, removals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::HashtagEntity;

    #[test]
    fn plain_text_untouched() {
        assert_eq!(unescape("just text"), "just text");
        assert_eq!(unescape("a & b"), "a & b");
        assert_eq!(unescape("&unknown;"), "&unknown;");
    }

    #[test]
    fn unescapes_known_sequences() {
        assert_eq!(unescape("&lt;b&gt; &amp; &quot;q&quot; it&#39;s"), "<b> & \"q\" it's");
    }

    #[test]
    fn slides_indices_after_escapes() {
        // "&lt;3 #rust" -> "<3 #rust"; the hashtag moves three characters left
        let mut tag = HashtagEntity {
            start: 6,
            end: 11,
            text: "rust".to_owned(),
        };
        let mut entities: [&mut dyn EntityIndex; 1] = [&mut tag];
        let text = unescape_and_slide_entity_indices("&lt;3 #rust", &mut entities);
        assert_eq!(text, "<3 #rust");
        assert_eq!((tag.start, tag.end), (3, 8));
        assert_eq!(text.chars().skip(tag.start).take(tag.end - tag.start).collect::<String>(), "#rust");
    }

    #[test]
    fn entities_before_escape_stay_put() {
        let mut tag = HashtagEntity {
            start: 0,
            end: 3,
            text: "ab".to_owned(),
        };
        let mut entities: [&mut dyn EntityIndex; 1] = [&mut tag];
        let text = unescape_and_slide_entity_indices("#ab &amp; c", &mut entities);
        assert_eq!(text, "#ab & c");
        assert_eq!((tag.start, tag.end), (0, 3));
    }

    #[test]
    fn counts_code_points_not_bytes() {
        let mut tag = HashtagEntity {
            start: 8,
            end: 11,
            text: "go".to_owned(),
        };
        let mut entities: [&mut dyn EntityIndex; 1] = [&mut tag];
        let text = unescape_and_slide_entity_indices("é&amp;é #go", &mut entities);
        assert_eq!(text, "é&é #go");
        assert_eq!((tag.start, tag.end), (4, 7));
    }
}
