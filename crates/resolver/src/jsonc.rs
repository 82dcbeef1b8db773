/// Blank out `//` and `/* */` comments and trailing commas so that the text parses as plain JSON.
///
/// Blanked characters are replaced by spaces and newlines are kept, so parser errors still
/// point at the right line and column. A comma is trailing when only whitespace and comments
/// separate it from the next `}` or `]`. String literals are left alone.
pub fn strip_comments(text: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        String { escaped: bool },
        LineComment,
        BlockComment { star: bool },
    }

    let mut output = String::with_capacity(text.len());
    let mut state = State::Code;
    let mut trailing_comma: Option<usize> = None;
    let mut chars = text.chars().peekable();

    while let Some(char) = chars.next() {
        state = match state {
            State::Code => match (char, chars.peek()) {
                ('"', _) => {
                    trailing_comma = None;
                    output.push(char);
                    State::String { escaped: false }
                }
                ('/', Some('/')) => {
                    chars.next();
                    output.push_str("  ");
                    State::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    output.push_str("  ");
                    State::BlockComment { star: false }
                }
                _ => {
                    if let (Some(comma), '}' | ']') = (trailing_comma, char) {
                        output.replace_range(comma..comma + 1, " ");
                    }
                    if !char.is_whitespace() {
                        trailing_comma = (char == ',').then_some(output.len());
                    }
                    output.push(char);
                    State::Code
                }
            },
            State::String { escaped } => {
                output.push(char);
                match char {
                    '"' if !escaped => State::Code,
                    '\\' => State::String { escaped: !escaped },
                    _ => State::String { escaped: false },
                }
            }
            State::LineComment => {
                if char == '\n' {
                    output.push(char);
                    State::Code
                } else {
                    output.push(' ');
                    State::LineComment
                }
            }
            State::BlockComment { star } => {
                output.push(if char == '\n' { '\n' } else { ' ' });
                match char {
                    '/' if star => State::Code,
                    '*' => State::BlockComment { star: true },
                    _ => State::BlockComment { star: false },
                }
            }
        };
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use text_block_macros::text_block;

    #[test]
    fn plain_json_is_unchanged() {
        let text = r#"{ "dependencies": { "a": "1.0.0" } }"#;
        assert_eq!(strip_comments(text), text);
    }

    #[test]
    fn strip_line_and_block_comments() {
        let text = text_block! {
            "{"
            "  // pinned until the v5 migration lands"
            "  \"dependencies\": {"
            "    \"react\": \"17.0.2\", /* see #123 */"
            "    \"url\": \"https://example.com/*not-a-comment*/\""
            "  }"
            "  /* multi"
            "     line */"
            "}"
        };
        let stripped = strip_comments(text);
        assert_eq!(stripped.lines().count(), text.lines().count());
        let value: Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(
            value,
            json!({
                "dependencies": {
                    "react": "17.0.2",
                    "url": "https://example.com/*not-a-comment*/",
                },
            }),
        );
    }

    #[test]
    fn strip_trailing_commas() {
        let text = r#"{"dependencies":{"a":"1.0.0",},}"#;
        assert_eq!(strip_comments(text), r#"{"dependencies":{"a":"1.0.0" } }"#);

        let text = text_block! {
            "{"
            "  \"list\": [1, 2, /* last */],"
            "  \"text\": \",}\", // keep"
            "}"
        };
        let value: Value = serde_json::from_str(&strip_comments(text)).unwrap();
        assert_eq!(value, json!({ "list": [1, 2], "text": ",}" }));
    }

    #[test]
    fn escaped_quotes_stay_in_strings() {
        let text = r#"{ "a": "say \"// hi\"" } // trailing"#;
        let value: Value = serde_json::from_str(&strip_comments(text)).unwrap();
        assert_eq!(value, json!({ "a": "say \"// hi\"" }));
    }
}
