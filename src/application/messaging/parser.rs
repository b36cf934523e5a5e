//! Message parser - recognizes prefixed command invocations in raw text

/// A recognized command invocation: name plus raw argument tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub tokens: Vec<String>,
}

/// Parses incoming message text against a configured command prefix
pub struct Parser {
    prefix: String,
}

impl Parser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns `None` for text without the prefix (not an error, just
    /// not addressed to the bot) and for a bare prefix with no name.
    pub fn parse(&self, text: &str) -> Option<Invocation> {
        let rest = text.strip_prefix(&self.prefix)?;
        let mut tokens = tokenize(rest).into_iter();
        let name = tokens.next()?;
        Some(Invocation {
            name,
            tokens: tokens.collect(),
        })
    }
}

/// Whitespace tokenization with double-quote grouping, so arguments like
/// list descriptions can contain spaces.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_prefixed_text_is_ignored() {
        let parser = Parser::new("!");
        assert_eq!(parser.parse("hello there"), None);
        assert_eq!(parser.parse(""), None);
    }

    #[test]
    fn bare_prefix_is_ignored() {
        let parser = Parser::new("!");
        assert_eq!(parser.parse("!"), None);
        assert_eq!(parser.parse("!   "), None);
    }

    #[test]
    fn parses_name_and_tokens() {
        let parser = Parser::new("!");
        let inv = parser.parse("!hot_posts programming 5").unwrap();
        assert_eq!(inv.name, "hot_posts");
        assert_eq!(inv.tokens, vec!["programming", "5"]);
    }

    #[test]
    fn quoted_tokens_keep_spaces() {
        let parser = Parser::new("!");
        let inv = parser.parse("!create_list reading \"long form articles\"").unwrap();
        assert_eq!(inv.tokens, vec!["reading", "long form articles"]);
    }

    #[test]
    fn multi_char_prefix() {
        let parser = Parser::new("bb:");
        assert_eq!(parser.parse("bb:ping").unwrap().name, "ping");
        assert_eq!(parser.parse("!ping"), None);
    }
}
