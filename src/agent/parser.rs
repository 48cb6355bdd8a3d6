//! Action parser
//!
//! Turns raw model output into exactly one [`Decision`]. The model is asked to
//! either finish with `Final Answer: ...` or put a call of the form
//! `ToolName(input)` on its first line. Parsing never fails: anything that
//! does not fit the convention becomes [`Decision::Unrecognized`].

/// Marker the model uses to signal it is done
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// What the model asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The model produced its answer
    FinalAnswer(String),
    /// The model wants a tool run with the given argument
    ToolCall { name: String, argument: String },
    /// The output matched neither convention; carries the raw text
    Unrecognized(String),
}

impl Decision {
    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Decision::FinalAnswer(_) => "final_answer",
            Decision::ToolCall { .. } => "tool_call",
            Decision::Unrecognized(_) => "unrecognized",
        }
    }
}

/// Parser bound to the set of registered tool names
#[derive(Debug, Clone, Default)]
pub struct ActionParser {
    tool_names: Vec<String>,
}

impl ActionParser {
    /// Create a parser that recognises calls to the given tools
    pub fn new<I, S>(tool_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tool_names: tool_names
                .into_iter()
                .map(Into::into)
                .filter(|name: &String| !name.is_empty())
                .collect(),
        }
    }

    /// Parse raw model output
    pub fn parse(&self, text: &str) -> Decision {
        if let Some(idx) = text.rfind(FINAL_ANSWER_MARKER) {
            let answer = &text[idx + FINAL_ANSWER_MARKER.len()..];
            return Decision::FinalAnswer(answer.trim().to_string());
        }

        let first_line = text.trim_start().lines().next().unwrap_or("");
        if first_line.trim().is_empty() {
            return Decision::Unrecognized(text.to_string());
        }

        let Some((name, open)) = self.find_call(first_line) else {
            return Decision::Unrecognized(text.to_string());
        };

        match matching_paren(first_line, open) {
            Some(close) => Decision::ToolCall {
                name: name.to_string(),
                argument: first_line[open + 1..close].to_string(),
            },
            None => Decision::Unrecognized(text.to_string()),
        }
    }

    /// Earliest `Name(` on the line.
    /// Returns the tool name and the byte offset of its opening parenthesis.
    fn find_call<'a>(&'a self, line: &str) -> Option<(&'a str, usize)> {
        let mut best: Option<(usize, &'a str, usize)> = None;

        for name in &self.tool_names {
            for (start, _) in line.match_indices(name.as_str()) {
                if !starts_identifier(line, start) {
                    continue;
                }

                let after = &line[start + name.len()..];
                let gap = after.len() - after.trim_start().len();
                if !after[gap..].starts_with('(') {
                    continue;
                }

                let open = start + name.len() + gap;
                if best.map_or(true, |(s, _, _)| start < s) {
                    best = Some((start, name.as_str(), open));
                }
                break;
            }
        }

        best.map(|(_, name, open)| (name, open))
    }
}

/// A tool name only counts if it is not the tail of a longer word
fn starts_identifier(line: &str, start: usize) -> bool {
    line[..start]
        .chars()
        .next_back()
        .map_or(true, |c| !(c.is_alphanumeric() || c == '_'))
}

/// Byte offset of the `)` closing the `(` at `open`, counting nesting
fn matching_paren(line: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in line[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ActionParser {
        ActionParser::new(["StockData", "Search"])
    }

    #[test]
    fn test_final_answer() {
        assert_eq!(
            parser().parse("Final Answer: The price is $5"),
            Decision::FinalAnswer("The price is $5".to_string())
        );
        assert_eq!(
            parser().parse("Final Answer: X \n  "),
            Decision::FinalAnswer("X".to_string())
        );
    }

    #[test]
    fn test_final_answer_wins_over_tool_call() {
        let text = "StockData(AAPL)\nFinal Answer: no need";
        assert_eq!(
            parser().parse(text),
            Decision::FinalAnswer("no need".to_string())
        );
    }

    #[test]
    fn test_final_answer_uses_last_marker() {
        let text = "Final Answer: draft\nThought: better\nFinal Answer: done";
        assert_eq!(parser().parse(text), Decision::FinalAnswer("done".to_string()));
    }

    #[test]
    fn test_tool_call() {
        assert_eq!(
            parser().parse("StockData(AAPL)"),
            Decision::ToolCall {
                name: "StockData".to_string(),
                argument: "AAPL".to_string()
            }
        );
    }

    #[test]
    fn test_tool_call_embedded_in_line() {
        assert_eq!(
            parser().parse("\n  Action: Search (rust borrow checker)\nObservation: ..."),
            Decision::ToolCall {
                name: "Search".to_string(),
                argument: "rust borrow checker".to_string()
            }
        );
    }

    #[test]
    fn test_argument_is_verbatim_and_nested() {
        assert_eq!(
            parser().parse("Search( f(x) and (y) )"),
            Decision::ToolCall {
                name: "Search".to_string(),
                argument: " f(x) and (y) ".to_string()
            }
        );
    }

    #[test]
    fn test_first_candidate_wins() {
        assert_eq!(
            parser().parse("Search(AAPL news) then StockData(AAPL)"),
            Decision::ToolCall {
                name: "Search".to_string(),
                argument: "AAPL news".to_string()
            }
        );
    }

    #[test]
    fn test_prefix_name_does_not_shadow_longer_name() {
        let parser = ActionParser::new(["Stock", "StockData"]);
        assert_eq!(
            parser.parse("StockData(MSFT)"),
            Decision::ToolCall {
                name: "StockData".to_string(),
                argument: "MSFT".to_string()
            }
        );
    }

    #[test]
    fn test_name_must_not_be_word_suffix() {
        assert!(matches!(
            parser().parse("MyStockData(AAPL)"),
            Decision::Unrecognized(_)
        ));
    }

    #[test]
    fn test_unclosed_paren_is_unrecognized() {
        let text = "StockData(AAPL\nmore)";
        assert_eq!(
            parser().parse(text),
            Decision::Unrecognized(text.to_string())
        );
    }

    #[test]
    fn test_unknown_tool_is_unrecognized() {
        assert!(matches!(
            parser().parse("Weather(Paris)"),
            Decision::Unrecognized(_)
        ));
        // Tool name only on a later line does not count
        assert!(matches!(
            parser().parse("Let me think.\nStockData(AAPL)"),
            Decision::Unrecognized(_)
        ));
        // Name mentioned without a call
        assert!(matches!(
            parser().parse("I could use StockData for that"),
            Decision::Unrecognized(_)
        ));
    }

    #[test]
    fn test_name_is_case_sensitive() {
        assert!(matches!(
            parser().parse("stockdata(AAPL)"),
            Decision::Unrecognized(_)
        ));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(parser().parse(""), Decision::Unrecognized(String::new()));
        assert!(matches!(parser().parse("  \n "), Decision::Unrecognized(_)));
    }

    #[test]
    fn test_parser_without_tools() {
        let parser = ActionParser::default();
        assert!(matches!(
            parser.parse("StockData(AAPL)"),
            Decision::Unrecognized(_)
        ));
    }
}
