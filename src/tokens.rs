use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a token array or an object with a `tokens` array")]
    Shape,
}

/// One lexer token as listed next to the AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(alias = "type", default)]
    pub kind: String,
    #[serde(alias = "text", alias = "lexeme", default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(alias = "col", default)]
    pub column: Option<u32>,
}

impl Token {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: Some(Value::String(value.into())),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn value_text(&self) -> String {
        match &self.value {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn position(&self) -> Option<String> {
        match (self.line, self.column) {
            (Some(line), Some(column)) => Some(format!("{line}:{column}")),
            (Some(line), None) => Some(line.to_string()),
            _ => None,
        }
    }
}

pub fn parse_tokens(input: &str) -> Result<Vec<Token>, TokenError> {
    let value: Value = serde_json::from_str(input)?;
    let list = match value {
        Value::Array(_) => value,
        Value::Object(mut obj) => obj.remove("tokens").ok_or(TokenError::Shape)?,
        _ => return Err(TokenError::Shape),
    };
    if !list.is_array() {
        return Err(TokenError::Shape);
    }
    Ok(serde_json::from_value(list)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_array_with_aliases() {
        let tokens = parse_tokens(
            r#"[{"type":"NUMBER","value":12,"line":1,"col":4},{"kind":"PLUS","text":"+"}]"#,
        )
        .unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].kind, "NUMBER");
        assert_eq!(tokens[0].value_text(), "12");
        assert_eq!(tokens[0].position().as_deref(), Some("1:4"));
        assert_eq!(tokens[1].value_text(), "+");
        assert_eq!(tokens[1].position(), None);
    }

    #[test]
    fn parses_wrapped_tokens() {
        let tokens = parse_tokens(r#"{"tokens":[{"type":"EOF"}]}"#).unwrap();
        assert_eq!(tokens, vec![Token { kind: "EOF".into(), value: None, line: None, column: None }]);
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(matches!(parse_tokens("42"), Err(TokenError::Shape)));
        assert!(matches!(parse_tokens(r#"{"tokens":1}"#), Err(TokenError::Shape)));
        assert!(matches!(parse_tokens("["), Err(TokenError::Json(_))));
    }
}
