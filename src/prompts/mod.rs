//! Prompt模板 - 带命名占位符的模板与渲染

use std::collections::BTreeMap;
use thiserror::Error;

pub mod templates;

pub use templates::{CodeMode, TemplateKey};

/// 模板渲染错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("missing value for placeholder `{0}`")]
    MissingField(String),

    #[error("unclosed placeholder starting at byte {0}")]
    UnclosedPlaceholder(usize),

    #[error("single `}}` encountered at byte {0}")]
    UnmatchedBrace(usize),
}

/// 模板字段绑定
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateFields {
    values: BTreeMap<String, String>,
}

impl TemplateFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式添加字段
    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl ToString) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// 带 `{name}` 占位符的Prompt模板，`{{` 与 `}}` 表示字面量花括号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

/// 模板解析片段
enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Placeholder(&'a str),
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 在模板末尾追加文本，返回新模板
    pub fn append(&self, suffix: &str) -> Self {
        Self::new(format!("{}{}", self.text, suffix))
    }

    /// 模板中出现的占位符名称（按首次出现顺序去重）
    pub fn placeholders(&self) -> Result<Vec<String>, TemplateError> {
        let mut names: Vec<String> = Vec::new();
        for segment in self.parse()? {
            if let Segment::Placeholder(name) = segment
                && !names.iter().any(|n| n == name)
            {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// 使用给定字段渲染模板；多余字段被忽略，缺失字段返回错误
    pub fn render(&self, fields: &TemplateFields) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(self.text.len());
        for segment in self.parse()? {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Brace(c) => rendered.push(c),
                Segment::Placeholder(name) => {
                    let value = fields
                        .get(name)
                        .ok_or_else(|| TemplateError::MissingField(name.to_string()))?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }

    fn parse(&self) -> Result<Vec<Segment<'_>>, TemplateError> {
        let text = self.text.as_str();
        let bytes = text.as_bytes();
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' => {
                    if literal_start < i {
                        segments.push(Segment::Literal(&text[literal_start..i]));
                    }
                    if bytes.get(i + 1) == Some(&b'{') {
                        segments.push(Segment::Brace('{'));
                        i += 2;
                    } else {
                        let close = text[i + 1..]
                            .find('}')
                            .ok_or(TemplateError::UnclosedPlaceholder(i))?;
                        let name = &text[i + 1..i + 1 + close];
                        if name.contains('{') {
                            return Err(TemplateError::UnclosedPlaceholder(i));
                        }
                        segments.push(Segment::Placeholder(name));
                        i += close + 2;
                    }
                    literal_start = i;
                }
                b'}' => {
                    if literal_start < i {
                        segments.push(Segment::Literal(&text[literal_start..i]));
                    }
                    if bytes.get(i + 1) == Some(&b'}') {
                        segments.push(Segment::Brace('}'));
                        i += 2;
                        literal_start = i;
                    } else {
                        return Err(TemplateError::UnmatchedBrace(i));
                    }
                }
                _ => i += 1,
            }
        }
        if literal_start < text.len() {
            segments.push(Segment::Literal(&text[literal_start..]));
        }
        Ok(segments)
    }
}

impl From<&str> for PromptTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_simple_placeholders() {
        let template = PromptTemplate::new("Write about {topic} in {style} style.");
        let fields = TemplateFields::new()
            .with("topic", "ownership")
            .with("style", "Casual");

        assert_eq!(
            template.render(&fields).unwrap(),
            "Write about ownership in Casual style."
        );
    }

    #[test]
    fn test_repeated_placeholder_and_numbers() {
        let template = PromptTemplate::new("```{language}\n{code}\n``` in {language}, {weeks} weeks");
        let fields = TemplateFields::new()
            .with("language", "rust")
            .with("code", "fn main() {}")
            .with("weeks", 4);

        assert_eq!(
            template.render(&fields).unwrap(),
            "```rust\nfn main() {}\n``` in rust, 4 weeks"
        );
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = PromptTemplate::new("json: {{\"a\": {value}}}");
        let fields = TemplateFields::new().with("value", 1);

        assert_eq!(template.render(&fields).unwrap(), "json: {\"a\": 1}");
    }

    #[test]
    fn test_missing_field_is_error() {
        let template = PromptTemplate::new("About {topic}");
        let err = template.render(&TemplateFields::new()).unwrap_err();

        assert_eq!(err, TemplateError::MissingField("topic".to_string()));
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let template = PromptTemplate::new("plain text");
        let fields = TemplateFields::new().with("unused", "x");

        assert_eq!(template.render(&fields).unwrap(), "plain text");
    }

    #[test]
    fn test_malformed_templates() {
        assert_eq!(
            PromptTemplate::new("broken {topic").render(&TemplateFields::new()),
            Err(TemplateError::UnclosedPlaceholder(7))
        );
        assert_eq!(
            PromptTemplate::new("stray } here").render(&TemplateFields::new()),
            Err(TemplateError::UnmatchedBrace(6))
        );
    }

    #[test]
    fn test_placeholders_deduplicated_in_order() {
        let template = PromptTemplate::new("{b} {a} {b} {{literal}}");
        assert_eq!(template.placeholders().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_non_ascii_text_survives() {
        let template = PromptTemplate::new("主题：{topic}。");
        let fields = TemplateFields::new().with("topic", "所有权");
        assert_eq!(template.render(&fields).unwrap(), "主题：所有权。");
    }
}
