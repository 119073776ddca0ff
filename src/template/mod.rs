//! Renders inventory documents with the operator's `--data` variables.
//!
//! Referencing a variable that `--data` does not define is an error.
//! Variables may be written `{{ key }}` or with a leading dot, `{{ .key }}`.

use std::borrow::Cow;

use minijinja::{Environment, UndefinedBehavior};

use crate::error::{Error, Result};

pub struct TemplateService {
    env: Environment<'static>,
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateService {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Parses `--data`. An empty string is an empty object; anything but a
    /// JSON object is rejected.
    pub fn parse_data(data: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
        let data = if data.trim().is_empty() { "{}" } else { data };
        match serde_json::from_str::<serde_json::Value>(data) {
            Ok(serde_json::Value::Object(map)) => Ok(map),
            Ok(_) => Err(Error::validation("--data must be a JSON object")),
            Err(e) => Err(Error::validation(format!("--data is not valid JSON: {e}"))),
        }
    }

    pub fn exec(&self, name: &str, template: &str, data: &str) -> Result<String> {
        let vars = Self::parse_data(data)?;
        let source = strip_field_dots(template);
        Ok(self.env.render_named_str(name, &source, &vars)?)
    }
}

/// Rewrites `.key` references inside `{{ }}` tags to `key`. Attribute
/// access (`a.b`), numbers and string literals are left alone.
fn strip_field_dots(template: &str) -> Cow<'_, str> {
    if !template.contains("{{") || !template.contains('.') {
        return Cow::Borrowed(template);
    }

    let chars: Vec<char> = template.chars().collect();
    let mut out = String::with_capacity(template.len());
    let mut in_tag = false;
    let mut quote: Option<char> = None;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        if !in_tag {
            if c == '{' && next == Some('{') {
                in_tag = true;
                out.push_str("{{");
                i += 2;
                continue;
            }
        } else if let Some(q) = quote {
            if c == q {
                quote = None;
            }
        } else if c == '"' || c == '\'' {
            quote = Some(c);
        } else if c == '}' && next == Some('}') {
            in_tag = false;
            out.push_str("}}");
            i += 2;
            continue;
        } else if c == '.' {
            let after_separator = out
                .chars()
                .last()
                .is_some_and(|p| p.is_whitespace() || matches!(p, '{' | '(' | ',' | '|' | '-'));
            let starts_name = next.is_some_and(|n| n.is_alphabetic() || n == '_');
            if after_separator && starts_name {
                i += 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    Cow::Owned(out)
}
