//! Command template rendering.
//!
//! Templates reference identity fields, attributes and `{value}` by name.
//! A `[...]` segment is optional: it is dropped when any field inside it is
//! unbound. An unbound field outside an optional segment is a
//! [`ConfigError::MissingContext`].

use crate::error::{ConfigError, ConfigResult};
use crate::identity::Identity;
use crate::instance::Attributes;

/// Field bindings for one render.
#[derive(Debug, Clone)]
pub struct Bindings<'a> {
    identity: &'a Identity,
    attributes: Option<&'a Attributes>,
    value: Option<String>,
}

impl<'a> Bindings<'a> {
    /// Binds the identity fields.
    pub fn new(identity: &'a Identity) -> Self {
        Self {
            identity,
            attributes: None,
            value: None,
        }
    }

    /// Also binds every renderable attribute by name.
    pub fn with_attributes(mut self, attributes: &'a Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Binds `{value}`.
    pub fn with_value(mut self, value: Option<String>) -> Self {
        self.value = value;
        self
    }

    fn lookup(&self, field: &str) -> Option<String> {
        if field == "value" {
            return self.value.clone();
        }
        if let Some(value) = self.identity.get(field) {
            return Some(value.to_string());
        }
        self.attributes
            .and_then(|attributes| attributes.get(field))
            .and_then(|value| value.render())
    }

    /// Renders a template.
    pub fn render(&self, template: &str) -> ConfigResult<String> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('[') {
            out.push_str(&self.substitute(&rest[..open])?);
            let tail = &rest[open + 1..];
            let Some(close) = tail.find(']') else {
                rest = &rest[open..];
                break;
            };
            if let Ok(segment) = self.substitute(&tail[..close]) {
                out.push_str(&segment);
            }
            rest = &tail[close + 1..];
        }
        out.push_str(&self.substitute(rest)?);

        Ok(out)
    }

    fn substitute(&self, text: &str) -> ConfigResult<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open + 1..];
            let Some(close) = tail.find('}') else {
                rest = &rest[open..];
                break;
            };
            let field = &tail[..close];
            let value = self.lookup(field).ok_or_else(|| {
                ConfigError::missing_context(
                    self.identity.kind(),
                    self.identity.to_string(),
                    field,
                )
            })?;
            out.push_str(&value);
            rest = &tail[close + 1..];
        }
        out.push_str(rest);

        Ok(out)
    }
}
