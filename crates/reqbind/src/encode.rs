//! Encoding a record into query values and path templates.

use crate::binder::Binder;
use crate::contract;
use crate::form::FormValues;
use crate::schema::{Bindable, Source};

impl Binder {
    /// Encodes the form fields of `source` into new query values.
    pub fn to_query<T: Bindable>(&self, source: &T) -> FormValues {
        let mut values = FormValues::new();
        self.encode_to_query(source, &mut values);
        values
    }

    /// Sets one query value per form field of `source`.
    ///
    /// Existing values of the same keys are replaced; other keys are kept.
    pub fn encode_to_query<T: Bindable>(&self, source: &T, values: &mut FormValues) {
        let schema = self.schema::<T>();
        for field in schema.named_fields() {
            if field.source() != Source::Form || field.is_json_only() {
                continue;
            }
            values.set(field.name(), field.stringify(source));
        }
    }

    /// Substitutes the path fields of `source` into a `:name` template.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation if the template lacks a placeholder
    /// for one of the record's path fields.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reqbind::{Bind, Binder};
    ///
    /// #[derive(Bind)]
    /// struct Member {
    ///     #[json = "-"]
    ///     #[form = "org,path"]
    ///     pub org: String,
    ///     #[json = "-"]
    ///     #[form = "id,path"]
    ///     pub id: u64,
    /// }
    ///
    /// let member = Member { org: "acme".into(), id: 7 };
    /// let path = Binder::default().encode_to_path(&member, "/orgs/:org/members/:id");
    /// assert_eq!(path, "/orgs/acme/members/7");
    /// ```
    pub fn encode_to_path<T: Bindable>(&self, source: &T, template: &str) -> String {
        let schema = self.schema::<T>();
        let mut path = template.to_owned();
        for field in schema.named_fields() {
            if field.source() != Source::Path {
                continue;
            }
            let placeholder = format!(":{}", field.name());
            match replace_placeholder(&path, &placeholder, &field.stringify(source)) {
                Some(replaced) => path = replaced,
                None => contract::violation(format!("{placeholder} is not found in {template}")),
            }
        }
        path
    }
}

/// Replaces each `placeholder` not followed by an identifier character.
///
/// Returns `None` when no occurrence was replaced.
fn replace_placeholder(path: &str, placeholder: &str, value: &str) -> Option<String> {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    let mut found = false;
    while let Some(at) = rest.find(placeholder) {
        let after = &rest[at + placeholder.len()..];
        let bounded = after
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        out.push_str(&rest[..at]);
        if bounded {
            out.push_str(value);
            found = true;
        } else {
            out.push_str(placeholder);
        }
        rest = after;
    }
    out.push_str(rest);
    found.then_some(out)
}
