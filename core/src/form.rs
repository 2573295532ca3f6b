//! Request parameter encodings: URL query strings and structured
//! `multipart/form-data` forms.
//!
//! A `MultipartForm` only records its fields and file parts. The executor
//! turns it into a wire body with its HTTP library's multipart encoder.

use crate::params::Params;

/// Content type sent with every file part.
pub const FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Percent-encoded `name=value&...` string. Empty when `params` is empty.
pub fn encode_query(params: &Params) -> String {
    params
        .iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(&value.to_form_value())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// A binary file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub name: String,
    pub filename: String,
    pub content: Vec<u8>,
}

/// Text fields plus file parts, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every scalar in `params`, rendered with `to_form_value`.
    pub fn from_params(params: &Params) -> Self {
        let mut form = Self::new();
        for (name, value) in params.iter() {
            form.text(name, value.to_form_value());
        }
        form
    }

    pub fn text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn file(&mut self, part: FilePart) {
        self.files.push(part);
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// First text field called `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn file_part(&self, name: &str) -> Option<&FilePart> {
        self.files.iter().find(|part| part.name == name)
    }
}
