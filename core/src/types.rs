//! Vendor constants and per-operation option structs.
//!
//! # Design
//! Each option struct names the settings one operation accepts and converts
//! into a flat `Params` at the call site, so the pipeline only ever sees
//! name/value pairs. Unset options are omitted from the request.

use std::fmt;

use crate::params::Params;

/// File formats accepted by the Files API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileType {
    Android,
    Ios,
    Gettext,
    Html,
    JavaProperties,
    Yaml,
    Xliff,
    Xml,
    Json,
    Docx,
    Pptx,
    Xlsx,
    Idml,
    Qt,
    Resx,
    PlainText,
    Csv,
    StringsDict,
    Srt,
    Markdown,
    /// Any type this crate has no constant for.
    Other(String),
}

impl FileType {
    pub fn as_str(&self) -> &str {
        match self {
            FileType::Android => "android",
            FileType::Ios => "ios",
            FileType::Gettext => "gettext",
            FileType::Html => "html",
            FileType::JavaProperties => "javaProperties",
            FileType::Yaml => "yaml",
            FileType::Xliff => "xliff",
            FileType::Xml => "xml",
            FileType::Json => "json",
            FileType::Docx => "docx",
            FileType::Pptx => "pptx",
            FileType::Xlsx => "xlsx",
            FileType::Idml => "idml",
            FileType::Qt => "qt",
            FileType::Resx => "resx",
            FileType::PlainText => "plaintext",
            FileType::Csv => "csv",
            FileType::StringsDict => "stringsdict",
            FileType::Srt => "srt",
            FileType::Markdown => "markdown",
            FileType::Other(name) => name,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which translations a download returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalType {
    Pending,
    Published,
    Pseudo,
    ContextMatchingInstrumented,
}

impl RetrievalType {
    pub fn as_str(self) -> &'static str {
        match self {
            RetrievalType::Pending => "pending",
            RetrievalType::Published => "published",
            RetrievalType::Pseudo => "pseudo",
            RetrievalType::ContextMatchingInstrumented => "contextMatchingInstrumented",
        }
    }
}

/// Workflow state assigned to imported translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationState {
    Published,
    PostTranslation,
}

impl TranslationState {
    pub fn as_str(self) -> &'static str {
        match self {
            TranslationState::Published => "PUBLISHED",
            TranslationState::PostTranslation => "POST_TRANSLATION",
        }
    }
}

/// Options for `upload_file`.
#[derive(Debug, Clone, Default)]
pub struct UploadParameters {
    pub authorize: Option<bool>,
    pub locales_to_authorize: Vec<String>,
    pub callback_url: Option<String>,
    /// File directives, sent as `smartling.<name>`.
    pub directives: Vec<(String, String)>,
}

impl UploadParameters {
    pub fn authorize_locale(mut self, locale: impl Into<String>) -> Self {
        self.locales_to_authorize.push(locale.into());
        self
    }

    pub fn directive(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.directives.push((name.into(), value.into()));
        self
    }
}

impl From<UploadParameters> for Params {
    fn from(options: UploadParameters) -> Self {
        let mut params = Params::new();
        if let Some(authorize) = options.authorize {
            params.push("authorize", authorize);
        }
        for locale in options.locales_to_authorize {
            params.push("localeIdsToAuthorize[]", locale);
        }
        if let Some(url) = options.callback_url {
            params.push("callbackUrl", url);
        }
        for (name, value) in options.directives {
            params.push(format!("smartling.{name}"), value);
        }
        params
    }
}

/// Options for `download_file`.
#[derive(Debug, Clone, Default)]
pub struct DownloadParameters {
    pub retrieval_type: Option<RetrievalType>,
    pub include_original_strings: Option<bool>,
}

impl From<DownloadParameters> for Params {
    fn from(options: DownloadParameters) -> Self {
        let mut params = Params::new();
        if let Some(kind) = options.retrieval_type {
            params.push("retrievalType", kind.as_str());
        }
        if let Some(include) = options.include_original_strings {
            params.push("includeOriginalStrings", include);
        }
        params
    }
}

/// Options for `get_list`. Dates are ISO 8601 strings as the API expects.
#[derive(Debug, Clone, Default)]
pub struct ListParameters {
    pub uri_mask: Option<String>,
    pub file_types: Vec<FileType>,
    pub last_uploaded_after: Option<String>,
    pub last_uploaded_before: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl From<ListParameters> for Params {
    fn from(options: ListParameters) -> Self {
        let mut params = Params::new();
        if let Some(mask) = options.uri_mask {
            params.push("uriMask", mask);
        }
        for file_type in options.file_types {
            params.push("fileTypes[]", file_type.as_str());
        }
        if let Some(after) = options.last_uploaded_after {
            params.push("lastUploadedAfter", after);
        }
        if let Some(before) = options.last_uploaded_before {
            params.push("lastUploadedBefore", before);
        }
        if let Some(offset) = options.offset {
            params.push("offset", offset);
        }
        if let Some(limit) = options.limit {
            params.push("limit", limit);
        }
        params
    }
}

/// Options for `get_last_modified`.
#[derive(Debug, Clone, Default)]
pub struct LastModifiedParameters {
    pub last_modified_after: Option<String>,
}

impl From<LastModifiedParameters> for Params {
    fn from(options: LastModifiedParameters) -> Self {
        let mut params = Params::new();
        if let Some(after) = options.last_modified_after {
            params.push("lastModifiedAfter", after);
        }
        params
    }
}
