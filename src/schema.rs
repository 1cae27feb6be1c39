//! Declarative parameter schema presented to the workflow host.
//!
//! Nothing here drives behaviour; it describes the configuration surface
//! (which fields exist, their defaults, and when each one is shown) in the
//! JSON shape hosts consume. Defaults are taken from [`crate::config`] so the
//! schema and the builder cannot drift apart.

use crate::config::{DEFAULT_API_URL, DEFAULT_HTML_WRAPPER, DEFAULT_OUTPUT_FILENAME};
use crate::operation::Operation;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Name under which the host stores this node's credentials.
pub const CREDENTIALS_NAME: &str = "gotenbergApi";

/// Top-level node description.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    pub display_name: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub group: Vec<&'static str>,
    pub version: u32,
    pub subtitle: &'static str,
    pub description: &'static str,
    pub defaults: NodeDefaults,
    pub inputs: Vec<&'static str>,
    pub outputs: Vec<&'static str>,
    pub credentials: Vec<CredentialRef>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeDefaults {
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialRef {
    pub name: &'static str,
    pub required: bool,
}

/// Credential type description.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsDescription {
    pub display_name: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Boolean,
    Options,
    Collection,
}

/// One configurable field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub display_name: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub default: Value,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_options: Option<DisplayOptions>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<bool>,
}

/// Visibility rule: show the property only for the listed parameter values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayOptions {
    pub show: BTreeMap<&'static str, Vec<&'static str>>,
}

/// Entry of an `options` list: a choice for `Options`, a nested field for `Collection`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OptionEntry {
    Choice {
        name: &'static str,
        value: &'static str,
        description: &'static str,
    },
    Field(Property),
}

impl Property {
    fn new(kind: PropertyType, name: &'static str, display_name: &'static str, default: Value) -> Self {
        Self {
            display_name,
            name,
            kind,
            default,
            required: false,
            description: None,
            placeholder: None,
            type_options: None,
            display_options: None,
            options: Vec::new(),
        }
    }

    fn string(name: &'static str, display_name: &'static str, default: &str) -> Self {
        Self::new(PropertyType::String, name, display_name, json!(default))
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn describe(mut self, text: &'static str) -> Self {
        self.description = Some(text);
        self
    }

    fn rows(mut self, rows: u32) -> Self {
        self.type_options = Some(TypeOptions {
            rows: Some(rows),
            ..Default::default()
        });
        self
    }

    fn shown_for(mut self, op: Operation) -> Self {
        let mut show = BTreeMap::new();
        show.insert("operation", vec![op.as_str()]);
        self.display_options = Some(DisplayOptions { show });
        self
    }
}

/// The node's parameter schema.
pub fn node_description() -> NodeDescription {
    let operation = Property {
        options: Operation::ALL
            .iter()
            .map(|op| OptionEntry::Choice {
                name: op.display_name(),
                value: op.as_str(),
                description: op.description(),
            })
            .collect(),
        ..Property::new(
            PropertyType::Options,
            "operation",
            "Operation",
            json!(Operation::default().as_str()),
        )
        .required()
    };

    let options = Property {
        placeholder: Some("Add Option"),
        options: vec![
            OptionEntry::Field(
                Property::new(PropertyType::Boolean, "landscape", "Landscape", json!(false))
                    .describe("Set the paper orientation to landscape"),
            ),
            OptionEntry::Field(
                Property::string("nativePageRanges", "Page Ranges", "")
                    .describe("Page ranges to print (e.g., 1-5, 8, 11-13)"),
            ),
        ],
        ..Property::new(PropertyType::Collection, "options", "Additional Options", json!({}))
    };

    NodeDescription {
        display_name: "Gotenberg",
        name: "gotenberg",
        icon: "file:gotenberg.svg",
        group: vec!["transform"],
        version: 1,
        subtitle: r#"={{$parameter["operation"]}}"#,
        description: "Converts documents to PDF using the Gotenberg API",
        defaults: NodeDefaults { name: "Gotenberg" },
        inputs: vec!["main"],
        outputs: vec!["main"],
        credentials: vec![CredentialRef {
            name: CREDENTIALS_NAME,
            required: false,
        }],
        properties: vec![
            Property::string("apiUrl", "Gotenberg API URL", DEFAULT_API_URL)
                .required()
                .describe("The URL of your Gotenberg instance (e.g., http://yourdomain.com:3000)"),
            operation,
            Property::string("url", "URL", "")
                .required()
                .shown_for(Operation::ConvertUrl)
                .describe("The URL to convert to PDF"),
            Property::string("htmlContent", "HTML Content", "")
                .required()
                .rows(5)
                .shown_for(Operation::ConvertHtml)
                .describe("The HTML content to convert to PDF (can be a file path or raw HTML)"),
            Property::string("htmlWrapper", "HTML Wrapper", DEFAULT_HTML_WRAPPER)
                .required()
                .rows(5)
                .shown_for(Operation::ConvertMarkdown)
                .describe("The HTML wrapper that includes the Markdown content"),
            Property::string("markdownContent", "Markdown Content", "")
                .required()
                .rows(5)
                .shown_for(Operation::ConvertMarkdown)
                .describe("The Markdown content to convert to PDF"),
            Property::string("officeFile", "Office File", "")
                .required()
                .shown_for(Operation::ConvertOffice)
                .describe("Path to the Office file (e.g., .docx, .xlsx) or binary data from previous node"),
            Property::string("outputFilename", "Output Filename", DEFAULT_OUTPUT_FILENAME)
                .describe("The name of the output PDF file"),
            options,
        ],
    }
}

/// The credential type the node accepts.
pub fn credentials_description() -> CredentialsDescription {
    CredentialsDescription {
        display_name: "Gotenberg API Credentials",
        name: CREDENTIALS_NAME,
        kind: "credentials",
        properties: vec![
            Property::string("username", "Username", ""),
            Property {
                type_options: Some(TypeOptions {
                    password: Some(true),
                    ..Default::default()
                }),
                ..Property::string("password", "Password", "")
            },
        ],
    }
}
