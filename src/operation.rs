//! The closed set of conversions the node can request.

use crate::error::GotenbergError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversion mode selected by the user.
///
/// Determines the endpoint path and which content fields are required.
/// The wire names (`convertUrl`, …) are the values stored in the node's
/// `operation` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Render a web page through Chromium. (default)
    #[default]
    ConvertUrl,
    /// Render an HTML document through Chromium.
    ConvertHtml,
    /// Render Markdown inside an HTML wrapper through Chromium.
    ConvertMarkdown,
    /// Convert an Office document through LibreOffice.
    ConvertOffice,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::ConvertUrl,
        Operation::ConvertHtml,
        Operation::ConvertMarkdown,
        Operation::ConvertOffice,
    ];

    /// Parameter value identifying this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ConvertUrl => "convertUrl",
            Operation::ConvertHtml => "convertHtml",
            Operation::ConvertMarkdown => "convertMarkdown",
            Operation::ConvertOffice => "convertOffice",
        }
    }

    /// Service route, relative to the API base URL.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            Operation::ConvertUrl => "/forms/chromium/convert/url",
            Operation::ConvertHtml => "/forms/chromium/convert/html",
            Operation::ConvertMarkdown => "/forms/chromium/convert/markdown",
            Operation::ConvertOffice => "/forms/libreoffice/convert",
        }
    }

    /// Full endpoint URL for `api_url` (which must not end with `/`).
    pub fn endpoint(&self, api_url: &str) -> String {
        format!("{}{}", api_url, self.endpoint_path())
    }

    /// Human-readable name shown in the parameter schema.
    pub fn display_name(&self) -> &'static str {
        match self {
            Operation::ConvertUrl => "Convert URL to PDF",
            Operation::ConvertHtml => "Convert HTML to PDF",
            Operation::ConvertMarkdown => "Convert Markdown to PDF",
            Operation::ConvertOffice => "Convert Office to PDF",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operation::ConvertUrl => "Convert a webpage URL to PDF",
            Operation::ConvertHtml => "Convert an HTML file or string to PDF",
            Operation::ConvertMarkdown => "Convert Markdown files to PDF",
            Operation::ConvertOffice => "Convert Office documents (Word, Excel, etc.) to PDF",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = GotenbergError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| GotenbergError::UnsupportedOperation {
                operation: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints() {
        assert_eq!(
            Operation::ConvertUrl.endpoint("http://localhost:3000"),
            "http://localhost:3000/forms/chromium/convert/url"
        );
        assert_eq!(
            Operation::ConvertHtml.endpoint_path(),
            "/forms/chromium/convert/html"
        );
        assert_eq!(
            Operation::ConvertMarkdown.endpoint_path(),
            "/forms/chromium/convert/markdown"
        );
        assert_eq!(
            Operation::ConvertOffice.endpoint_path(),
            "/forms/libreoffice/convert"
        );
    }

    #[test]
    fn parse_round_trips_wire_names() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "convertImage".parse::<Operation>().unwrap_err();
        assert!(matches!(
            err,
            GotenbergError::UnsupportedOperation { ref operation } if operation == "convertImage"
        ));
        // Wire names are case-sensitive.
        assert!("converturl".parse::<Operation>().is_err());
        assert!("".parse::<Operation>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Operation::ConvertMarkdown).unwrap();
        assert_eq!(json, "\"convertMarkdown\"");
    }
}
