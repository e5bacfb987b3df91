use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::Error;

/// Hosting domain of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Feishu,
    Lark,
}

/// Document flavour named in the URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    Docx,
    Wiki,
}

/// A validated `https://<tenant>.<feishu.cn|larksuite.com>/<docx|wiki>/<token>` URL.
///
/// Anything after the token (further path segments, query, fragment) is
/// accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUrl {
    raw: String,
    domain: Domain,
    kind: DocKind,
    token: String,
}

impl DocumentUrl {
    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn kind(&self) -> DocKind {
        self.kind
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for DocumentUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DocumentUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidUrl(s.to_string());
        let url = Url::parse(s).map_err(|_| invalid())?;
        if url.scheme() != "https" {
            return Err(invalid());
        }

        let host = url.host_str().ok_or_else(invalid)?;
        let (tenant, suffix) = host.split_once('.').ok_or_else(invalid)?;
        if tenant.is_empty() || !tenant.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(invalid());
        }
        let domain = match suffix {
            "feishu.cn" => Domain::Feishu,
            "larksuite.com" => Domain::Lark,
            _ => return Err(invalid()),
        };

        let mut segments = url.path_segments().ok_or_else(invalid)?;
        let kind = match segments.next() {
            Some("docx") => DocKind::Docx,
            Some("wiki") => DocKind::Wiki,
            _ => return Err(invalid()),
        };
        let token = segments.next().unwrap_or_default();
        if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }

        Ok(Self {
            raw: s.to_string(),
            domain,
            kind,
            token: token.to_string(),
        })
    }
}
