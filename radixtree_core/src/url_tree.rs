//! Radix tree keyed by URLs with their host labels reversed.
//!
//! Domain names grow more specific from right to left, so
//! `http://foo.example.com/` and `http://bar.example.com/` share nothing past
//! the scheme. Storing the host as `com.example.foo` lets every subdomain of a
//! site share one prefix in the tree.

use crate::{Error, RadixTree, TreeConfig};
use log::debug;
use std::borrow::Cow;
use std::fmt;
use url::{Host, Position, Url};

/// Reverses the dot-separated labels of a host name. IPv6 literals (anything
/// holding a `:`) and IPv4-style names (numeric last label) come back as is.
pub fn normalize_domain(domain: &str) -> Cow<'_, str> {
    if domain.contains(':') {
        return Cow::Borrowed(domain);
    }
    let last = domain.rsplit('.').next().unwrap_or_default();
    if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
        return Cow::Borrowed(domain);
    }
    if !domain.contains('.') {
        return Cow::Borrowed(domain);
    }
    Cow::Owned(domain.rsplit('.').collect::<Vec<_>>().join("."))
}

/// Canonical form of `input` with its domain host reversed.
///
/// Parsing follows the WHATWG URL rules of the `url` crate: scheme and host
/// are lowercased, a default port is dropped and special schemes get at least
/// a `/` path. Userinfo, an explicit non-default port, path, query and
/// fragment are kept. Input that does not parse as an absolute URL is
/// returned unchanged.
pub fn normalize_url(input: &str) -> Cow<'_, str> {
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(e) => {
            debug!("[URL] keeping \"{}\" verbatim: {}", input, e);
            return Cow::Borrowed(input);
        }
    };
    if let Some(Host::Domain(domain)) = url.host() {
        return Cow::Owned(format!(
            "{}{}{}",
            &url[..Position::BeforeHost],
            normalize_domain(domain),
            &url[Position::AfterHost..]
        ));
    }
    Cow::Owned(url.into())
}

/// A [`RadixTree`] whose keys pass through [`normalize_url`] on every call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlTree {
    tree: RadixTree,
}

impl UrlTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            tree: RadixTree::with_config(config),
        }
    }

    /// Inserts `url`. Returns `Ok(false)` when its normal form was already stored.
    pub fn insert(&mut self, url: &str) -> Result<bool, Error> {
        self.tree.insert(normalize_url(url).as_bytes())
    }

    pub fn exists(&self, url: &str) -> bool {
        self.tree.exists(normalize_url(url).as_bytes())
    }

    pub fn remove(&mut self, url: &str) -> bool {
        self.tree.remove(normalize_url(url).as_bytes())
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The underlying tree, holding normalized keys.
    pub fn tree(&self) -> &RadixTree {
        &self.tree
    }

    pub fn serialize(&self) -> String {
        self.tree.serialize()
    }
}

impl fmt::Display for UrlTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tree, f)
    }
}
