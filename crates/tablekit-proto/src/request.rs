//! Request parameters for list and get operations.

use crate::error::Error;
use std::collections::BTreeMap;

/// Parameter carrying the explicit property allow-list.
pub const PARAM_PROPS: &str = "props";
/// Parameter carrying the 1-based page number.
pub const PARAM_PAGE: &str = "page";
/// Parameter carrying the page length.
pub const PARAM_MAX: &str = "max";

/// Client request parameters.
///
/// `props`, `page` and `max` drive projection and paging; every other
/// parameter is kept verbatim in `filters` so entity security hooks can
/// inspect it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Explicit property allow-list.
    pub props: Option<Vec<String>>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Page length.
    pub max: Option<u32>,
    /// Remaining parameters.
    pub filters: BTreeMap<String, String>,
}

impl RequestParams {
    /// Create empty request parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from decoded query-string pairs.
    ///
    /// `props` may be repeated or comma separated. Empty `page`/`max`
    /// values are treated as absent.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                PARAM_PROPS | "props[]" => {
                    let props = params.props.get_or_insert_with(Vec::new);
                    props.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(String::from),
                    );
                }
                PARAM_PAGE => params.page = parse_count(key, value)?,
                PARAM_MAX => params.max = parse_count(key, value)?,
                _ => {
                    params.filters.insert(key.to_string(), value.to_string());
                }
            }
        }
        Ok(params)
    }

    /// Set the property allow-list.
    pub fn with_props<S: Into<String>>(mut self, props: impl IntoIterator<Item = S>) -> Self {
        self.props = Some(props.into_iter().map(Into::into).collect());
        self
    }

    /// Set the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page length.
    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    /// Add a free-form parameter.
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Get a free-form parameter.
    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    /// The explicit allow-list, if one was given and is non-empty.
    pub fn property_names(&self) -> Option<&[String]> {
        self.props.as_deref().filter(|p| !p.is_empty())
    }
}

fn parse_count(name: &str, value: &str) -> Result<Option<u32>, Error> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| Error::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    })
}
