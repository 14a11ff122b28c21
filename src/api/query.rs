//! List query modifiers
//!
//! A [`ListOption`] rewrites the query string of an outgoing list request.
//! Options write disjoint parameter names, so the order they are applied
//! in does not matter.

use super::http::PreparedRequest;
use crate::model::TagMap;
use std::fmt;
use std::sync::Arc;

/// Prefix of tag filter parameters
pub const TAG_PARAM_PREFIX: &str = "tag:";

/// A composable modification of a list request's query string.
#[derive(Clone)]
pub struct ListOption(Arc<dyn Fn(&mut PreparedRequest) + Send + Sync>);

impl ListOption {
    pub fn new(modify: impl Fn(&mut PreparedRequest) + Send + Sync + 'static) -> Self {
        Self(Arc::new(modify))
    }

    pub fn apply(&self, request: &mut PreparedRequest) {
        (self.0)(request)
    }
}

impl fmt::Debug for ListOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ListOption")
    }
}

/// Only list resources carrying every given tag.
///
/// An empty value matches any value for that key.
pub fn with_tag_filter(tags: &TagMap) -> ListOption {
    let tags = tags.clone();
    ListOption::new(move |request| {
        for (key, value) in &tags {
            request.set_query(&format!("{}{}", TAG_PARAM_PREFIX, key), value);
        }
    })
}

/// Only list resources with this exact name.
pub fn with_name_filter(name: impl Into<String>) -> ListOption {
    let name = name.into();
    ListOption::new(move |request| request.set_query("name", &name))
}

/// Apply options in sequence.
pub fn apply_all(request: &mut PreparedRequest, options: &[ListOption]) {
    for option in options {
        option.apply(request);
    }
}
