use serde::{Deserialize, Serialize};

/// Current path and locale as handed over by the routing context. Both are
/// treated as opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRoute {
    pub path: String,
    pub locale: String,
}

impl PageRoute {
    pub fn new(path: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            locale: locale.into(),
        }
    }
}
