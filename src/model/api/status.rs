use serde::{Deserialize, Serialize};

/// The JSON body returned by successful writes and the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
    /// ID of a newly created resource, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
}

impl StatusBody {
    pub fn ok() -> Self {
        Self::new("ok")
    }

    pub fn created(id: impl ToString) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Self::ok()
        }
    }

    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            id: None,
        }
    }
}
