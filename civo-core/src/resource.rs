use serde::{de::DeserializeOwned, Deserialize};

/// A remote object served by the Civo API
///
/// Implemented by every model in [`models`](crate::models) that the generic
/// client `Api` can address by collection path.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Human readable kind, used in logs and error contexts
    const KIND: &'static str;

    /// The collection path, e.g. `/v2/volumes`
    const URL_PATH: &'static str;

    /// The identifier the API assigned on creation
    fn id(&self) -> &str;

    /// The user facing name of the object
    ///
    /// For networks this is the label, for instances the hostname.
    fn name(&self) -> &str;
}

/// A list response
///
/// Some collections are paginated and wrapped, others are served as plain arrays.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum ListResponse<T> {
    /// A single page of a paginated collection
    Paginated {
        /// 1-indexed page number
        page: u32,
        /// Total page count
        pages: u32,
        /// Items on this page
        #[serde(default = "Vec::new")]
        items: Vec<T>,
    },
    /// A complete unwrapped collection
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    /// The page that follows this one, if any
    pub fn next_page(&self) -> Option<u32> {
        match self {
            Self::Paginated { page, pages, .. } if page < pages => Some(page + 1),
            _ => None,
        }
    }

    /// Take the items of this response
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Paginated { items, .. } | Self::Plain(items) => items,
        }
    }
}

/// The body returned by create calls
///
/// Creation responses differ per kind; all of them carry the new identifier.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Created {
    /// Identifier of the created object
    pub id: String,
    /// Free text result, usually `success`
    #[serde(default)]
    pub result: Option<String>,
}
