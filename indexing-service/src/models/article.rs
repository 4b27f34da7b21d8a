//! Inbound webhook body and the rule that turns an article title into the
//! URL submitted for indexing.

use serde_json::Value;

/// Titles announcing a new article start with this literal prefix.
pub const NEW_ARTICLE_PREFIX: &str = "new article:";

/// Path segment inserted between the site URL and the slug.
pub const POSTS_PATH: &str = "/posts/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationRequest {
    pub payload: ArticlePayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticlePayload {
    pub url: String,
    pub title: String,
}

impl NotificationRequest {
    /// Parse a raw request body leniently.
    ///
    /// A body that is not valid JSON yields an empty request. Otherwise each
    /// field is read on its own: keys match case-insensitively (an exact
    /// match wins), and a field that is missing, null or not of the
    /// expected type is left empty without discarding its siblings.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::default(),
        }
    }

    fn from_value(value: &Value) -> Self {
        Self {
            payload: lookup(value, "payload")
                .map(ArticlePayload::from_value)
                .unwrap_or_default(),
        }
    }

    pub fn article_url(&self) -> Option<String> {
        self.payload.article_url()
    }
}

impl ArticlePayload {
    fn from_value(value: &Value) -> Self {
        Self {
            url: string_field(value, "url"),
            title: string_field(value, "title"),
        }
    }

    /// The slug announced by the title, if any.
    ///
    /// Only the first line after the prefix is considered. Surrounding
    /// whitespace is trimmed; inner whitespace is kept as-is.
    pub fn slug(&self) -> Option<&str> {
        let remainder = self.title.strip_prefix(NEW_ARTICLE_PREFIX)?;
        let first_line = remainder.split('\n').next().unwrap_or_default();
        let slug = first_line.trim();

        (!slug.is_empty()).then_some(slug)
    }

    /// `url + "/posts/" + slug`, concatenated verbatim.
    pub fn article_url(&self) -> Option<String> {
        let slug = self.slug()?;

        let mut full_url = String::with_capacity(self.url.len() + POSTS_PATH.len() + slug.len());
        full_url.push_str(&self.url);
        full_url.push_str(POSTS_PATH);
        full_url.push_str(slug);

        Some(full_url)
    }
}

/// Object member `name`, preferring an exact key over a case-insensitive one.
fn lookup<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    object.get(name).or_else(|| {
        object
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

fn string_field(value: &Value, name: &str) -> String {
    lookup(value, name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
