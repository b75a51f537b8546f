use super::client::HeaderMap;

#[derive(Debug, Clone)]
pub struct HttpRequestBuilder {
    pub url: String,
    pub headers: Option<HeaderMap>,
}

impl HttpRequestBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        HttpRequestBuilder {
            url: url.into(),
            headers: None,
        }
    }

    pub fn header(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers
            .get_or_insert_with(HeaderMap::default)
            .insert(key.into(), value.into());
        self
    }
}
