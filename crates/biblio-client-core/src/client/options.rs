use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};

/// Per call overrides for [`Client::request`](crate::Client::request)
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
    /// Sent as is, overriding any header the client would set itself
    pub headers: HeaderMap,
}

#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// Sent url encoded
    Form(Vec<(String, String)>),
    /// The transport chooses the content type (including the boundary)
    Multipart(reqwest::multipart::Form),
    Text(String),
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn json<T: serde::Serialize>(mut self, body: &T) -> serde_json::Result<Self> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(fields);
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn text<S: Into<String>>(mut self, body: S) -> Self {
        self.body = RequestBody::Text(body.into());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl RequestBody {
    /// Bodies for which the client falls back to a JSON content type when
    /// the caller did not set one
    pub(crate) fn defaults_to_json(&self) -> bool {
        matches!(self, Self::Empty | Self::Json(_) | Self::Text(_))
    }
}
