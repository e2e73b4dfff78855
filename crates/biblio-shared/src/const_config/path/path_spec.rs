use reqwest::Method;

#[derive(Debug, Clone)]
pub struct PathSpec {
    pub path: &'static str,
    pub method: Method,
}

impl PathSpec {
    pub const fn get(path: &'static str) -> Self {
        Self {
            path,
            method: Method::GET,
        }
    }

    pub const fn post(path: &'static str) -> Self {
        Self {
            path,
            method: Method::POST,
        }
    }

    pub const fn delete(path: &'static str) -> Self {
        Self {
            path,
            method: Method::DELETE,
        }
    }

    /// Appends a path segment (such as an ID) to a prefix path
    pub fn with_segment<D: std::fmt::Display>(&self, segment: D) -> String {
        format!("{}{segment}", self.path)
    }
}
