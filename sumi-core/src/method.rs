use std::str::FromStr;

use http::Method;

/// Conversion into an optional method filter for route registration.
///
/// `None` means the route matches any method.
pub trait IntoMethodFilter {
    fn into_filter(self) -> Option<Method>;
}

impl IntoMethodFilter for Method {
    fn into_filter(self) -> Option<Method> {
        Some(self)
    }
}

impl IntoMethodFilter for Option<Method> {
    fn into_filter(self) -> Option<Method> {
        self
    }
}

impl IntoMethodFilter for &str {
    fn into_filter(self) -> Option<Method> {
        Some(Method::from_str(&self.trim().to_ascii_uppercase()).unwrap())
    }
}

impl IntoMethodFilter for () {
    fn into_filter(self) -> Option<Method> {
        None
    }
}
