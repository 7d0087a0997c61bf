use axum::http::Uri;
use lambda_http::{Request, RequestExt};

/// Routes Lambda requests on the resource path reported by API Gateway.
///
/// `lambda_http` prefixes the path of REST API events with the deployment stage, so a request to
/// `/hello` on stage `prod` arrives as `/prod/hello`. This restores the path from the raw event
/// and keeps the query string. Requests without a raw path are passed through unchanged.
pub fn resource_path(mut request: Request) -> Request {
    let raw_path = request.raw_http_path();
    if raw_path.is_empty() || raw_path == request.uri().path() {
        return request;
    }

    let path_and_query = match request.uri().query() {
        Some(query) => format!("{raw_path}?{query}"),
        None => raw_path.to_owned(),
    };

    let uri = request.uri();
    let mut builder = Uri::builder().path_and_query(path_and_query);
    if let Some(scheme) = uri.scheme() {
        builder = builder.scheme(scheme.clone());
    }
    if let Some(authority) = uri.authority() {
        builder = builder.authority(authority.clone());
    }

    match builder.build() {
        Ok(new_uri) => *request.uri_mut() = new_uri,
        Err(error) => switchboard_log::debug!(
            "keeping stage path {}: {error}",
            request.uri().path()
        ),
    }

    request
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str, raw_path: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(lambda_http::Body::Empty)
            .unwrap()
            .with_raw_http_path(raw_path)
    }

    #[test]
    fn test_strips_stage_prefix() {
        let request = resource_path(request("https://api.example.com/prod/hello", "/hello"));
        assert_eq!(request.uri().path(), "/hello");
        assert_eq!(
            request.uri().authority().map(|a| a.as_str()),
            Some("api.example.com")
        );
    }

    #[test]
    fn test_keeps_query() {
        let request = resource_path(request("/prod/hello?lang=en&x=1", "/hello"));
        assert_eq!(request.uri().to_string(), "/hello?lang=en&x=1");
    }

    #[test]
    fn test_without_raw_path() {
        let request = resource_path(request("/prod/hello", ""));
        assert_eq!(request.uri().path(), "/prod/hello");
    }
}
