use percent_encoding::percent_decode_str;

/// Percent-decodes a raw request target into a path with a single
/// leading slash. Anything after `?` is dropped before decoding.
pub fn decode_path(raw: &str) -> String {
    let raw = raw.split('?').next().unwrap_or("");
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    format!("/{}", decoded.trim_start_matches('/'))
}

/// Percent-decodes a single captured path segment.
pub fn decode_component(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

/// Removes a front-controller prefix from a decoded path.
///
/// `script_path` is the dispatch script's path relative to the document
/// root (e.g. `app/index.php`). The prefix is only considered when the
/// request path contains a `.`, i.e. when the request was routed through
/// the script file itself.
pub fn strip_front_controller(path: &str, script_path: &str) -> String {
    let script = script_path.trim_matches('/');
    if script.is_empty() || !path.contains('.') {
        return path.to_string();
    }
    match path.trim_start_matches('/').strip_prefix(script) {
        Some(rest) => format!("/{}", rest.trim_start_matches('/')),
        None => path.to_string(),
    }
}

/// Full request-path normalization: decode, then strip the
/// front-controller prefix when one is configured.
pub fn normalize_request_path(raw: &str, script_path: Option<&str>) -> String {
    let path = decode_path(raw);
    match script_path {
        Some(script) => strip_front_controller(&path, script),
        None => path,
    }
}
