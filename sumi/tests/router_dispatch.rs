use std::io;
use std::sync::{Arc, Mutex};

use http::Method;
use sumi::{AppError, RouteArgs, Router};

/// 处理函数把捕获到的参数原样返回，便于断言
fn echo(args: RouteArgs) -> RouteArgs {
    args
}

fn captured(values: &[&str]) -> RouteArgs {
    values.iter().map(|v| Some(v.to_string())).collect()
}

#[test]
fn literal_route_matches_exactly_with_zero_args() {
    let mut router = Router::new();
    router.get("/about", echo, None);

    assert_eq!(router.dispatch("/about", &Method::GET).unwrap(), captured(&[]));
    // 两侧斜杠被修剪
    assert_eq!(router.dispatch("/about/", &Method::GET).unwrap(), captured(&[]));

    match router.dispatch("/about/x", &Method::GET) {
        Err(AppError::NoRouteMatched(path)) => assert_eq!(path, "/about/x"),
        other => panic!("expected NoRouteMatched, got {:?}", other),
    }
}

#[test]
fn query_string_is_dropped_before_matching() {
    let mut router = Router::new();
    router.get("/about", echo, None);
    assert!(router.dispatch("/about?page=2", &Method::GET).is_ok());
}

#[test]
fn percent_placeholder_captures_one_segment() {
    let mut router = Router::new();
    router.get("/user/%", echo, None);

    assert_eq!(
        router.dispatch("/user/42", &Method::GET).unwrap(),
        captured(&["42"])
    );
    // 末尾斜杠可选
    assert_eq!(
        router.dispatch("/user/42/", &Method::GET).unwrap(),
        captured(&["42"])
    );
    assert!(router.dispatch("/user/42/extra", &Method::GET).is_err());
}

#[test]
fn multiple_percent_placeholders_capture_in_order() {
    let mut router = Router::new();
    router.get("/pair/%/%", echo, None);
    assert_eq!(
        router.dispatch("/pair/a/b", &Method::GET).unwrap(),
        captured(&["a", "b"])
    );
}

#[test]
fn optional_tail_yields_a_null_placeholder() {
    let mut router = Router::new();
    router.get("/posts/%?", echo, None);

    // 缺省时参数个数不变，以 None 占位
    assert_eq!(
        router.dispatch("/posts", &Method::GET).unwrap(),
        vec![None::<String>]
    );
    assert_eq!(
        router.dispatch("/posts/", &Method::GET).unwrap(),
        vec![None::<String>]
    );
    assert_eq!(
        router.dispatch("/posts/5", &Method::GET).unwrap(),
        captured(&["5"])
    );
    assert!(router.dispatch("/posts/5/6", &Method::GET).is_err());
}

#[test]
fn greedy_optional_tail_spans_segments() {
    let mut router = Router::new();
    router.get("/files/%*", echo, None);

    assert_eq!(
        router.dispatch("/files", &Method::GET).unwrap(),
        vec![None::<String>]
    );
    assert_eq!(
        router.dispatch("/files/a/b/c", &Method::GET).unwrap(),
        captured(&["a/b/c"])
    );
}

#[test]
fn mandatory_greedy_tail_requires_content() {
    let mut router = Router::new();
    router.get("/raw/%+", echo, None);

    assert_eq!(
        router.dispatch("/raw/a/b", &Method::GET).unwrap(),
        captured(&["a/b"])
    );
    assert!(router.dispatch("/raw", &Method::GET).is_err());
    assert!(router.dispatch("/raw/", &Method::GET).is_err());
}

#[test]
fn named_placeholders_capture_by_name_and_decode() {
    let mut router = Router::new();
    router.get("/user/:id/:slug", echo, None);

    assert_eq!(
        router.dispatch("/user/7/hello-world", &Method::GET).unwrap(),
        captured(&["7", "hello-world"])
    );
    // 归一化解码一次，命名捕获再解码一次
    assert_eq!(
        router.dispatch("/user/7/a%2520b", &Method::GET).unwrap(),
        captured(&["7", "a b"])
    );
}

#[test]
fn missing_optional_named_parameter_shrinks_the_args() {
    let mut router = Router::new();
    router.get("/blog/:year(/:month)", echo, None);

    assert_eq!(
        router.dispatch("/blog/2024/05", &Method::GET).unwrap(),
        captured(&["2024", "05"])
    );
    // 与按位模式不同：缺席的可选参数被省略而非 None 占位
    assert_eq!(
        router.dispatch("/blog/2024", &Method::GET).unwrap(),
        captured(&["2024"])
    );
}

#[test]
fn named_pattern_with_literal_optional_group_matches() {
    let mut router = Router::new();
    router.get("/news/:id(html)", echo, None);

    // 以字母开头的字面可选分组不得与 `:name` 记号混淆
    assert_eq!(
        router.dispatch("/news/42", &Method::GET).unwrap(),
        captured(&["42"])
    );
    assert!(router.dispatch("/news/42/x", &Method::GET).is_err());
}

#[test]
fn named_wildcard_segment_is_not_captured() {
    let mut router = Router::new();
    router.get("/assets/*/:file", echo, None);
    assert_eq!(
        router.dispatch("/assets/img/logo", &Method::GET).unwrap(),
        captured(&["logo"])
    );
}

#[test]
fn method_mismatch_falls_through_to_later_routes() {
    let mut router: Router<&'static str> = Router::new();
    router.post("/submit", |_| "post handler", None);
    router.route("/submit", |_| "fallback handler", None, None::<Method>);

    // 先注册者先匹配
    assert_eq!(
        router.dispatch("/submit", &Method::POST).unwrap(),
        "post handler"
    );
    // 方法不符不是 405，而是继续向后匹配
    assert_eq!(
        router.dispatch("/submit", &Method::GET).unwrap(),
        "fallback handler"
    );
}

#[test]
fn first_registered_route_wins_on_overlap() {
    let mut router: Router<&'static str> = Router::new();
    router.get("/user/%", |_| "placeholder route", None);
    router.get("/user/admin", |_| "literal route", None);

    assert_eq!(
        router.dispatch("/user/admin", &Method::GET).unwrap(),
        "placeholder route"
    );
}

#[test]
fn dispatch_or_invokes_the_fallback_with_the_normalized_path() {
    let mut router: Router<String> = Router::new();
    router.get("/known", |_| String::from("ok"), None);

    let result = router.dispatch_or("/un%6Bnown", &Method::GET, |path| format!("404 {path}"));
    assert_eq!(result, "404 /unknown");
}

#[test]
fn front_controller_prefix_is_stripped() {
    let mut router = Router::new();
    router.set_front_controller(Some(String::from("index.php")));
    router.get("/hello", echo, None);

    assert!(router.dispatch("/index.php/hello", &Method::GET).is_ok());
    assert!(router.dispatch("/index.php/hello?x=1", &Method::GET).is_ok());
    // 不经过脚本文件的请求不剥除前缀
    assert!(router.dispatch("/hello", &Method::GET).is_ok());
}

#[test]
fn named_routes_are_indexed_without_affecting_match_order() {
    let mut router = Router::new();
    router.get("/", echo, None);
    router.get("/user/:id", echo, Some("user_detail"));

    let route = router.route_by_name("user_detail").unwrap();
    assert_eq!(route.pattern(), "/user/:id");
    assert_eq!(route.method(), Some(&Method::GET));
    assert!(router.route_by_name("nope").is_none());

    assert_eq!(
        router.dispatch("/user/9", &Method::GET).unwrap(),
        captured(&["9"])
    );
}

/// 把日志写入内存缓冲，便于断言
#[derive(Clone, Default)]
struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn malformed_pattern_logs_a_warning_at_registration() {
    let buffer = CaptureWriter::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(buffer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut router: Router<&'static str> = Router::new();
        router.get("/broken(/%", |_| "never", None);
    });

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("route pattern does not compile"));
    assert!(output.contains("/broken(/%"));
}

#[test]
fn malformed_pattern_registers_but_never_matches() {
    let mut router: Router<&'static str> = Router::new();
    router.get("/broken(/%", |_| "never", None);
    router.get("/broken/%", |_| "sound", None);

    assert_eq!(
        router.dispatch("/broken/x", &Method::GET).unwrap(),
        "sound"
    );
}
