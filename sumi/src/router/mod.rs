mod pattern;

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use sumi_core::{IntoMethodFilter, normalize_request_path};

use crate::error::{AppError, AppResult};
use pattern::{CompiledPattern, compile};

/// 捕获到的路径参数，按模式顺序排列
///
/// 按位模式的空可选尾段以 `None` 占位；命名模式缺席的可选参数
/// 直接省略，参数表变短。
pub type RouteArgs = Vec<Option<String>>;

type BoxHandler<T> = Arc<dyn Fn(RouteArgs) -> T + Send + Sync>;

/// 生成各 HTTP 方法的简化注册函数（如 get/post/...）
///
/// 这些函数会将给定的 handler 绑定到指定 pattern 上。
macro_rules! define_method {
    ($name:ident, $m:ident) => {
        /// 将处理函数绑定到给定模式上（此函数注册指定的 HTTP 方法）
        pub fn $name<F>(&mut self, pattern: &str, handler: F, name: Option<&str>) -> &mut Self
        where
            F: Fn(RouteArgs) -> T + Send + Sync + 'static,
        {
            self.route(pattern, handler, name, Method::$m)
        }
    };
}

/// 一条路由定义
pub struct Route<T> {
    pattern: String,
    compiled: CompiledPattern,
    handler: BoxHandler<T>,
    name: Option<String>,
    method: Option<Method>,
}

impl<T> Route<T> {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }
}

impl<T> Clone for Route<T> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            compiled: self.compiled.clone(),
            handler: self.handler.clone(),
            name: self.name.clone(),
            method: self.method.clone(),
        }
    }
}

/// 路由器，负责注册路由并按注册顺序分发请求路径
///
/// 分发是 (路由表, 路径, 方法) 的纯函数：逐条尝试，首个命中者
/// 胜出，没有歧义消解或打分。路由表应在首次分发前注册完毕。
pub struct Router<T = ()> {
    /// 已注册的路由，注册顺序即匹配优先级
    routes: Vec<Route<T>>,
    /// 具名路由索引，仅用于按名查找，不影响匹配顺序
    named: HashMap<String, usize>,
    /// 前端控制器脚本相对文档根的路径，归一化时剥除
    front_controller: Option<String>,
}

impl<T> Clone for Router<T> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            named: self.named.clone(),
            front_controller: self.front_controller.clone(),
        }
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Router {
            routes: Vec::new(),
            named: HashMap::new(),
            front_controller: None,
        }
    }

    /// 设置前端控制器脚本路径（相对文档根）
    pub fn set_front_controller(&mut self, script_path: Option<String>) {
        self.front_controller = script_path;
    }

    /// 注册一条路由
    ///
    /// 模式在此刻编译；无法编译的模式保留为永不匹配并记录警告，
    /// 注册本身不报错。`method` 为 `None` 时不限方法。
    pub fn route<F, M>(&mut self, pattern: &str, handler: F, name: Option<&str>, method: M) -> &mut Self
    where
        F: Fn(RouteArgs) -> T + Send + Sync + 'static,
        M: IntoMethodFilter,
    {
        let route = Route {
            pattern: pattern.to_string(),
            compiled: compile(pattern),
            handler: Arc::new(handler),
            name: name.map(str::to_string),
            method: method.into_filter(),
        };
        if let Some(name) = &route.name {
            self.named.insert(name.clone(), self.routes.len());
        }
        self.routes.push(route);
        self
    }

    define_method!(get, GET);
    define_method!(post, POST);
    define_method!(put, PUT);
    define_method!(delete, DELETE);

    /// 按名查找路由
    pub fn route_by_name(&self, name: &str) -> Option<&Route<T>> {
        self.named.get(name).map(|&index| &self.routes[index])
    }

    /// 已注册的路由，按注册顺序
    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    fn find(&self, path: &str, method: &Method) -> Option<(&Route<T>, RouteArgs)> {
        for route in &self.routes {
            // 方法不符视作未命中，落到后续路由
            if let Some(expected) = &route.method
                && expected != method
            {
                continue;
            }
            if let Some(args) = route.compiled.matches(path) {
                tracing::debug!(pattern = %route.pattern, path, "route matched");
                return Some((route, args));
            }
        }
        None
    }

    /// 归一化路径并分发，无路由命中时返回
    /// [`AppError::NoRouteMatched`]
    pub fn dispatch(&self, raw_path: &str, method: &Method) -> AppResult<T> {
        let path = normalize_request_path(raw_path, self.front_controller.as_deref());
        match self.find(&path, method) {
            Some((route, args)) => Ok((route.handler)(args)),
            None => Err(AppError::NoRouteMatched(path)),
        }
    }

    /// 同 [`Router::dispatch`]，但无命中时调用回退回调
    pub fn dispatch_or<F>(&self, raw_path: &str, method: &Method, not_found: F) -> T
    where
        F: FnOnce(&str) -> T,
    {
        let path = normalize_request_path(raw_path, self.front_controller.as_deref());
        match self.find(&path, method) {
            Some((route, args)) => (route.handler)(args),
            None => not_found(&path),
        }
    }
}
