use http::Method;
use sumi_core::IntoMethodFilter;

use crate::container::{Container, Value};
use crate::error::AppResult;
use crate::provider::ServiceProvider;
use crate::router::{RouteArgs, Router};
use self::config::ApplicationConfig;

pub mod config;

/// 生成各 HTTP 方法的委托注册函数（如 get/post/...）
macro_rules! delegate_method {
    ($name:ident) => {
        /// 将处理函数绑定到给定模式上（此函数注册指定的 HTTP 方法）
        pub fn $name<F>(&mut self, pattern: &str, handler: F, name: Option<&str>) -> &mut Self
        where
            F: Fn(RouteArgs) -> T + Send + Sync + 'static,
        {
            self.router.$name(pattern, handler, name);
            self
        }
    };
}

/// 应用程序入口，同时持有容器与路由器
///
/// 两个组件彼此独立，仅通过被同一对象持有而组合。容器与路由器
/// 均为公开字段，委托方法只是常用操作的捷径。
pub struct Application<T = ()> {
    pub container: Container,
    pub router: Router<T>,
    config: ApplicationConfig,
}

impl<T> Application<T> {
    /// 使用给定配置构建应用，并在容器中预置 debug/charset/locale
    pub fn new(config: ApplicationConfig) -> Self {
        let container = Container::new();
        container
            .set("debug", config.debug)
            .expect("seed a fresh container");
        container
            .set("charset", config.charset.clone())
            .expect("seed a fresh container");
        container
            .set("locale", config.locale.clone())
            .expect("seed a fresh container");
        let mut router = Router::new();
        router.set_front_controller(config.front_controller.clone());
        Self {
            container,
            router,
            config,
        }
    }

    /// 使用默认/合并后的配置构建应用实例
    pub fn new_() -> Self {
        Self::new(ApplicationConfig::load_or_default())
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// 注册服务提供者并应用覆盖值
    pub fn register<P>(
        &self,
        provider: &P,
        values: impl IntoIterator<Item = (String, Value)>,
    ) -> AppResult<()>
    where
        P: ServiceProvider + ?Sized,
    {
        self.container.register(provider, values)
    }

    /// 注册一条路由
    pub fn route<F, M>(&mut self, pattern: &str, handler: F, name: Option<&str>, method: M) -> &mut Self
    where
        F: Fn(RouteArgs) -> T + Send + Sync + 'static,
        M: IntoMethodFilter,
    {
        self.router.route(pattern, handler, name, method);
        self
    }

    delegate_method!(get);
    delegate_method!(post);
    delegate_method!(put);
    delegate_method!(delete);

    /// 处理一次请求：归一化路径并分发
    pub fn handle(&self, raw_path: &str, method: &Method) -> AppResult<T> {
        self.router.dispatch(raw_path, method)
    }

    /// 同 [`Application::handle`]，但无命中时调用回退回调
    pub fn handle_or<F>(&self, raw_path: &str, method: &Method, not_found: F) -> T
    where
        F: FnOnce(&str) -> T,
    {
        self.router.dispatch_or(raw_path, method, not_found)
    }
}
