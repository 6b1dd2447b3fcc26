use crate::container::Container;
use crate::error::AppResult;

/// 服务提供者：向容器注册一组定义
///
/// 容器在 [`Container::register`] 中对它恰好调用一次，随后应用
/// 调用方给出的覆盖值。ORM、数据库连接等配置胶水都以提供者的
/// 形式存在，它们只使用容器的公开操作。
pub trait ServiceProvider {
    fn register(&self, container: &Container) -> AppResult<()>;
}
