/// 统一错误处理模块
///
/// 容器与路由器的所有失败都以 [`AppError`] 报告，由嵌入方决定
/// 如何转换为传输层的失败响应。
pub mod app_error;
pub mod result;

pub use app_error::AppError;
pub use result::AppResult;
