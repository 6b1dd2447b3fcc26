use super::AppError;

/// 框架标准 Result 类型
///
/// 用于所有可能返回错误的操作，提供统一的错误处理体验
pub type AppResult<T> = Result<T, AppError>;
