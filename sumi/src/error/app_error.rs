use http::StatusCode;
use std::fmt;

/// 框架统一错误类型
///
/// 所有失败都在违规点同步抛出，框架内部不做重试或恢复
#[derive(Debug)]
pub enum AppError {
    // ============ 容器错误 ============
    /// 标识符已被 share/protect 冻结，拒绝重定义
    AlreadyDefined(String),

    /// 标识符尚未定义
    NotDefined(String),

    /// extend 的目标不是对象定义（工厂）
    NotAnObjectDefinition(String),

    /// 取值时向下转换到请求的类型失败
    TypeMismatch {
        id: String,
        expected: &'static str,
    },

    // ============ 路由错误 ============
    /// 没有任何路由匹配该路径，且未提供回退回调
    NoRouteMatched(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AlreadyDefined(_)
            | Self::NotDefined(_)
            | Self::NotAnObjectDefinition(_)
            | Self::TypeMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRouteMatched(_) => StatusCode::NOT_FOUND,
        }
    }

    /// 获取错误代码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyDefined(_) => "ALREADY_DEFINED",
            Self::NotDefined(_) => "NOT_DEFINED",
            Self::NotAnObjectDefinition(_) => "NOT_AN_OBJECT_DEFINITION",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::NoRouteMatched(_) => "NO_ROUTE_MATCHED",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyDefined(id) => {
                write!(f, "Identifier \"{}\" is already defined.", id)
            }
            Self::NotDefined(id) => {
                write!(f, "Identifier \"{}\" is not defined.", id)
            }
            Self::NotAnObjectDefinition(id) => {
                write!(f, "Identifier \"{}\" does not contain an object definition.", id)
            }
            Self::TypeMismatch { id, expected } => {
                write!(f, "Identifier \"{}\" cannot be resolved as {}.", id, expected)
            }
            Self::NoRouteMatched(path) => {
                write!(f, "`{}` is not matched", path)
            }
        }
    }
}

impl std::error::Error for AppError {}
