use std::sync::OnceLock;

use regex::Regex;
use sumi_core::path::decode_component;

/// 编译后的路由模式
///
/// 三种互斥的匹配策略在注册时选定一次，分发时不再嗅探模式串。
#[derive(Clone, Debug)]
pub(crate) enum CompiledPattern {
    /// 字面路径，两侧去除斜杠后整体比较，不捕获参数
    Literal(String),
    /// 含 `%` 占位符的按位模式
    Positional {
        /// 编译失败的模式保留为 None，永不匹配
        regex: Option<Regex>,
        /// `/%?` 与 `/%*` 尾段：捕获值需去掉前导斜杠
        strip_tail_slash: bool,
    },
    /// 含 `:name` 占位符的命名模式
    Named {
        regex: Option<Regex>,
        /// 模式中出现的参数名，按出现顺序
        params: Vec<String>,
    },
}

/// `:name` 形式的参数记号
fn param_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":(\w+)").expect("param token regex"))
}

pub(crate) fn compile(pattern: &str) -> CompiledPattern {
    if pattern.contains('%') {
        compile_positional(pattern)
    } else if pattern.contains(':') {
        compile_named(pattern)
    } else {
        CompiledPattern::Literal(pattern.trim_matches('/').to_string())
    }
}

fn build_regex(pattern: &str, source: &str) -> Option<Regex> {
    match Regex::new(source) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!(pattern, error = %err, "route pattern does not compile, it will never match");
            None
        }
    }
}

/// `%` 捕获一段非斜杠字符；尾部的 `/%?`、`/%*`、`/%+` 改变最后
/// 一段的语义；`(...)` 字面分组编译为可选的非捕获分组。
fn compile_positional(pattern: &str) -> CompiledPattern {
    let trimmed = pattern.trim_end_matches('/');
    let (body, tail, strip_tail_slash) = if let Some(head) = trimmed.strip_suffix("/%?") {
        (head.to_string(), "(/?|/[^/]+)", true)
    } else if let Some(head) = trimmed.strip_suffix("/%*") {
        (head.to_string(), "(/?|/.*)", true)
    } else if trimmed.ends_with("/%+") {
        // 保留斜杠在前缀里，尾段捕获必须非空
        (trimmed[..trimmed.len() - 2].to_string(), "(.+)", false)
    } else {
        (format!("{trimmed}/?"), "", false)
    };
    let source = body
        .replace('(', "(?:")
        .replace(')', ")?")
        .replace('%', "([^/]+)");
    let regex = build_regex(pattern, &format!("^{source}{tail}$"));
    CompiledPattern::Positional {
        regex,
        strip_tail_slash,
    }
}

/// `:name` 捕获一段非斜杠字符并按名取回；`*` 为不捕获的通配段；
/// `(...)` 同样编译为可选分组。
fn compile_named(pattern: &str) -> CompiledPattern {
    let trimmed = pattern.trim_end_matches('/');
    let params: Vec<String> = param_token()
        .captures_iter(trimmed)
        .map(|c| c[1].to_string())
        .collect();
    // `(` 保持原样：捕获按名读取，字面分组多出的按位分组无害。
    // 若在此改写 `(`，插入的 `?:` 会紧跟其后的字母拼成新的 `:name`
    // 记号，破坏以字母开头的字面分组
    let replaced = trimmed.replace('*', "[^/]+").replace(')', ")?");
    let source = param_token().replace_all(&replaced, "(?P<${1}>[^/]+)");
    let regex = build_regex(pattern, &format!("^{source}$"));
    CompiledPattern::Named { regex, params }
}

impl CompiledPattern {
    /// 用归一化后的路径尝试匹配，命中时返回按位参数
    pub(crate) fn matches(&self, path: &str) -> Option<Vec<Option<String>>> {
        match self {
            CompiledPattern::Literal(literal) => {
                (path.trim_matches('/') == literal.as_str()).then(Vec::new)
            }
            CompiledPattern::Positional {
                regex,
                strip_tail_slash,
            } => {
                let caps = regex.as_ref()?.captures(path)?;
                let mut raw: Vec<Option<String>> = (1..caps.len())
                    .map(|i| caps.get(i).map(|m| m.as_str().to_string()))
                    .collect();
                // 尾部未参与匹配的分组不进入参数表
                while raw.last().is_some_and(|a| a.is_none()) {
                    raw.pop();
                }
                let mut args: Vec<Option<String>> = raw
                    .into_iter()
                    .map(|a| Some(a.unwrap_or_default()))
                    .collect();
                if let Some(last) = args.last_mut() {
                    if *strip_tail_slash
                        && let Some(v) = last.as_mut()
                        && v.starts_with('/')
                    {
                        v.remove(0);
                    }
                    // 空的可选尾段归一化为 None，参数个数保持不变
                    if last.as_deref() == Some("") {
                        *last = None;
                    }
                }
                Some(args)
            }
            CompiledPattern::Named { regex, params } => {
                let caps = regex.as_ref()?.captures(path)?;
                // 按模式顺序重扫参数名，缺席的可选参数被省略
                let args = params
                    .iter()
                    .filter_map(|p| caps.name(p.as_str()))
                    .map(|m| Some(decode_component(m.as_str())))
                    .collect();
                Some(args)
            }
        }
    }
}
