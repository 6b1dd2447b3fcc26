use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::{AppError, AppResult};
use crate::provider::ServiceProvider;

/// 容器中存放的值
pub type Value = Arc<dyn Any + Send + Sync>;
/// 工厂：以容器为唯一参数产出一个值，可在其中解析其他条目
pub type Factory = Arc<dyn Fn(&Container) -> AppResult<Value> + Send + Sync>;
/// 定义变更监听器，在标识符每次被（重新）定义时同步触发
pub type Listener = Arc<dyn Fn(&Container) + Send + Sync>;

/// 将任意值包装为容器可存放的 [`Value`]
pub fn value<T: Any + Send + Sync>(v: T) -> Value {
    Arc::new(v)
}

/// 条目定义：显式区分字面值与工厂，取值时不再猜测"能否调用"
#[derive(Clone)]
enum Definition {
    /// 字面值，取值时原样返回
    Value(Value),
    /// 瞬态工厂，每次取值都重新调用
    Factory(Factory),
    /// 共享工厂，首次取值后记忆，此后返回同一实例
    Shared {
        factory: Factory,
        cell: Arc<OnceLock<Value>>,
    },
    /// 受保护的可调用对象，取值时返回其本身而不调用
    Protected(Factory),
}

#[derive(Clone)]
struct Entry {
    definition: Definition,
    /// share/protect 置位；置位后 set/factory 拒绝重定义
    frozen: bool,
}

enum DefineCheck {
    /// 仅当现有条目被冻结时拒绝
    RejectFrozen,
    /// 只要标识符已存在即拒绝
    RejectExisting,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    listeners: HashMap<String, Vec<Listener>>,
    initialized: HashSet<String>,
}

/// 依赖注入容器
///
/// 字符串标识符到字面值或工厂的映射，支持惰性单例、受保护的
/// 可调用对象、既有定义的装饰以及定义变更监听。锁从不跨越工厂
/// 或监听器调用持有，两者都可以重入容器。
pub struct Container {
    inner: RwLock<Inner>,
}

impl Container {
    /// 创建一个空容器
    pub fn new() -> Self {
        Container {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// 创建容器并预置一组字面值
    pub fn with_values(values: impl IntoIterator<Item = (String, Value)>) -> AppResult<Self> {
        let container = Container::new();
        for (id, v) in values {
            container.set_value(&id, v)?;
        }
        Ok(container)
    }

    fn define(&self, id: &str, entry: Entry, check: DefineCheck) -> AppResult<()> {
        let listeners = {
            let mut inner = self.inner.write().expect("container lock poisoned");
            let rejected = match check {
                DefineCheck::RejectFrozen => inner.entries.get(id).is_some_and(|e| e.frozen),
                DefineCheck::RejectExisting => inner.entries.contains_key(id),
            };
            if rejected {
                return Err(AppError::AlreadyDefined(id.to_string()));
            }
            inner.entries.insert(id.to_string(), entry);
            inner.listeners.get(id).cloned().unwrap_or_default()
        };
        for listener in &listeners {
            listener(self);
        }
        Ok(())
    }

    fn notify(&self, id: &str) {
        let listeners = {
            let inner = self.inner.read().expect("container lock poisoned");
            inner.listeners.get(id).cloned().unwrap_or_default()
        };
        for listener in &listeners {
            listener(self);
        }
    }

    /// 存入一个字面值
    ///
    /// 若现有条目已被 share/protect 冻结则返回
    /// [`AppError::AlreadyDefined`]；普通值允许覆盖。
    pub fn set<T: Any + Send + Sync>(&self, id: &str, value: T) -> AppResult<()> {
        self.set_value(id, Arc::new(value))
    }

    /// 存入一个已经包装好的 [`Value`]
    pub fn set_value(&self, id: &str, value: Value) -> AppResult<()> {
        self.define(
            id,
            Entry {
                definition: Definition::Value(value),
                frozen: false,
            },
            DefineCheck::RejectFrozen,
        )
    }

    /// 注册瞬态工厂，每次取值都会重新调用
    pub fn factory<F>(&self, id: &str, factory: F) -> AppResult<()>
    where
        F: Fn(&Container) -> AppResult<Value> + Send + Sync + 'static,
    {
        self.define(
            id,
            Entry {
                definition: Definition::Factory(Arc::new(factory)),
                frozen: false,
            },
            DefineCheck::RejectFrozen,
        )
    }

    /// 注册共享（单例）工厂
    ///
    /// 工厂最多调用一次，此后每次取值返回同一实例。标识符已存在时
    /// 返回 [`AppError::AlreadyDefined`]。
    pub fn share<F>(&self, id: &str, factory: F) -> AppResult<()>
    where
        F: Fn(&Container) -> AppResult<Value> + Send + Sync + 'static,
    {
        self.define(
            id,
            Entry {
                definition: Definition::Shared {
                    factory: Arc::new(factory),
                    cell: Arc::new(OnceLock::new()),
                },
                frozen: true,
            },
            DefineCheck::RejectExisting,
        )
    }

    /// 以字面值形式存入一个可调用对象
    ///
    /// 取值时返回该可调用对象本身而不调用它，可通过
    /// `get_as::<Factory>` 取回。标识符已存在时返回
    /// [`AppError::AlreadyDefined`]。
    pub fn protect<F>(&self, id: &str, callable: F) -> AppResult<()>
    where
        F: Fn(&Container) -> AppResult<Value> + Send + Sync + 'static,
    {
        self.define(
            id,
            Entry {
                definition: Definition::Protected(Arc::new(callable)),
                frozen: true,
            },
            DefineCheck::RejectExisting,
        )
    }

    /// 解析一个条目
    ///
    /// 字面值原样返回；工厂被调用；共享工厂首次调用后记忆。
    /// 无论解析结果如何都会留下 initialized 标记。
    pub fn get(&self, id: &str) -> AppResult<Value> {
        let definition = {
            let mut inner = self.inner.write().expect("container lock poisoned");
            let entry = inner
                .entries
                .get(id)
                .ok_or_else(|| AppError::NotDefined(id.to_string()))?
                .clone();
            inner.initialized.insert(id.to_string());
            entry.definition
        };
        match definition {
            Definition::Value(v) => Ok(v),
            Definition::Factory(factory) => factory(self),
            Definition::Shared { factory, cell } => {
                // 先检查再计算：并发首次解析时工厂可能执行多次，
                // 但最先发布的实例胜出，所有调用者观察到同一身份
                if let Some(v) = cell.get() {
                    return Ok(v.clone());
                }
                let v = factory(self)?;
                Ok(cell.get_or_init(|| v).clone())
            }
            Definition::Protected(callable) => Ok(Arc::new(callable) as Value),
        }
    }

    /// 解析并向下转换到具体类型
    pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> AppResult<Arc<T>> {
        self.get(id)?
            .downcast_arc::<T>()
            .ok_or_else(|| AppError::TypeMismatch {
                id: id.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// 标识符是否存在（与是否解析过无关）
    pub fn has(&self, id: &str) -> bool {
        self.inner
            .read()
            .expect("container lock poisoned")
            .entries
            .contains_key(id)
    }

    /// 无条件移除一个条目，不存在时不报错
    ///
    /// initialized 标记保留，它回答的是"是否实例化过"。
    pub fn delete(&self, id: &str) {
        self.inner
            .write()
            .expect("container lock poisoned")
            .entries
            .remove(id);
    }

    /// 该标识符是否被 get 解析过至少一次
    pub fn initialized(&self, id: &str) -> bool {
        self.inner
            .read()
            .expect("container lock poisoned")
            .initialized
            .contains(id)
    }

    /// 装饰既有定义
    ///
    /// 新的解析结果为 `decorator(原解析结果, 容器)`。瞬态工厂保持
    /// 瞬态；共享工厂保持共享并重置记忆单元（装饰后的产物整体被
    /// 记忆）；受保护条目降为瞬态工厂，装饰器的输入是被保护的可调用
    /// 对象本身。装饰不算重定义，冻结标记原样保留。
    pub fn extend<F>(&self, id: &str, decorator: F) -> AppResult<()>
    where
        F: Fn(Value, &Container) -> AppResult<Value> + Send + Sync + 'static,
    {
        let decorator = Arc::new(decorator);
        {
            let mut inner = self.inner.write().expect("container lock poisoned");
            let entry = inner
                .entries
                .get_mut(id)
                .ok_or_else(|| AppError::NotDefined(id.to_string()))?;
            entry.definition = match entry.definition.clone() {
                Definition::Value(_) => {
                    return Err(AppError::NotAnObjectDefinition(id.to_string()));
                }
                Definition::Factory(factory) => {
                    let decorator = decorator.clone();
                    Definition::Factory(Arc::new(move |c| decorator(factory(c)?, c)))
                }
                Definition::Shared { factory, .. } => {
                    let decorator = decorator.clone();
                    Definition::Shared {
                        factory: Arc::new(move |c| decorator(factory(c)?, c)),
                        cell: Arc::new(OnceLock::new()),
                    }
                }
                Definition::Protected(callable) => {
                    let decorator = decorator.clone();
                    Definition::Factory(Arc::new(move |c| {
                        decorator(Arc::new(callable.clone()) as Value, c)
                    }))
                }
            };
        }
        self.notify(id);
        Ok(())
    }

    /// 为标识符追加监听器，标识符尚未定义时也可注册
    pub fn listen<F>(&self, id: &str, listener: F)
    where
        F: Fn(&Container) + Send + Sync + 'static,
    {
        self.inner
            .write()
            .expect("container lock poisoned")
            .listeners
            .entry(id.to_string())
            .or_default()
            .push(Arc::new(listener));
    }

    /// 调用服务提供者的 register，再以 set 应用一组覆盖值
    pub fn register<P>(
        &self,
        provider: &P,
        values: impl IntoIterator<Item = (String, Value)>,
    ) -> AppResult<()>
    where
        P: ServiceProvider + ?Sized,
    {
        provider.register(self)?;
        for (id, v) in values {
            self.set_value(&id, v)?;
        }
        Ok(())
    }
}

pub trait ArcAnyExt {
    fn downcast_arc<T: Any + Send + Sync>(self: Arc<Self>) -> Option<Arc<T>>
    where
        Self: Send + Sync + 'static;
}

impl ArcAnyExt for dyn Any + Send + Sync {
    fn downcast_arc<T: Any + Send + Sync>(self: Arc<Self>) -> Option<Arc<T>>
    where
        Self: Send + Sync + 'static,
    {
        if self.is::<T>() {
            let raw = Arc::into_raw(self) as *const T;
            Some(unsafe { Arc::from_raw(raw) })
        } else {
            None
        }
    }
}
