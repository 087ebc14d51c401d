//! Blog 测试夹具
//!
//! 四个变体共享 name/slug 基础字段：
//! - `blog.blogbase`: name, slug
//! - `blog.blogone`: + info (可空)
//! - `blog.blogtwo`: 无新增字段
//! - `blog.blogthree`: + info, about (可空)，带对象级校验

use contracts::{
    ContractError, ErrorSet, ModelStore, SharedContext, TypedModel, UniqueLookup, VariantSchema,
    VariantTag, WireRecord, NON_FIELD_ERRORS,
};
use dispatcher::{TypedDispatcher, VariantRegistry};
use record_store::{FieldDecl, FieldRule, MemoryStore, Record, RuleSchema, StoreConfig};
use serde_json::Value;
use std::sync::Arc;

/// 对象级校验失败信息
pub const ABOUT_REPEATS_NAME: &str = "about must not repeat the name";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlogBase {
    pub id: Option<u64>,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Blog {
    Base(BlogBase),
    One {
        base: BlogBase,
        info: Option<String>,
    },
    Two(BlogBase),
    Three {
        base: BlogBase,
        info: Option<String>,
        about: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlogKind {
    Base,
    One,
    Two,
    Three,
}

impl BlogKind {
    pub const ALL: [BlogKind; 4] = [Self::Base, Self::One, Self::Two, Self::Three];

    /// 变体声明的字段（不含判别字段）
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Base | Self::Two => &["name", "slug"],
            Self::One => &["name", "slug", "info"],
            Self::Three => &["name", "slug", "info", "about"],
        }
    }

    fn decls(self) -> Vec<FieldDecl> {
        self.fields()
            .iter()
            .map(|field| match *field {
                "name" => FieldDecl::new("name", FieldRule::char(10)),
                "slug" => FieldDecl::new("slug", FieldRule::slug(255)).unique(),
                "info" => FieldDecl::new("info", FieldRule::char(10).nullable()),
                _ => FieldDecl::new(*field, FieldRule::char(255).nullable()),
            })
            .collect()
    }
}

fn base(name: &str, slug: &str) -> BlogBase {
    BlogBase {
        id: None,
        name: name.to_string(),
        slug: slug.to_string(),
    }
}

impl Blog {
    pub fn base(name: &str, slug: &str) -> Self {
        Blog::Base(base(name, slug))
    }

    pub fn one(name: &str, slug: &str, info: Option<&str>) -> Self {
        Blog::One {
            base: base(name, slug),
            info: info.map(str::to_string),
        }
    }

    pub fn two(name: &str, slug: &str) -> Self {
        Blog::Two(base(name, slug))
    }

    pub fn three(name: &str, slug: &str, about: Option<&str>) -> Self {
        Blog::Three {
            base: base(name, slug),
            info: None,
            about: about.map(str::to_string),
        }
    }

    /// 指定变体的空实例
    pub fn empty(kind: BlogKind) -> Self {
        match kind {
            BlogKind::Base => Blog::Base(BlogBase::default()),
            BlogKind::One => Blog::One {
                base: BlogBase::default(),
                info: None,
            },
            BlogKind::Two => Blog::Two(BlogBase::default()),
            BlogKind::Three => Blog::Three {
                base: BlogBase::default(),
                info: None,
                about: None,
            },
        }
    }

    pub fn common(&self) -> &BlogBase {
        match self {
            Blog::Base(base) | Blog::Two(base) => base,
            Blog::One { base, .. } | Blog::Three { base, .. } => base,
        }
    }

    fn common_mut(&mut self) -> &mut BlogBase {
        match self {
            Blog::Base(base) | Blog::Two(base) => base,
            Blog::One { base, .. } | Blog::Three { base, .. } => base,
        }
    }

    pub fn id(&self) -> Option<u64> {
        self.common().id
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn slug(&self) -> &str {
        &self.common().slug
    }

    pub fn info(&self) -> Option<&str> {
        match self {
            Blog::One { info, .. } | Blog::Three { info, .. } => info.as_deref(),
            _ => None,
        }
    }

    pub fn about(&self) -> Option<&str> {
        match self {
            Blog::Three { about, .. } => about.as_deref(),
            _ => None,
        }
    }

    /// 读取字段的线上表示
    fn field(&self, name: &str) -> Value {
        let text = match name {
            "name" => Some(self.name()),
            "slug" => Some(self.slug()),
            "info" => self.info(),
            "about" => self.about(),
            _ => None,
        };
        text.map_or(Value::Null, Value::from)
    }

    /// 写入一个已清洗的字段值
    fn set_field(&mut self, name: &str, value: &Value) -> Result<(), ContractError> {
        let text = value.as_str().map(str::to_string);
        match (name, self) {
            ("name", blog) => blog.common_mut().name = text.unwrap_or_default(),
            ("slug", blog) => blog.common_mut().slug = text.unwrap_or_default(),
            ("info", Blog::One { info, .. } | Blog::Three { info, .. }) => *info = text,
            ("about", Blog::Three { about, .. }) => *about = text,
            (field, blog) => {
                return Err(ContractError::construction(
                    Blog::natural_key(&blog.kind()).as_str(),
                    format!("unknown field '{field}'"),
                ))
            }
        }
        Ok(())
    }

    fn to_record(&self) -> Record {
        let kind = self.kind();
        let fields = kind
            .fields()
            .iter()
            .map(|field| (field.to_string(), self.field(field)))
            .collect();
        Record {
            id: self.id(),
            tag: Blog::natural_key(&kind),
            fields,
        }
    }
}

impl TypedModel for Blog {
    type Kind = BlogKind;

    fn kind(&self) -> BlogKind {
        match self {
            Blog::Base(_) => BlogKind::Base,
            Blog::One { .. } => BlogKind::One,
            Blog::Two(_) => BlogKind::Two,
            Blog::Three { .. } => BlogKind::Three,
        }
    }

    fn natural_key(kind: &BlogKind) -> VariantTag {
        match kind {
            BlogKind::Base => "blog.blogbase".into(),
            BlogKind::One => "blog.blogone".into(),
            BlogKind::Two => "blog.blogtwo".into(),
            BlogKind::Three => "blog.blogthree".into(),
        }
    }
}

/// 手写的变体 schema：字段规则委托给 `RuleSchema`，实例构造为强类型
pub struct BlogSchema {
    kind: BlogKind,
    rules: RuleSchema,
}

impl BlogSchema {
    pub fn new(kind: BlogKind, context: SharedContext) -> Self {
        Self {
            kind,
            rules: RuleSchema::new(Blog::natural_key(&kind), kind.decls(), context),
        }
    }
}

impl VariantSchema<Blog> for BlogSchema {
    fn name(&self) -> &str {
        match self.kind {
            BlogKind::Base => "BlogBaseSchema",
            BlogKind::One => "BlogOneSchema",
            BlogKind::Two => "BlogTwoSchema",
            BlogKind::Three => "BlogThreeSchema",
        }
    }

    fn fields(&self) -> &[String] {
        VariantSchema::<Record>::fields(&self.rules)
    }

    fn context(&self) -> &SharedContext {
        VariantSchema::<Record>::context(&self.rules)
    }

    fn validate(
        &self,
        data: &WireRecord,
        target: Option<&Blog>,
        partial: bool,
    ) -> Result<WireRecord, ErrorSet> {
        let target = target.map(Blog::to_record);
        self.rules.validate(data, target.as_ref(), partial)
    }

    fn unique_fields(&self) -> Vec<&str> {
        VariantSchema::<Record>::unique_fields(&self.rules)
    }

    fn represent(&self, instance: &Blog) -> WireRecord {
        self.kind
            .fields()
            .iter()
            .map(|field| (field.to_string(), instance.field(field)))
            .collect()
    }

    fn build(&self, data: WireRecord) -> Result<Blog, ContractError> {
        let mut blog = Blog::empty(self.kind);
        self.apply(data, &mut blog)?;
        Ok(blog)
    }

    fn apply(&self, data: WireRecord, target: &mut Blog) -> Result<(), ContractError> {
        for (field, value) in &data {
            target.set_field(field, value)?;
        }
        Ok(())
    }
}

/// BlogThree 的对象级校验
///
/// 部分更新时，未提交的字段取目标实例上的值。
pub fn about_differs_from_name(
    data: &WireRecord,
    target: Option<&Blog>,
    _context: &SharedContext,
) -> Result<(), ErrorSet> {
    let merged = |field: &str| {
        data.get(field)
            .cloned()
            .or_else(|| target.map(|blog| blog.field(field)))
            .filter(|value| !value.is_null())
    };

    match (merged("name"), merged("about")) {
        (Some(name), Some(about)) if name == about => {
            Err(ErrorSet::single(NON_FIELD_ERRORS, ABOUT_REPEATS_NAME))
        }
        _ => Ok(()),
    }
}

/// 四个变体的注册表
pub fn blog_registry() -> VariantRegistry<Blog> {
    VariantRegistry::builder()
        .register(BlogKind::Base, |ctx| Box::new(BlogSchema::new(BlogKind::Base, ctx)))
        .register(BlogKind::One, |ctx| Box::new(BlogSchema::new(BlogKind::One, ctx)))
        .register(BlogKind::Two, |ctx| Box::new(BlogSchema::new(BlogKind::Two, ctx)))
        .register_with_validator(
            BlogKind::Three,
            |ctx| Box::new(BlogSchema::new(BlogKind::Three, ctx)),
            about_differs_from_name,
        )
        .build()
        .unwrap()
}

pub fn blog_dispatcher() -> TypedDispatcher<Blog> {
    blog_dispatcher_with_context(SharedContext::empty())
}

pub fn blog_dispatcher_with_context(context: SharedContext) -> TypedDispatcher<Blog> {
    TypedDispatcher::builder("BlogDispatcher")
        .registry(blog_registry())
        .context(context)
        .build()
        .unwrap()
}

/// 绑定到存储的分发器：slug 冲突在校验阶段即被报告
pub fn blog_dispatcher_for(store: &Arc<BlogStore>) -> TypedDispatcher<Blog> {
    blog_dispatcher_with_context(SharedContext::empty().with_unique_lookup(store.clone()))
}

/// Blog 存储：以 `Record` 形式存入 `MemoryStore`，slug 全局唯一
pub struct BlogStore {
    inner: MemoryStore,
}

impl BlogStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// 始终附加 slug 唯一约束
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: MemoryStore::with_config(config.unique("slug")),
        }
    }

    /// 直接写入（相当于 `objects.create`）
    pub fn create(&self, blog: Blog) -> Result<Blog, ContractError> {
        let stored = self.inner.insert_record(blog.to_record())?;
        let mut blog = blog;
        blog.common_mut().id = stored.id;
        Ok(blog)
    }

    pub fn count(&self) -> usize {
        self.inner.count()
    }

    pub fn count_kind(&self, kind: BlogKind) -> usize {
        self.inner.count_tag(&Blog::natural_key(&kind))
    }

    /// 按 id 读取已保存的字段
    pub fn fields_of(&self, id: u64) -> Option<WireRecord> {
        self.inner.get(id).map(|record| record.fields)
    }
}

impl Default for BlogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UniqueLookup for BlogStore {
    fn is_taken(&self, field: &str, value: &Value, exclude: Option<u64>) -> bool {
        self.inner.is_taken(field, value, exclude)
    }
}

impl ModelStore<Blog> for BlogStore {
    async fn insert(&self, instance: Blog) -> Result<Blog, ContractError> {
        self.create(instance)
    }

    async fn update(&self, instance: &Blog) -> Result<(), ContractError> {
        self.inner.update_record(&instance.to_record())
    }
}
