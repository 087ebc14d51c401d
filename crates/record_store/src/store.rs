//! 内存存储
//!
//! 单表存储，行带有变体 tag；支持唯一约束检查和注入失败场景。

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{ContractError, ModelStore, UniqueLookup};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::record::Record;

/// 存储配置
#[derive(Debug, Default, Clone)]
pub struct StoreConfig {
    /// 跨所有变体唯一的字段
    pub unique_fields: Vec<String>,
    /// 写入应该失败的 tags
    pub fail_tags: Vec<String>,
    /// 成功写入 N 次后，所有写入失败
    pub fail_after: Option<usize>,
}

impl StoreConfig {
    pub fn unique(mut self, field: impl Into<String>) -> Self {
        self.unique_fields.push(field.into());
        self
    }

    pub fn fail_tag(mut self, tag: impl Into<String>) -> Self {
        self.fail_tags.push(tag.into());
        self
    }

    pub fn fail_after(mut self, writes: usize) -> Self {
        self.fail_after = Some(writes);
        self
    }
}

/// 内存存储
pub struct MemoryStore {
    /// 配置（可注入失败场景）
    config: StoreConfig,
    /// ID 计数器
    next_id: AtomicU64,
    /// 已尝试的写入次数
    writes: AtomicUsize,
    /// 已保存的行 (id -> record)
    rows: Mutex<BTreeMap<u64, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
            writes: AtomicUsize::new(0),
            rows: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// 总行数
    pub fn count(&self) -> usize {
        self.rows().len()
    }

    /// 某个 tag 下的行数
    pub fn count_tag(&self, tag: &str) -> usize {
        self.rows().values().filter(|r| r.tag.as_str() == tag).count()
    }

    pub fn get(&self, id: u64) -> Option<Record> {
        self.rows().get(&id).cloned()
    }

    /// 所有行，按 id 排序
    pub fn all(&self) -> Vec<Record> {
        self.rows().values().cloned().collect()
    }

    /// 同步插入，分配新 id
    pub fn insert_record(&self, mut record: Record) -> Result<Record, ContractError> {
        self.check_injected_failure(&record)?;

        let mut rows = self.rows();
        Self::check_unique(&self.config, &rows, &record)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        record.id = Some(id);
        rows.insert(id, record.clone());

        debug!(id, tag = %record.tag, "Row inserted");
        Ok(record)
    }

    /// 同步更新已有行
    pub fn update_record(&self, record: &Record) -> Result<(), ContractError> {
        self.check_injected_failure(record)?;

        let Some(id) = record.id else {
            return Err(ContractError::storage(
                record.tag.as_str(),
                "cannot update a record that was never saved",
            ));
        };

        let mut rows = self.rows();
        if !rows.contains_key(&id) {
            return Err(ContractError::NotFound {
                tag: record.tag.to_string(),
                id,
            });
        }
        Self::check_unique(&self.config, &rows, record)?;
        rows.insert(id, record.clone());

        debug!(id, tag = %record.tag, "Row updated");
        Ok(())
    }

    fn rows(&self) -> MutexGuard<'_, BTreeMap<u64, Record>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_injected_failure(&self, record: &Record) -> Result<(), ContractError> {
        let writes = self.writes.fetch_add(1, Ordering::SeqCst);
        let exhausted = self.config.fail_after.is_some_and(|limit| writes >= limit);

        if exhausted || self.config.fail_tags.iter().any(|t| record.tag.as_str() == t) {
            warn!(tag = %record.tag, writes, "Injected storage failure");
            return Err(ContractError::storage(
                record.tag.as_str(),
                "injected failure",
            ));
        }
        Ok(())
    }

    fn check_unique(
        config: &StoreConfig,
        rows: &BTreeMap<u64, Record>,
        record: &Record,
    ) -> Result<(), ContractError> {
        for field in &config.unique_fields {
            let Some(value) = record.get(field).filter(|v| !v.is_null()) else {
                continue;
            };

            if holds(rows, field, value, record.id) {
                return Err(ContractError::UniqueViolation {
                    tag: record.tag.to_string(),
                    field: field.clone(),
                    value: display_value(value),
                });
            }
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 是否有 id 不等于 `exclude` 的行在 `field` 上持有 `value`
fn holds(rows: &BTreeMap<u64, Record>, field: &str, value: &Value, exclude: Option<u64>) -> bool {
    rows.values()
        .any(|row| row.id != exclude && row.get(field) == Some(value))
}

impl UniqueLookup for MemoryStore {
    fn is_taken(&self, field: &str, value: &Value, exclude: Option<u64>) -> bool {
        holds(&self.rows(), field, value, exclude)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl ModelStore<Record> for MemoryStore {
    #[instrument(name = "memory_store_insert", skip(self, instance), fields(tag = %instance.tag))]
    async fn insert(&self, instance: Record) -> Result<Record, ContractError> {
        self.insert_record(instance)
    }

    #[instrument(name = "memory_store_update", skip(self, instance), fields(tag = %instance.tag, id = ?instance.id))]
    async fn update(&self, instance: &Record) -> Result<(), ContractError> {
        self.update_record(instance)
    }
}
