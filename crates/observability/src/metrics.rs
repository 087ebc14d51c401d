//! 分发指标收集模块
//!
//! 记录校验、序列化、持久化的运行指标，并在内存中聚合摘要。

use std::collections::BTreeMap;

use contracts::ErrorSet;
use metrics::{counter, histogram};

/// 未能解析出变体时使用的标签值
pub const UNKNOWN_VARIANT: &str = "unknown";

/// 记录单条记录的校验结果
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_validation;
///
/// match dispatcher.validate(&data, None, false) {
///     Ok(v) => record_validation("BlogDispatcher", Some(v.tag()), true),
///     Err(_) => record_validation("BlogDispatcher", None, false),
/// }
/// ```
pub fn record_validation(dispatcher: &str, variant: Option<&str>, valid: bool) {
    let status = if valid { "valid" } else { "invalid" };
    counter!(
        "typed_dispatch_records_validated_total",
        "dispatcher" => dispatcher.to_string(),
        "variant" => variant.unwrap_or(UNKNOWN_VARIANT).to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录实例序列化
pub fn record_represented(dispatcher: &str, variant: &str) {
    counter!(
        "typed_dispatch_records_represented_total",
        "dispatcher" => dispatcher.to_string(),
        "variant" => variant.to_string()
    )
    .increment(1);
}

/// 记录持久化结果
pub fn record_save(dispatcher: &str, variant: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "typed_dispatch_records_saved_total",
        "dispatcher" => dispatcher.to_string(),
        "variant" => variant.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录批量校验规模
pub fn record_batch(dispatcher: &str, size: usize, invalid: usize) {
    histogram!(
        "typed_dispatch_batch_size",
        "dispatcher" => dispatcher.to_string()
    )
    .record(size as f64);

    if invalid > 0 {
        counter!(
            "typed_dispatch_batches_rejected_total",
            "dispatcher" => dispatcher.to_string()
        )
        .increment(1);
    }
}

/// 分发指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchStatsAggregator {
    /// 总记录数
    pub total_records: u64,

    /// 通过校验的记录数
    pub valid_records: u64,

    /// 未通过校验的记录数
    pub invalid_records: u64,

    /// 批量大小统计
    pub batch_stats: RunningStats,

    /// 各变体通过校验次数
    pub variant_counts: BTreeMap<String, u64>,

    /// 各字段出错次数
    pub field_error_counts: BTreeMap<String, u64>,
}

impl DispatchStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条通过校验的记录
    pub fn record_valid(&mut self, variant: &str) {
        self.total_records += 1;
        self.valid_records += 1;
        *self.variant_counts.entry(variant.to_string()).or_insert(0) += 1;
    }

    /// 记录一条未通过校验的记录
    pub fn record_invalid(&mut self, errors: &ErrorSet) {
        self.total_records += 1;
        self.invalid_records += 1;
        for field in errors.fields() {
            *self.field_error_counts.entry(field.to_string()).or_insert(0) += 1;
        }
    }

    /// 记录一次批量
    pub fn record_batch(&mut self, size: usize) {
        self.batch_stats.push(size as f64);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_records: self.total_records,
            valid_records: self.valid_records,
            invalid_records: self.invalid_records,
            reject_rate: if self.total_records > 0 {
                self.invalid_records as f64 / self.total_records as f64 * 100.0
            } else {
                0.0
            },
            batch_size: StatsSummary::from(&self.batch_stats),
            variant_counts: self.variant_counts.clone(),
            field_error_counts: self.field_error_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_records: u64,
    pub valid_records: u64,
    pub invalid_records: u64,
    pub reject_rate: f64,
    pub batch_size: StatsSummary,
    pub variant_counts: BTreeMap<String, u64>,
    pub field_error_counts: BTreeMap<String, u64>,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total records: {}", self.total_records)?;
        writeln!(f, "Valid records: {}", self.valid_records)?;
        writeln!(
            f,
            "Invalid records: {} ({:.2}%)",
            self.invalid_records, self.reject_rate
        )?;
        writeln!(f, "Batch size: {}", self.batch_size)?;

        if !self.variant_counts.is_empty() {
            writeln!(f, "Records per variant:")?;
            for (variant, count) in &self.variant_counts {
                writeln!(f, "  {}: {}", variant, count)?;
            }
        }

        if !self.field_error_counts.is_empty() {
            writeln!(f, "Errors per field:")?;
            for (field, count) in &self.field_error_counts {
                writeln!(f, "  {}: {}", field, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
