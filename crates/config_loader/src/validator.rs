//! 清单校验模块
//!
//! 校验规则：
//! - 结构规则 (名称非空) 由 `validator` derive 完成
//! - 变体 tag 唯一
//! - 同一变体内字段名唯一
//! - 字段名不能与判别字段同名
//! - max_length > 0, min <= max

use std::collections::HashSet;

use contracts::ContractError;
use dispatcher::DEFAULT_DISCRIMINATOR_FIELD;
use validator::Validate;

use crate::manifest::DispatcherManifest;

/// 校验清单
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(manifest: &DispatcherManifest) -> Result<(), ContractError> {
    validate_structure(manifest)?;
    validate_tags(manifest)?;
    validate_field_names(manifest)?;
    validate_field_rules(manifest)?;
    Ok(())
}

/// 结构校验 (derive)
fn validate_structure(manifest: &DispatcherManifest) -> Result<(), ContractError> {
    manifest
        .validate()
        .map_err(|e| ContractError::config_validation("manifest", e.to_string()))
}

/// 校验变体 tag 唯一性
fn validate_tags(manifest: &DispatcherManifest) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for variant in &manifest.variants {
        if !seen.insert(variant.tag.as_str()) {
            return Err(ContractError::config_validation(
                format!("variants[tag={}]", variant.tag),
                "duplicate variant tag",
            ));
        }
    }
    Ok(())
}

/// 校验字段名：变体内唯一，且不与判别字段冲突
fn validate_field_names(manifest: &DispatcherManifest) -> Result<(), ContractError> {
    let discriminator = manifest
        .discriminator_name()
        .unwrap_or(DEFAULT_DISCRIMINATOR_FIELD);

    for variant in &manifest.variants {
        let mut seen = HashSet::new();
        for field in &variant.fields {
            let path = format!("variants[{}].fields[name={}]", variant.tag, field.name);
            if field.name == discriminator {
                return Err(ContractError::config_validation(
                    path,
                    format!("field name clashes with discriminator field '{discriminator}'"),
                ));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ContractError::config_validation(path, "duplicate field name"));
            }
        }
    }
    Ok(())
}

/// 校验字段约束
fn validate_field_rules(manifest: &DispatcherManifest) -> Result<(), ContractError> {
    for variant in &manifest.variants {
        for field in &variant.fields {
            if field.max_length == Some(0) {
                return Err(ContractError::config_validation(
                    format!("variants[{}].fields[{}].max_length", variant.tag, field.name),
                    "max_length must be > 0",
                ));
            }

            if let (Some(min), Some(max)) = (field.min, field.max) {
                if min > max {
                    return Err(ContractError::config_validation(
                        format!("variants[{}].fields[{}]", variant.tag, field.name),
                        format!("min ({min}) must be <= max ({max})"),
                    ));
                }
            }
        }
    }
    Ok(())
}
