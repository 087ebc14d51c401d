//! RuleSchema - `VariantSchema<Record>` driven by field declarations

use contracts::{
    unique_message, ContractError, ErrorSet, SharedContext, VariantSchema, VariantTag, WireRecord,
};
use serde_json::Value;
use tracing::trace;

use crate::record::Record;
use crate::rules::{FieldDecl, MSG_REQUIRED};

/// Schema of one manifest-declared variant
#[derive(Debug, Clone)]
pub struct RuleSchema {
    name: String,
    tag: VariantTag,
    decls: Vec<FieldDecl>,
    field_names: Vec<String>,
    context: SharedContext,
}

impl RuleSchema {
    pub fn new(tag: VariantTag, decls: Vec<FieldDecl>, context: SharedContext) -> Self {
        let field_names = decls.iter().map(|d| d.name.clone()).collect();
        Self {
            name: format!("{tag}Schema"),
            tag,
            decls,
            field_names,
            context,
        }
    }

    pub fn tag(&self) -> &VariantTag {
        &self.tag
    }

    pub fn decls(&self) -> &[FieldDecl] {
        &self.decls
    }

    /// Unique fields whose cleaned value is already stored on another row
    fn check_unique(&self, cleaned: &WireRecord, target: Option<&Record>, errors: &mut ErrorSet) {
        let Some(lookup) = self.context.unique_lookup() else {
            return;
        };
        let exclude = target.and_then(|t| t.id);

        for decl in self.decls.iter().filter(|d| d.unique) {
            let Some(value) = cleaned.get(&decl.name).filter(|v| !v.is_null()) else {
                continue;
            };
            if lookup.is_taken(&decl.name, value, exclude) {
                errors.add(&decl.name, unique_message(&decl.name));
            }
        }
    }
    fn check_variant(&self, record: &Record) -> Result<(), ContractError> {
        if record.tag == self.tag {
            Ok(())
        } else {
            Err(ContractError::construction(
                self.tag.as_str(),
                format!("cannot apply to a '{}' record", record.tag),
            ))
        }
    }
}

impl VariantSchema<Record> for RuleSchema {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> &[String] {
        &self.field_names
    }

    fn context(&self) -> &SharedContext {
        &self.context
    }

    fn validate(
        &self,
        data: &WireRecord,
        target: Option<&Record>,
        partial: bool,
    ) -> Result<WireRecord, ErrorSet> {
        let mut cleaned = WireRecord::new();
        let mut errors = ErrorSet::new();

        for decl in &self.decls {
            match data.get(&decl.name) {
                Some(value) => match decl.rule.clean(value) {
                    Ok(value) => {
                        cleaned.insert(decl.name.clone(), value);
                    }
                    Err(message) => errors.add(&decl.name, message),
                },
                None if !partial && decl.is_required() => errors.add(&decl.name, MSG_REQUIRED),
                None => {}
            }
        }

        self.check_unique(&cleaned, target, &mut errors);

        trace!(schema = %self.name, fields = cleaned.len(), errors = errors.len(), "Fields checked");
        errors.into_result().map(|()| cleaned)
    }

    fn unique_fields(&self) -> Vec<&str> {
        self.decls
            .iter()
            .filter(|d| d.unique)
            .map(|d| d.name.as_str())
            .collect()
    }

    fn represent(&self, instance: &Record) -> WireRecord {
        self.decls
            .iter()
            .map(|decl| {
                let value = instance.get(&decl.name).cloned().unwrap_or(Value::Null);
                (decl.name.clone(), value)
            })
            .collect()
    }

    fn build(&self, mut data: WireRecord) -> Result<Record, ContractError> {
        for decl in &self.decls {
            data.entry(decl.name.clone())
                .or_insert_with(|| decl.rule.default_value());
        }
        Ok(Record::new(self.tag.clone(), data))
    }

    fn apply(&self, data: WireRecord, target: &mut Record) -> Result<(), ContractError> {
        self.check_variant(target)?;
        target.fields.extend(data);
        Ok(())
    }
}
