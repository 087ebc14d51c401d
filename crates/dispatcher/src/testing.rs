//! Shape fixtures shared by the unit tests

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use contracts::{
    ContractError, ErrorSet, ModelStore, SharedContext, TypedModel, VariantSchema, VariantTag,
    WireRecord, NON_FIELD_ERRORS,
};
use serde_json::Value;

use crate::{TypedDispatcher, VariantRegistry};

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { id: Option<u64>, radius: f64 },
    Square { id: Option<u64>, side: i64 },
    /// Never registered
    Point,
}

impl Shape {
    pub fn circle(radius: f64) -> Self {
        Shape::Circle { id: None, radius }
    }

    pub fn square(side: i64) -> Self {
        Shape::Square { id: None, side }
    }

    fn id(&self) -> Option<u64> {
        match self {
            Shape::Circle { id, .. } | Shape::Square { id, .. } => *id,
            Shape::Point => None,
        }
    }

    fn set_id(&mut self, value: u64) {
        if let Shape::Circle { id, .. } | Shape::Square { id, .. } = self {
            *id = Some(value);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Square,
    Point,
}

impl TypedModel for Shape {
    type Kind = ShapeKind;

    fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Square { .. } => ShapeKind::Square,
            Shape::Point => ShapeKind::Point,
        }
    }

    fn natural_key(kind: &ShapeKind) -> VariantTag {
        match kind {
            ShapeKind::Circle => "geo.circle".into(),
            ShapeKind::Square => "geo.square".into(),
            ShapeKind::Point => "geo.point".into(),
        }
    }
}

/// One numeric field per variant: `radius` (float) or `side` (integer)
pub struct ShapeSchema {
    kind: ShapeKind,
    field: String,
    fields: Vec<String>,
    context: SharedContext,
}

impl ShapeSchema {
    pub fn circle(context: SharedContext) -> Self {
        Self::new(ShapeKind::Circle, "radius", context)
    }

    pub fn square(context: SharedContext) -> Self {
        Self::new(ShapeKind::Square, "side", context)
    }

    fn new(kind: ShapeKind, field: &str, context: SharedContext) -> Self {
        Self {
            kind,
            field: field.to_string(),
            fields: vec![field.to_string()],
            context,
        }
    }

    fn check(&self, value: &Value) -> bool {
        match self.kind {
            ShapeKind::Circle => value.is_number(),
            _ => value.is_i64(),
        }
    }
}

impl VariantSchema<Shape> for ShapeSchema {
    fn name(&self) -> &str {
        match self.kind {
            ShapeKind::Circle => "CircleSchema",
            _ => "SquareSchema",
        }
    }

    fn fields(&self) -> &[String] {
        &self.fields
    }

    fn context(&self) -> &SharedContext {
        &self.context
    }

    fn validate(
        &self,
        data: &WireRecord,
        _target: Option<&Shape>,
        partial: bool,
    ) -> Result<WireRecord, ErrorSet> {
        let mut cleaned = WireRecord::new();
        match data.get(&self.field) {
            Some(value) if self.check(value) => {
                cleaned.insert(self.field.clone(), value.clone());
            }
            Some(_) => return Err(ErrorSet::single(&self.field, "a valid number is required")),
            None if partial => {}
            None => return Err(ErrorSet::single(&self.field, "required")),
        }
        Ok(cleaned)
    }

    fn represent(&self, instance: &Shape) -> WireRecord {
        let mut record = WireRecord::new();
        match instance {
            Shape::Circle { radius, .. } => {
                record.insert("radius".into(), Value::from(*radius));
            }
            Shape::Square { side, .. } => {
                record.insert("side".into(), Value::from(*side));
            }
            Shape::Point => {}
        }
        record
    }

    fn build(&self, data: WireRecord) -> Result<Shape, ContractError> {
        let mut shape = match self.kind {
            ShapeKind::Circle => Shape::circle(0.0),
            _ => Shape::square(0),
        };
        self.apply(data, &mut shape)?;
        Ok(shape)
    }

    fn apply(&self, data: WireRecord, target: &mut Shape) -> Result<(), ContractError> {
        let Some(value) = data.get(&self.field) else {
            return Ok(());
        };
        match target {
            Shape::Circle { radius, .. } => *radius = value.as_f64().unwrap_or(*radius),
            Shape::Square { side, .. } => *side = value.as_i64().unwrap_or(*side),
            Shape::Point => {
                return Err(ContractError::construction("geo.point", "points have no fields"))
            }
        }
        Ok(())
    }
}

/// Circle without hook, Square with a "side must be positive" hook
pub fn shape_registry() -> VariantRegistry<Shape> {
    VariantRegistry::builder()
        .register(ShapeKind::Circle, |ctx| Box::new(ShapeSchema::circle(ctx)))
        .register_with_validator(
            ShapeKind::Square,
            |ctx| Box::new(ShapeSchema::square(ctx)),
            |data: &WireRecord, _: Option<&Shape>, _: &SharedContext| match data
                .get("side")
                .and_then(Value::as_i64)
            {
                Some(side) if side <= 0 => {
                    Err(ErrorSet::single(NON_FIELD_ERRORS, "side must be positive"))
                }
                _ => Ok(()),
            },
        )
        .build()
        .unwrap()
}

pub fn shape_dispatcher() -> TypedDispatcher<Shape> {
    TypedDispatcher::builder("ShapeDispatcher")
        .registry(shape_registry())
        .build()
        .unwrap()
}

pub fn record(value: Value) -> WireRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

/// In-memory store; ids start at 1
#[derive(Default)]
pub struct ShapeStore {
    rows: Mutex<Vec<Shape>>,
    next_id: AtomicU64,
    writes: AtomicUsize,
    fail_after: Option<usize>,
}

impl ShapeStore {
    /// Fails every write after `n` successful ones
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Stored copy of the row with `id`
    pub fn row(&self, id: u64) -> Option<Shape> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id() == Some(id))
            .cloned()
    }

    fn check_failure(&self, instance: &Shape) -> Result<(), ContractError> {
        let writes = self.writes.fetch_add(1, Ordering::SeqCst);
        match self.fail_after {
            Some(limit) if writes >= limit => Err(ContractError::storage(
                Shape::natural_key(&instance.kind()).as_str(),
                "injected failure",
            )),
            _ => Ok(()),
        }
    }
}

impl ModelStore<Shape> for ShapeStore {
    async fn insert(&self, mut instance: Shape) -> Result<Shape, ContractError> {
        self.check_failure(&instance)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        instance.set_id(id);
        self.rows.lock().unwrap().push(instance.clone());
        Ok(instance)
    }

    async fn update(&self, instance: &Shape) -> Result<(), ContractError> {
        self.check_failure(instance)?;
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.id() == instance.id()) {
            Some(row) => {
                *row = instance.clone();
                Ok(())
            }
            None => Err(ContractError::storage("geo", "row not found")),
        }
    }
}
