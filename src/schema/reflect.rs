use log::trace;
use serde_json::{Map, Value};

use crate::{
    file::io::read_scalar_at,
    schema::{verify_with_schema, BaseType, FieldDef, ObjectDef, Schema, TypeRef},
    verifier::VerifierConfig,
    view::{root_unchecked, Follow, ForwardsUOffset, StructView, Table, Vector},
    wire::SIZE_UOFFSET,
    Result,
};

/// Renders the buffer as JSON, driven by the layout metadata.
///
/// The buffer is verified with the default configuration first. Tables become objects holding
/// their present fields (absent fields are left out, deprecated ones skipped), enum-typed
/// scalars render as the value's name when it is declared, and nested buffers render as the
/// object they contain.
///
/// # Errors
/// Returns the verification failure if the buffer does not match `schema`.
pub fn to_json(schema: &Schema, buf: &[u8]) -> Result<Value> {
    verify_with_schema(schema, buf, &VerifierConfig::default())?;
    let Some(root) = schema.root() else {
        return Err(malformed_error!("layout metadata declares no root table"));
    };
    Ok(Renderer { schema }.table(root, root_unchecked::<Table>(buf)))
}

struct Renderer<'s> {
    schema: &'s Schema,
}

impl Renderer<'_> {
    fn table(&self, obj: &ObjectDef, table: Table<'_>) -> Value {
        let mut map = Map::new();
        for field in obj.fields.iter().filter(|field| !field.is_deprecated()) {
            let offset = table.field_offset(field.slot);
            if offset == 0 {
                continue;
            }
            let pos = table.loc() + usize::from(offset);
            let value = match field.ty.base {
                BaseType::Union => self.union(obj, field, table),
                _ => self.field(field, table.buf(), pos),
            };
            map.insert(field.name.clone(), value);
        }
        Value::Object(map)
    }

    fn field(&self, field: &FieldDef, buf: &[u8], pos: usize) -> Value {
        let ty = &field.ty;
        match ty.base {
            BaseType::String => Value::from(<ForwardsUOffset<&str>>::follow(buf, pos)),
            BaseType::Struct => self.structure(ty.object_index, buf, pos),
            BaseType::Table => self.object(ty.object_index, Table::new(buf, follow(buf, pos))),
            BaseType::Vector => {
                let vector = follow(buf, pos);
                match field.nested_root_index {
                    Some(root) => {
                        let bytes = Vector::<u8>::new(buf, vector).bytes();
                        self.table(&self.schema.objects[root], root_unchecked::<Table>(bytes))
                    }
                    None => self.vector(ty, buf, vector),
                }
            }
            base => self.scalar(base, ty, buf, pos),
        }
    }

    fn union(&self, obj: &ObjectDef, field: &FieldDef, table: Table<'_>) -> Value {
        let variant = table
            .get::<u8>(field.slot.saturating_sub(1))
            .zip(field.ty.enum_index)
            .and_then(|(tag, idx)| self.schema.enums[idx].value(i64::from(tag)));
        let value = table.get::<ForwardsUOffset<Table>>(field.slot);
        match (variant.and_then(|val| val.object_index), value) {
            (Some(target), Some(value)) => self.table(&self.schema.objects[target], value),
            _ => {
                trace!("`{}.{}` holds no renderable variant", obj.name, field.name);
                Value::Null
            }
        }
    }

    fn vector(&self, ty: &TypeRef, buf: &[u8], pos: usize) -> Value {
        let len = read_scalar_at::<u32>(buf, pos) as usize;
        let start = pos + SIZE_UOFFSET;
        let element = ty.inline_type();
        let stride = match element {
            BaseType::Struct => ty
                .object_index
                .map_or(0, |idx| self.schema.objects[idx].bytesize),
            base => base.size(),
        };

        let items = (0..len).map(|idx| {
            let elem = start + idx * stride;
            match element {
                BaseType::String => Value::from(<ForwardsUOffset<&str>>::follow(buf, elem)),
                BaseType::Table => self.object(ty.object_index, Table::new(buf, follow(buf, elem))),
                BaseType::Struct => self.structure(ty.object_index, buf, elem),
                base => self.scalar(base, ty, buf, elem),
            }
        });
        Value::Array(items.collect())
    }

    fn object(&self, index: Option<usize>, table: Table<'_>) -> Value {
        index.map_or(Value::Null, |idx| self.table(&self.schema.objects[idx], table))
    }

    fn structure(&self, index: Option<usize>, buf: &[u8], pos: usize) -> Value {
        let Some(obj) = index.map(|idx| &self.schema.objects[idx]) else {
            return Value::Null;
        };
        let view = StructView::new(buf, pos, obj.bytesize);
        let mut map = Map::new();
        for field in &obj.fields {
            let value = match field.ty.base {
                BaseType::Struct => {
                    self.structure(field.ty.object_index, view.bytes(), field.offset)
                }
                base => self.scalar(base, &field.ty, view.bytes(), field.offset),
            };
            map.insert(field.name.clone(), value);
        }
        Value::Object(map)
    }

    fn scalar(&self, base: BaseType, ty: &TypeRef, buf: &[u8], pos: usize) -> Value {
        let number = match base {
            BaseType::Bool => return Value::Bool(read_scalar_at::<u8>(buf, pos) != 0),
            BaseType::Float => return Value::from(f64::from(read_scalar_at::<f32>(buf, pos))),
            BaseType::Double => return Value::from(read_scalar_at::<f64>(buf, pos)),
            BaseType::UType | BaseType::UByte => i64::from(read_scalar_at::<u8>(buf, pos)),
            BaseType::Byte => i64::from(read_scalar_at::<i8>(buf, pos)),
            BaseType::Short => i64::from(read_scalar_at::<i16>(buf, pos)),
            BaseType::UShort => i64::from(read_scalar_at::<u16>(buf, pos)),
            BaseType::Int => i64::from(read_scalar_at::<i32>(buf, pos)),
            BaseType::UInt => i64::from(read_scalar_at::<u32>(buf, pos)),
            BaseType::Long => read_scalar_at::<i64>(buf, pos),
            BaseType::ULong => return Value::from(read_scalar_at::<u64>(buf, pos)),
            _ => return Value::Null,
        };

        let name = ty
            .enum_index
            .and_then(|idx| self.schema.enums[idx].value(number))
            .map(|val| val.name.clone());
        name.map_or(Value::from(number), Value::String)
    }
}

fn follow(buf: &[u8], pos: usize) -> usize {
    pos + read_scalar_at::<u32>(buf, pos) as usize
}
