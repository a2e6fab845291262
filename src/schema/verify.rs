use log::debug;

use crate::{
    schema::{BaseType, FieldDef, ObjectDef, Schema},
    verifier::{check_identifier, Verifiable, Verifier, VerifierConfig},
    view::ForwardsUOffset,
    wire::SIZE_UOFFSET,
    Result,
};

/// Verifies `buf` against the root table of `schema`, without any generated code.
///
/// The walk performs the same checks as a generated verifier: ranges, alignment, strings,
/// required fields, unions, nested buffers and the configured budgets. If the schema declares
/// a file identifier, the buffer must carry it.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the schema has no root table, otherwise the first
/// defect found in the buffer.
pub fn verify_with_schema(schema: &Schema, buf: &[u8], config: &VerifierConfig) -> Result<()> {
    let Some(root) = schema.root() else {
        return Err(malformed_error!("layout metadata declares no root table"));
    };
    if let Some(ident) = &schema.file_identifier {
        check_identifier(buf, ident)?;
    }

    let mut verifier = Verifier::new(config, buf);
    let pos = verifier.follow_offset(0)?;
    let result = verify_table(schema, root, &mut verifier, pos);
    if let Err(err) = &result {
        debug!("`{}` buffer failed verification: {err}", root.name);
    }
    result
}

fn verify_table(
    schema: &Schema,
    obj: &ObjectDef,
    v: &mut Verifier<'_, '_>,
    pos: usize,
) -> Result<()> {
    let mut table = v.visit_table(pos)?;
    for field in &obj.fields {
        let required = field.is_required();
        table = match field.ty.base {
            BaseType::Union => {
                let tag_slot = field.slot - 1;
                let tag_name = obj
                    .field_by_slot(tag_slot)
                    .map_or_else(|| format!("{}_type", field.name), |tag| tag.name.clone());
                let verify_variant = |tag: u8, v: &mut Verifier<'_, '_>, pos: usize| {
                    let variant = field
                        .ty
                        .enum_index
                        .and_then(|idx| schema.enums[idx].value(i64::from(tag)))?;
                    let target = variant.object_index?;
                    Some(v.follow_offset(pos).and_then(|table_pos| {
                        verify_table(schema, &schema.objects[target], v, table_pos)
                    }))
                };
                table.visit_union(
                    &tag_name,
                    tag_slot,
                    &field.name,
                    field.slot,
                    required,
                    verify_variant,
                )?
            }
            _ => table.visit_field_with(&field.name, field.slot, required, |v, pos| {
                verify_field(schema, field, v, pos)
            })?,
        };
    }
    table.finish();
    Ok(())
}

fn verify_field(
    schema: &Schema,
    field: &FieldDef,
    v: &mut Verifier<'_, '_>,
    pos: usize,
) -> Result<()> {
    let ty = &field.ty;
    match ty.base {
        BaseType::Struct => verify_struct(schema, ty.object_index, v, pos),
        BaseType::String => ForwardsUOffset::<&str>::run_verifier(v, pos),
        BaseType::Table => {
            let target = v.follow_offset(pos)?;
            verify_object(schema, ty.object_index, v, target)
        }
        BaseType::Vector => {
            let target = v.follow_offset(pos)?;
            match field.nested_root_index {
                Some(root) => {
                    let (start, len) = v.verify_vector_range(target, 1, 1)?;
                    v.verify_nested(start, len, |nested| {
                        let nested_pos = nested.follow_offset(0)?;
                        verify_table(schema, &schema.objects[root], nested, nested_pos)
                    })
                }
                None => verify_vector(schema, field, v, target),
            }
        }
        BaseType::None | BaseType::Union => Ok(()),
        base => verify_scalar(base, v, pos),
    }
}

fn verify_vector(
    schema: &Schema,
    field: &FieldDef,
    v: &mut Verifier<'_, '_>,
    pos: usize,
) -> Result<()> {
    let element = field.ty.inline_type();
    match element {
        BaseType::Struct => {
            let obj = struct_def(schema, field.ty.object_index)?;
            v.verify_vector_range(pos, obj.bytesize, obj.minalign)?;
        }
        BaseType::String | BaseType::Table => {
            let (start, len) = v.verify_vector_range(pos, SIZE_UOFFSET, SIZE_UOFFSET)?;
            for idx in 0..len {
                let elem = start + idx * SIZE_UOFFSET;
                let result = if element == BaseType::String {
                    ForwardsUOffset::<&str>::run_verifier(v, elem)
                } else {
                    v.follow_offset(elem)
                        .and_then(|target| verify_object(schema, field.ty.object_index, v, target))
                };
                result.map_err(|err| err.in_field(format!("[{idx}]")))?;
            }
        }
        base => {
            v.verify_vector_range(pos, base.size(), base.size())?;
        }
    }
    Ok(())
}

fn verify_object(
    schema: &Schema,
    index: Option<usize>,
    v: &mut Verifier<'_, '_>,
    pos: usize,
) -> Result<()> {
    match index {
        Some(idx) => verify_table(schema, &schema.objects[idx], v, pos),
        None => Err(malformed_error!("table type was never resolved")),
    }
}

fn verify_struct(
    schema: &Schema,
    index: Option<usize>,
    v: &mut Verifier<'_, '_>,
    pos: usize,
) -> Result<()> {
    let obj = struct_def(schema, index)?;
    v.verify_struct(pos, obj.bytesize, obj.minalign)
}

fn struct_def(schema: &Schema, index: Option<usize>) -> Result<&ObjectDef> {
    index
        .map(|idx| &schema.objects[idx])
        .ok_or_else(|| malformed_error!("struct type was never resolved"))
}

fn verify_scalar(base: BaseType, v: &mut Verifier<'_, '_>, pos: usize) -> Result<()> {
    match base {
        BaseType::Bool => v.in_buffer::<bool>(pos),
        BaseType::UType | BaseType::UByte => v.in_buffer::<u8>(pos),
        BaseType::Byte => v.in_buffer::<i8>(pos),
        BaseType::Short => v.in_buffer::<i16>(pos),
        BaseType::UShort => v.in_buffer::<u16>(pos),
        BaseType::Int => v.in_buffer::<i32>(pos),
        BaseType::UInt => v.in_buffer::<u32>(pos),
        BaseType::Long => v.in_buffer::<i64>(pos),
        BaseType::ULong => v.in_buffer::<u64>(pos),
        BaseType::Float => v.in_buffer::<f32>(pos),
        BaseType::Double => v.in_buffer::<f64>(pos),
        other => Err(malformed_error!("`{}` is not a scalar type", other)),
    }
}
