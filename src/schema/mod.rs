//! Layout metadata: a resolved, runtime description of tables, structs, enums and unions.
//!
//! Generated code knows a buffer's layout at compile time. Tools that only know it at runtime
//! load it as a [`Schema`] instead, from a JSON document such as:
//!
//! ```json
//! {
//!   "root_table": "Point",
//!   "file_identifier": "PNT0",
//!   "objects": [
//!     { "name": "Point", "fields": [
//!       { "name": "x", "slot": 0, "type": { "base": "int" } },
//!       { "name": "y", "slot": 1, "type": { "base": "int" }, "default": 0 }
//!     ] }
//!   ],
//!   "enums": []
//! }
//! ```
//!
//! [`Schema::resolve`] turns the names into indices, computes struct layouts and rejects
//! inconsistent metadata. A resolved schema drives [`verify_with_schema`] and [`to_json`].
//!
//! # Examples
//!
//! ```rust
//! use tabwire::{schema::verify_with_schema, Builder, Schema, VerifierConfig};
//!
//! let schema = Schema::from_json(r#"{
//!     "root_table": "Point",
//!     "objects": [{ "name": "Point", "fields": [
//!         { "name": "x", "slot": 0, "type": { "base": "int" } },
//!         { "name": "y", "slot": 1, "type": { "base": "int" } }
//!     ] }]
//! }"#)?;
//!
//! let mut builder = Builder::new();
//! let start = builder.start_table();
//! builder.add_field::<i32>(0, 3, 0)?;
//! let root = builder.end_table(start)?;
//! let data = builder.finish(root, None)?;
//!
//! verify_with_schema(&schema, &data, &VerifierConfig::default())?;
//! assert_eq!(tabwire::schema::to_json(&schema, &data)?["x"], 3);
//! # Ok::<(), tabwire::Error>(())
//! ```

mod reflect;
mod types;
mod verify;

pub use reflect::to_json;
pub use types::{BaseType, EnumDef, EnumVal, FieldDef, FieldFlags, ObjectDef, TypeRef};
pub use verify::verify_with_schema;

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{wire::FILE_IDENTIFIER_LENGTH, Result};

/// Complete layout metadata of one buffer type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Tables and structs
    #[serde(default)]
    pub objects: Vec<ObjectDef>,

    /// Enums and unions
    #[serde(default)]
    pub enums: Vec<EnumDef>,

    /// Name of the root table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_table: Option<String>,

    /// File identifier the buffers carry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_identifier: Option<String>,

    #[serde(skip)]
    root_index: Option<usize>,
}

#[derive(Clone, Copy, PartialEq)]
enum LayoutState {
    Pending,
    InProgress,
    Done,
}

impl Schema {
    /// Parses and resolves layout metadata from JSON.
    ///
    /// # Errors
    /// Returns [`crate::Error::Json`] for invalid JSON and [`crate::Error::Malformed`] for
    /// inconsistent metadata.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut schema: Schema = serde_json::from_str(json)?;
        schema.resolve()?;
        Ok(schema)
    }

    /// Reads, parses and resolves layout metadata from a JSON file.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read, otherwise see
    /// [`Schema::from_json`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Resolves type names to indices, lays out structs and checks consistency.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] naming the first inconsistency: duplicate or
    /// unknown names, a table used as struct or the other way round, duplicate slots,
    /// struct members that are not inline, recursive structs, hashes on fields of the wrong
    /// width, or a file identifier that is not 4 bytes long.
    pub fn resolve(&mut self) -> Result<()> {
        let object_names = index_names(self.objects.iter().map(|obj| obj.name.as_str()), "object")?;
        let enum_names = index_names(self.enums.iter().map(|def| def.name.as_str()), "enum")?;
        let is_struct: Vec<bool> = self.objects.iter().map(|obj| obj.is_struct).collect();
        let is_union: Vec<bool> = self.enums.iter().map(|def| def.is_union).collect();

        for def in &mut self.enums {
            resolve_enum(def, &object_names, &is_struct)?;
        }

        let resolver = Resolver {
            object_names: &object_names,
            enum_names: &enum_names,
            is_struct: &is_struct,
            is_union: &is_union,
        };
        for obj in &mut self.objects {
            resolver.resolve_object(obj)?;
        }

        let mut state = vec![LayoutState::Pending; self.objects.len()];
        for idx in 0..self.objects.len() {
            if self.objects[idx].is_struct {
                layout_struct(&mut self.objects, idx, &mut state)?;
            }
        }

        self.root_index = match &self.root_table {
            Some(name) => Some(resolver.table(name, "root_table")?),
            None => None,
        };

        if let Some(ident) = &self.file_identifier {
            if ident.len() != FILE_IDENTIFIER_LENGTH {
                return Err(malformed_error!(
                    "file identifier `{}` must be {} bytes long",
                    ident,
                    FILE_IDENTIFIER_LENGTH
                ));
            }
        }
        Ok(())
    }

    /// The root table, if one is declared.
    #[must_use]
    pub fn root(&self) -> Option<&ObjectDef> {
        self.root_index.map(|idx| &self.objects[idx])
    }

    /// Looks up a table or struct by name.
    #[must_use]
    pub fn object(&self, name: &str) -> Option<&ObjectDef> {
        self.objects.iter().find(|obj| obj.name == name)
    }

    /// Looks up an enum or union by name.
    #[must_use]
    pub fn enum_def(&self, name: &str) -> Option<&EnumDef> {
        self.enums.iter().find(|def| def.name == name)
    }
}

fn index_names<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: &str,
) -> Result<HashMap<String, usize>> {
    let mut map = HashMap::new();
    for (idx, name) in names.enumerate() {
        if map.insert(name.to_string(), idx).is_some() {
            return Err(malformed_error!("duplicate {} name `{}`", kind, name));
        }
    }
    Ok(map)
}

fn resolve_enum(
    def: &mut EnumDef,
    object_names: &HashMap<String, usize>,
    is_struct: &[bool],
) -> Result<()> {
    if def.is_union {
        if !matches!(def.underlying, BaseType::UType | BaseType::UByte) {
            return Err(malformed_error!(
                "union `{}` must use `utype` discriminants",
                def.name
            ));
        }
    } else if !def.underlying.is_integer() {
        return Err(malformed_error!(
            "enum `{}` has non-integer underlying type `{}`",
            def.name,
            def.underlying
        ));
    }

    let mut seen = HashMap::new();
    for val in &mut def.values {
        if let Some(previous) = seen.insert(val.value, val.name.clone()) {
            return Err(malformed_error!(
                "`{}` and `{}` of `{}` share the value {}",
                previous,
                val.name,
                def.name,
                val.value
            ));
        }
        if !def.is_union {
            continue;
        }
        if !(0..=i64::from(u8::MAX)).contains(&val.value) {
            return Err(malformed_error!(
                "union `{}` variant `{}` has out of range discriminant {}",
                def.name,
                val.name,
                val.value
            ));
        }
        val.object_index = match (&val.object, val.value) {
            (None, 0) => None,
            (None, _) => {
                return Err(malformed_error!(
                    "union `{}` variant `{}` names no table",
                    def.name,
                    val.name
                ))
            }
            (Some(name), _) => match object_names.get(name) {
                Some(&idx) if !is_struct[idx] => Some(idx),
                _ => {
                    return Err(malformed_error!(
                        "union `{}` variant `{}` refers to unknown table `{}`",
                        def.name,
                        val.name,
                        name
                    ))
                }
            },
        };
    }
    Ok(())
}

struct Resolver<'a> {
    object_names: &'a HashMap<String, usize>,
    enum_names: &'a HashMap<String, usize>,
    is_struct: &'a [bool],
    is_union: &'a [bool],
}

impl Resolver<'_> {
    fn object(&self, name: &str, want_struct: bool, context: &str) -> Result<usize> {
        match self.object_names.get(name) {
            Some(&idx) if self.is_struct[idx] == want_struct => Ok(idx),
            Some(_) => Err(malformed_error!(
                "{}: `{}` is not a {}",
                context,
                name,
                if want_struct { "struct" } else { "table" }
            )),
            None => Err(malformed_error!("{}: unknown object `{}`", context, name)),
        }
    }

    fn table(&self, name: &str, context: &str) -> Result<usize> {
        self.object(name, false, context)
    }

    fn resolve_type(&self, ty: &mut TypeRef, context: &str) -> Result<()> {
        let inline = match ty.base {
            BaseType::Vector => match ty.element {
                Some(BaseType::Vector | BaseType::Union | BaseType::None) | None => {
                    return Err(malformed_error!(
                        "{}: vector needs a scalar, string, struct or table element type",
                        context
                    ))
                }
                Some(element) => element,
            },
            base => base,
        };

        if matches!(inline, BaseType::Struct | BaseType::Table) {
            let Some(name) = &ty.object else {
                return Err(malformed_error!("{}: `{}` needs an object name", context, inline));
            };
            ty.object_index = Some(self.object(name, inline == BaseType::Struct, context)?);
        }

        if let Some(name) = &ty.enum_name {
            let Some(&idx) = self.enum_names.get(name) else {
                return Err(malformed_error!("{}: unknown enum `{}`", context, name));
            };
            let wants_union = matches!(inline, BaseType::Union | BaseType::UType);
            if self.is_union[idx] != wants_union {
                return Err(malformed_error!(
                    "{}: enum `{}` does not fit type `{}`",
                    context,
                    name,
                    inline
                ));
            }
            ty.enum_index = Some(idx);
        } else if inline == BaseType::Union {
            return Err(malformed_error!("{}: union needs an enum name", context));
        }
        Ok(())
    }

    fn resolve_object(&self, obj: &mut ObjectDef) -> Result<()> {
        let mut slots = HashMap::new();
        for field in &mut obj.fields {
            let context = format!("{}.{}", obj.name, field.name);
            self.resolve_type(&mut field.ty, &context)?;

            if obj.is_struct {
                if !(field.ty.base.is_scalar() || field.ty.base == BaseType::Struct)
                    || field.ty.base == BaseType::UType
                {
                    return Err(malformed_error!(
                        "{}: struct members must be scalars or structs",
                        context
                    ));
                }
            } else {
                if let Some(previous) = slots.insert(field.slot, field.name.clone()) {
                    return Err(malformed_error!(
                        "{}: slot {} already used by `{}`",
                        context,
                        field.slot,
                        previous
                    ));
                }
                if field.ty.base == BaseType::Union && field.slot == 0 {
                    return Err(malformed_error!(
                        "{}: union values need the preceding slot for their discriminant",
                        context
                    ));
                }
            }

            if let Some(root) = &field.nested_root {
                if field.ty.base != BaseType::Vector || field.ty.element != Some(BaseType::UByte) {
                    return Err(malformed_error!(
                        "{}: nested buffers must be stored in `[ubyte]` fields",
                        context
                    ));
                }
                field.nested_root_index = Some(self.table(root, &context)?);
            }

            if let Some(algorithm) = field.hash {
                let base = field.ty.inline_type();
                if !base.is_integer() || base.size() != algorithm.width() {
                    return Err(malformed_error!(
                        "{}: hash `{}` does not fit type `{}`",
                        context,
                        algorithm,
                        base
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Computes member offsets, size and alignment of the struct at `idx`, nested structs first.
fn layout_struct(objects: &mut [ObjectDef], idx: usize, state: &mut [LayoutState]) -> Result<()> {
    match state[idx] {
        LayoutState::Done => return Ok(()),
        LayoutState::InProgress => {
            return Err(malformed_error!("struct `{}` contains itself", objects[idx].name))
        }
        LayoutState::Pending => state[idx] = LayoutState::InProgress,
    }

    if objects[idx].fields.is_empty() {
        return Err(malformed_error!("struct `{}` has no fields", objects[idx].name));
    }

    let nested: Vec<usize> = objects[idx]
        .fields
        .iter()
        .filter_map(|field| field.ty.object_index)
        .collect();
    for member in nested {
        layout_struct(objects, member, state)?;
    }

    let members: Vec<(usize, usize)> = objects[idx]
        .fields
        .iter()
        .map(|field| match field.ty.object_index {
            Some(member) => (objects[member].bytesize, objects[member].minalign),
            None => (field.ty.base.size(), field.ty.base.size()),
        })
        .collect();

    let mut offset: usize = 0;
    let mut minalign = 1;
    for (field, (size, align)) in objects[idx].fields.iter_mut().zip(members) {
        offset = offset.next_multiple_of(align);
        field.offset = offset;
        offset += size;
        minalign = minalign.max(align);
    }

    let obj = &mut objects[idx];
    obj.minalign = minalign;
    obj.bytesize = offset.next_multiple_of(minalign);
    state[idx] = LayoutState::Done;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const VEC3: &str = r#"{
        "root_table": "Holder",
        "file_identifier": "HOLD",
        "objects": [
            { "name": "Holder", "fields": [
                { "name": "pos", "slot": 0, "type": { "base": "struct", "object": "Vec3" } }
            ] },
            { "name": "Vec3", "is_struct": true, "fields": [
                { "name": "x", "type": { "base": "float" } },
                { "name": "y", "type": { "base": "float" } },
                { "name": "z", "type": { "base": "float" } },
                { "name": "test1", "type": { "base": "double" } },
                { "name": "test2", "type": { "base": "byte" } },
                { "name": "test3", "type": { "base": "struct", "object": "Test" } }
            ] },
            { "name": "Test", "is_struct": true, "fields": [
                { "name": "a", "type": { "base": "short" } },
                { "name": "b", "type": { "base": "byte" } }
            ] }
        ]
    }"#;

    fn malformed_message(json: &str) -> String {
        match Schema::from_json(json) {
            Err(Error::Malformed { message, .. }) => message,
            other => panic!("expected malformed metadata, got {other:?}"),
        }
    }

    #[test]
    fn struct_layout() {
        let schema = Schema::from_json(VEC3).unwrap();

        let test = schema.object("Test").unwrap();
        assert_eq!((test.bytesize, test.minalign), (4, 2));
        assert_eq!(test.field("b").unwrap().offset, 2);

        let vec3 = schema.object("Vec3").unwrap();
        let offsets: Vec<usize> = vec3.fields.iter().map(|field| field.offset).collect();
        assert_eq!(offsets, vec![0, 4, 8, 16, 24, 26]);
        assert_eq!(vec3.minalign, 8);
        assert_eq!(vec3.bytesize, 32);

        assert_eq!(schema.root().unwrap().name, "Holder");
        assert_eq!(
            schema.root().unwrap().fields[0].ty.object_index,
            schema.objects.iter().position(|obj| obj.name == "Vec3")
        );
    }

    #[test]
    fn duplicate_slot() {
        let message = malformed_message(
            r#"{ "objects": [{ "name": "T", "fields": [
                { "name": "a", "slot": 1, "type": { "base": "int" } },
                { "name": "b", "slot": 1, "type": { "base": "int" } }
            ] }] }"#,
        );
        assert!(message.contains("slot 1 already used by `a`"), "{message}");
    }

    #[test]
    fn unknown_and_mismatched_objects() {
        let message = malformed_message(
            r#"{ "objects": [{ "name": "T", "fields": [
                { "name": "a", "slot": 0, "type": { "base": "table", "object": "Nope" } }
            ] }] }"#,
        );
        assert!(message.contains("unknown object `Nope`"), "{message}");

        let message = malformed_message(
            r#"{ "objects": [
                { "name": "T", "fields": [
                    { "name": "a", "slot": 0, "type": { "base": "table", "object": "S" } }
                ] },
                { "name": "S", "is_struct": true, "fields": [
                    { "name": "x", "type": { "base": "int" } }
                ] }
            ] }"#,
        );
        assert!(message.contains("`S` is not a table"), "{message}");
    }

    #[test]
    fn recursive_struct() {
        let message = malformed_message(
            r#"{ "objects": [
                { "name": "A", "is_struct": true, "fields": [
                    { "name": "b", "type": { "base": "struct", "object": "B" } }
                ] },
                { "name": "B", "is_struct": true, "fields": [
                    { "name": "a", "type": { "base": "struct", "object": "A" } }
                ] }
            ] }"#,
        );
        assert!(message.contains("contains itself"), "{message}");
    }

    #[test]
    fn struct_members_must_be_inline() {
        let message = malformed_message(
            r#"{ "objects": [{ "name": "S", "is_struct": true, "fields": [
                { "name": "s", "type": { "base": "string" } }
            ] }] }"#,
        );
        assert!(message.contains("struct members"), "{message}");
    }

    #[test]
    fn hash_width_must_match() {
        let message = malformed_message(
            r#"{ "objects": [{ "name": "T", "fields": [
                { "name": "id", "slot": 0, "type": { "base": "uint" }, "hash": "fnv1_64" }
            ] }] }"#,
        );
        assert!(message.contains("hash `fnv1_64`"), "{message}");
    }

    #[test]
    fn union_checks() {
        let message = malformed_message(
            r#"{ "objects": [{ "name": "T", "fields": [
                    { "name": "v", "slot": 0, "type": { "base": "union", "enum": "Any" } }
                ] }],
                "enums": [{ "name": "Any", "underlying": "utype", "is_union": true, "values": [
                    { "name": "NONE", "value": 0 },
                    { "name": "T", "value": 1, "object": "T" }
                ] }] }"#,
        );
        assert!(message.contains("preceding slot"), "{message}");

        let message = malformed_message(
            r#"{ "objects": [{ "name": "T", "fields": [] }],
                "enums": [{ "name": "Any", "underlying": "utype", "is_union": true, "values": [
                    { "name": "T", "value": 1 }
                ] }] }"#,
        );
        assert!(message.contains("names no table"), "{message}");
    }

    #[test]
    fn bad_identifier_and_json() {
        let message = malformed_message(r#"{ "file_identifier": "TOOLONG" }"#);
        assert!(message.contains("must be 4 bytes"), "{message}");
        assert!(matches!(Schema::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, VEC3.as_bytes()).unwrap();
        let schema = Schema::from_file(file.path()).unwrap();
        assert_eq!(schema.file_identifier.as_deref(), Some("HOLD"));

        assert!(matches!(
            Schema::from_file(Path::new("/nonexistent/layout.json")),
            Err(Error::FileError(_))
        ));
    }
}
