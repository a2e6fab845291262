use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString};

use crate::{hash::HashAlgorithm, wire::SIZE_UOFFSET};

/// Wire type of a field, vector element or enum.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BaseType {
    /// No value
    None,
    /// Union discriminant, stored as `u8`
    UType,
    /// Boolean, stored as one byte
    Bool,
    /// `i8`
    Byte,
    /// `u8`
    UByte,
    /// `i16`
    Short,
    /// `u16`
    UShort,
    /// `i32`
    Int,
    /// `u32`
    UInt,
    /// `i64`
    Long,
    /// `u64`
    ULong,
    /// `f32`
    Float,
    /// `f64`
    Double,
    /// Offset to a zero terminated UTF-8 string
    String,
    /// Offset to a length-prefixed vector
    Vector,
    /// Inline fixed-layout struct
    Struct,
    /// Offset to a table
    Table,
    /// Offset to the table selected by a discriminant
    Union,
}

impl BaseType {
    /// Inline size in bytes. Structs report 0; their size comes from the object definition.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            BaseType::None | BaseType::Struct => 0,
            BaseType::UType | BaseType::Bool | BaseType::Byte | BaseType::UByte => 1,
            BaseType::Short | BaseType::UShort => 2,
            BaseType::Int | BaseType::UInt | BaseType::Float => 4,
            BaseType::Long | BaseType::ULong | BaseType::Double => 8,
            BaseType::String | BaseType::Vector | BaseType::Table | BaseType::Union => {
                SIZE_UOFFSET
            }
        }
    }

    /// Whether the type is stored inline as a number or boolean.
    #[must_use]
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            BaseType::UType
                | BaseType::Bool
                | BaseType::Byte
                | BaseType::UByte
                | BaseType::Short
                | BaseType::UShort
                | BaseType::Int
                | BaseType::UInt
                | BaseType::Long
                | BaseType::ULong
                | BaseType::Float
                | BaseType::Double
        )
    }

    /// Whether the type is an integer, which includes union discriminants.
    #[must_use]
    pub fn is_integer(self) -> bool {
        self.is_scalar() && !self.is_float() && self != BaseType::Bool
    }

    /// Whether the type is `float` or `double`.
    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, BaseType::Float | BaseType::Double)
    }

    /// Whether the type is stored as an offset to data elsewhere in the buffer.
    #[must_use]
    pub fn is_offset(self) -> bool {
        matches!(
            self,
            BaseType::String | BaseType::Vector | BaseType::Table | BaseType::Union
        )
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    /// Attributes of a field
    pub struct FieldFlags: u8 {
        /// The verifier rejects tables without this field
        const REQUIRED = 0x01;
        /// The field is no longer written; its slot stays reserved
        const DEPRECATED = 0x02;
        /// The field is the sort key of its table
        const KEY = 0x04;
    }
}

impl Default for FieldFlags {
    fn default() -> Self {
        FieldFlags::empty()
    }
}

/// Type of a field, with references to other definitions by name.
///
/// Names are resolved to indices by [`crate::Schema::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    /// The wire type
    pub base: BaseType,

    /// Element type of a vector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<BaseType>,

    /// Name of the struct or table for `struct`, `table` and vectors of them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,

    /// Name of the enum of an enum-typed scalar, or of the union
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,

    /// Resolved index into [`crate::Schema::objects`]
    #[serde(skip)]
    pub object_index: Option<usize>,

    /// Resolved index into [`crate::Schema::enums`]
    #[serde(skip)]
    pub enum_index: Option<usize>,
}

impl TypeRef {
    /// A type without references, e.g. a scalar or a string.
    #[must_use]
    pub fn new(base: BaseType) -> Self {
        TypeRef {
            base,
            element: None,
            object: None,
            enum_name: None,
            object_index: None,
            enum_index: None,
        }
    }

    /// The type stored inline at each element position: the element type for vectors,
    /// the base type otherwise.
    #[must_use]
    pub fn inline_type(&self) -> BaseType {
        match (self.base, self.element) {
            (BaseType::Vector, Some(element)) => element,
            (base, _) => base,
        }
    }
}

/// A field of a table or struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,

    /// Vtable slot (tables only)
    #[serde(default)]
    pub slot: u16,

    /// Field type
    #[serde(rename = "type")]
    pub ty: TypeRef,

    /// Default value of a scalar field
    #[serde(default)]
    pub default: f64,

    /// Field attributes
    #[serde(default)]
    pub flags: FieldFlags,

    /// Root table of the buffer nested in this `[ubyte]` field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_root: Option<String>,

    /// Hash applied to string keys stored in this integer field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashAlgorithm>,

    /// Byte offset inside the struct (structs only, computed on resolve)
    #[serde(skip)]
    pub offset: usize,

    /// Resolved index of the nested root table
    #[serde(skip)]
    pub nested_root_index: Option<usize>,
}

impl FieldDef {
    /// Whether the verifier rejects tables without this field.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.flags.contains(FieldFlags::REQUIRED)
    }

    /// Whether the field is deprecated.
    #[must_use]
    pub fn is_deprecated(&self) -> bool {
        self.flags.contains(FieldFlags::DEPRECATED)
    }

    /// Whether the field is its table's sort key.
    #[must_use]
    pub fn is_key(&self) -> bool {
        self.flags.contains(FieldFlags::KEY)
    }

    /// The value stored for `key` in a hashed field, or `None` if the field is not hashed.
    #[must_use]
    pub fn hash_value(&self, key: &str) -> Option<u64> {
        self.hash.map(|algorithm| algorithm.hash(key.as_bytes()))
    }
}

/// A table or struct definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDef {
    /// Type name
    pub name: String,

    /// Whether this is a fixed-layout struct rather than a table
    #[serde(default)]
    pub is_struct: bool,

    /// Fields in declaration order
    pub fields: Vec<FieldDef>,

    /// Size of a struct in bytes (computed on resolve)
    #[serde(default)]
    pub bytesize: usize,

    /// Alignment of a struct (computed on resolve)
    #[serde(default)]
    pub minalign: usize,
}

impl ObjectDef {
    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Looks up a table field by vtable slot.
    #[must_use]
    pub fn field_by_slot(&self, slot: u16) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.slot == slot)
    }

    /// The field marked as sort key, if any.
    #[must_use]
    pub fn key_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|field| field.is_key())
    }
}

/// A named value of an enum or a variant of a union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVal {
    /// Value name
    pub name: String,

    /// Numeric value, the discriminant for unions
    pub value: i64,

    /// Table selected by this union variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,

    /// Resolved index of the variant's table
    #[serde(skip)]
    pub object_index: Option<usize>,
}

/// An enum or union definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    /// Type name
    pub name: String,

    /// Storage type of the values (`utype` for unions)
    pub underlying: BaseType,

    /// Whether this is a union
    #[serde(default)]
    pub is_union: bool,

    /// Declared values
    pub values: Vec<EnumVal>,
}

impl EnumDef {
    /// Looks up the entry whose numeric value is `value`.
    #[must_use]
    pub fn value(&self, value: i64) -> Option<&EnumVal> {
        self.values.iter().find(|val| val.value == value)
    }
}
