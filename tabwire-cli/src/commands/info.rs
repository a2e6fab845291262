use std::path::Path;

use serde::Serialize;
use tabwire::{schema::ObjectDef, Table, VerifierConfig};

use crate::{
    app::GlobalOptions,
    commands::common::{format_identifier, load_buffer, load_schema},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
pub struct BufferInfo {
    pub path: String,
    pub size: usize,
    pub root_offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<RootTableInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RootTableInfo {
    pub position: usize,
    pub vtable_position: usize,
    pub vtable_size: usize,
    pub inline_size: usize,
    pub slots: usize,
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Serialize)]
pub struct FieldInfo {
    pub slot: u16,
    pub offset: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

fn describe_root(table: Table<'_>, layout: Option<&ObjectDef>) -> RootTableInfo {
    let vtable = table.vtable();
    let slots = vtable.num_fields();

    let fields = (0..slots)
        .filter_map(|slot| u16::try_from(slot).ok())
        .filter(|&slot| table.has_field(slot))
        .map(|slot| {
            let def = layout.and_then(|obj| obj.field_by_slot(slot));
            FieldInfo {
                slot,
                offset: table.field_offset(slot),
                name: def.map(|field| field.name.clone()),
                r#type: def.map(|field| field.ty.base.to_string()),
            }
        })
        .collect();

    RootTableInfo {
        position: table.loc(),
        vtable_position: vtable.loc(),
        vtable_size: vtable.num_bytes(),
        inline_size: vtable.object_inline_num_bytes(),
        slots,
        fields,
    }
}

pub fn run(path: &Path, schema: Option<&Path>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let file = load_buffer(path)?;
    let schema = schema.map(load_schema).transpose()?;
    let layout = schema.as_ref().and_then(|schema| schema.root());

    let identifier = file
        .identifier()
        .filter(|ident| ident.iter().any(|&b| b != 0))
        .map(format_identifier);

    let (root, error_message) = match file.verify::<Table>(&VerifierConfig::default()) {
        Ok(()) => {
            let table = file.root::<Table>()?;
            (Some(describe_root(table, layout)), None)
        }
        Err(e) => (None, Some(e.to_string())),
    };

    let info = BufferInfo {
        path: path.display().to_string(),
        size: file.len(),
        root_offset: file.root_offset()?,
        identifier,
        root_type: layout.map(|obj| obj.name.clone()),
        root,
        error_message,
    };

    print_output(&info, opts, |info| {
        println!("Buffer:        {}", info.path);
        println!("Size:          {} bytes", info.size);
        println!("Root offset:   {}", info.root_offset);
        if let Some(ident) = &info.identifier {
            println!("Identifier:    {ident}");
        }
        if let Some(root_type) = &info.root_type {
            println!("Root type:     {root_type}");
        }
        if let Some(err) = &info.error_message {
            println!("Error:         {err}");
        }

        let Some(root) = &info.root else {
            return;
        };
        println!("Root table:    {}", root.position);
        println!(
            "VTable:        {} ({} bytes, {} slots)",
            root.vtable_position, root.vtable_size, root.slots
        );
        println!("Inline size:   {} bytes", root.inline_size);

        if !root.fields.is_empty() {
            println!("\nFields:");
            let mut tw = TabWriter::new(vec![
                ("Slot", Align::Right),
                ("Offset", Align::Right),
                ("Name", Align::Left),
                ("Type", Align::Left),
            ])
            .indent("  ");
            for field in &root.fields {
                tw.row(vec![
                    field.slot.to_string(),
                    field.offset.to_string(),
                    field.name.clone().unwrap_or_default(),
                    field.r#type.clone().unwrap_or_default(),
                ]);
            }
            tw.print();
        }
    })
}
