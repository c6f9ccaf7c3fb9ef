//! Library construction: the per-category namespaces and the dispatch
//! of tagged declarations.

use log::info;

use plcgen_dsl::arena::EntityId;
use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::entity::{EntityKind, Library};
use plcgen_dsl::records::{DocumentRecord, ItemRecord};
use plcgen_problems::Problem;

use crate::context::BuildContext;
use crate::enumeration::build_enum;
use crate::function_block::{build_function_block, build_status};
use crate::process::build_process;
use crate::statemachine::build_statemachine;
use crate::structure::build_struct;

/// Builds a document's library under the global namespace. Declarations
/// are processed in order; each is fully built before the next begins.
pub fn build_library(
    ctx: &mut BuildContext,
    document: &DocumentRecord,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    let name = &document.library.name;
    info!("building library {} from {}", name, file_id);

    let lib = ctx.add_unique_child(ctx.global, name, file_id, EntityKind::Namespace)?;

    let enums = ctx.add_child(lib, "Enums", file_id, EntityKind::Namespace);
    let statuses = ctx.add_child(lib, "Statuses", file_id, EntityKind::Namespace);
    let statemachines = ctx.add_child(lib, "StateMachines", file_id, EntityKind::Namespace);
    let sm_parts = ctx.add_child(statemachines, "Parts", file_id, EntityKind::Namespace);
    let sm_processes = ctx.add_child(statemachines, "Processes", file_id, EntityKind::Namespace);
    let sm_statuses = ctx.add_child(statemachines, "Statuses", file_id, EntityKind::Namespace);
    let configs = ctx.add_child(lib, "Configs", file_id, EntityKind::Namespace);
    let structs = ctx.add_child(lib, "Structs", file_id, EntityKind::Namespace);
    let processes = ctx.add_child(lib, "Processes", file_id, EntityKind::Namespace);
    let process_args = ctx.add_child(processes, "Args", file_id, EntityKind::Namespace);
    let functionblocks = ctx.add_child(lib, "Functionblocks", file_id, EntityKind::Namespace);

    let payload = Library {
        enums,
        statuses,
        statemachines,
        sm_parts,
        sm_processes,
        sm_statuses,
        configs,
        structs,
        processes,
        process_args,
        functionblocks,
    };
    ctx.arena.get_mut(lib).kind = EntityKind::Library(payload);

    for item in &document.library.items {
        match item {
            ItemRecord::Enumeration(record) => {
                let id = build_enum(ctx, lib, record, file_id)?;
                ctx.link(enums, &record.name, id);
            }
            ItemRecord::Statemachine(record) => {
                let id = build_statemachine(ctx, lib, record, file_id)?;
                ctx.link(statemachines, &record.name, id);
            }
            ItemRecord::Status(record) => {
                let id = build_status(ctx, lib, record, file_id)?;
                ctx.link(statuses, &record.name, id);
            }
            ItemRecord::FunctionBlock(record) => {
                let id = build_function_block(ctx, lib, record, file_id)?;
                ctx.link(functionblocks, &record.name, id);
            }
            ItemRecord::Config(record) => {
                let id = build_struct(ctx, lib, record, file_id, true)?;
                ctx.link(configs, &record.name, id);
            }
            ItemRecord::Struct(record) => {
                let id = build_struct(ctx, lib, record, file_id, false)?;
                ctx.link(structs, &record.name, id);
            }
            ItemRecord::Process(record) => {
                let id = build_process(ctx, lib, record, file_id)?;
                ctx.link(processes, &record.name, id);
            }
        }
    }

    ctx.mark_resolved(lib);
    Ok(lib)
}

/// The category-namespace handles of a library entity.
pub(crate) fn library_payload(
    ctx: &BuildContext,
    lib: EntityId,
) -> Result<Library, Diagnostic> {
    match &ctx.arena.get(lib).kind {
        EntityKind::Library(payload) => Ok(*payload),
        _ => Err(ctx.problem_at(
            Problem::SchemaViolation,
            lib,
            "declaration outside a library",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_library_when_items_then_categorized_and_direct_children() {
        let mut ctx = BuildContext::new().unwrap();
        let document: DocumentRecord = serde_json::from_value(json!({
            "library": {
                "name": "axes",
                "items": [
                    { "ENUMERATION": { "name": "Mode", "items": ["IDLE", "RUN"] } },
                    { "STRUCT": { "name": "AxisConfig",
                                  "items": [ { "name": "maxSpeed", "type": "t_double" } ] } }
                ]
            }
        }))
        .unwrap();

        let lib = build_library(&mut ctx, &document, &FileId::from_string("axes.json")).unwrap();

        // Items are direct children of the library and children of their
        // category namespace.
        assert!(ctx.arena.get(lib).children.contains("Mode"));
        let payload = library_payload(&ctx, lib).unwrap();
        assert!(ctx.arena.get(payload.enums).children.contains("Mode"));
        assert!(ctx
            .arena
            .get(payload.structs)
            .children
            .contains("AxisConfig"));
    }

    #[test]
    fn build_library_when_duplicate_item_names_then_duplicate_definition() {
        let mut ctx = BuildContext::new().unwrap();
        let document: DocumentRecord = serde_json::from_value(json!({
            "library": {
                "name": "axes",
                "items": [
                    { "STRUCT": { "name": "Twice" } },
                    { "STRUCT": { "name": "Twice" } }
                ]
            }
        }))
        .unwrap();

        let err = build_library(&mut ctx, &document, &FileId::default()).unwrap_err();
        assert_eq!(err.code, Problem::DuplicateDefinition.code());
    }
}
