//! Process construction.
//!
//! A process is a function block implementing the admission-control
//! pattern. Construction builds the declared interface and the companion
//! arguments struct; the synthesized start/request/dispatch protocol is
//! in `synth_admission`.

use log::debug;

use plcgen_dsl::arena::EntityId;
use plcgen_dsl::core::FileId;
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::entity::{EntityKind, FunctionBlock, Process, Qualifier};
use plcgen_dsl::records::{ProcessRecord, StructRecord, VariableRecord};

use crate::context::BuildContext;
use crate::function_block::{build_group_variable, extend, push_group, Direction};
use crate::library::library_payload;
use crate::structure::build_struct;
use crate::synth_admission;
use crate::variable::build_variable;

/// Builds a process from its record as a child of `library`.
pub fn build_process(
    ctx: &mut BuildContext,
    library: EntityId,
    record: &ProcessRecord,
    file_id: &FileId,
) -> Result<EntityId, Diagnostic> {
    debug!("creating process {}", record.name);
    let id = ctx.add_unique_child(
        library,
        &record.name,
        file_id,
        EntityKind::Process(Process {
            base: FunctionBlock::empty(),
            args_struct: None,
            start: None,
            request: None,
        }),
    )?;

    let base_path = record.extends.as_deref().unwrap_or(crate::BASE_PROCESS);
    extend(ctx, id, base_path, file_id)?;

    for var_record in &record.variables {
        let var = build_variable(ctx, id, var_record, file_id)?;
        push_group(ctx, id, Direction::In, var);
    }
    for var_record in &record.variables_hidden {
        build_group_variable(
            ctx,
            id,
            var_record,
            file_id,
            Direction::In,
            &[Qualifier::OpcUaDeactivate],
        )?;
    }
    for var_record in &record.references {
        build_group_variable(
            ctx,
            id,
            var_record,
            file_id,
            Direction::InOut,
            &[Qualifier::OpcUaDeactivate],
        )?;
    }

    let args_name = format!("{}Args", record.name);
    if !record.arguments.is_empty() {
        let struct_record = StructRecord {
            name: args_name.clone(),
            items: record.arguments.clone(),
            comment: None,
            type_of: None,
        };
        let args_struct = build_struct(ctx, library, &struct_record, file_id, false)?;
        let payload = library_payload(ctx, library)?;
        ctx.link(payload.process_args, &args_name, args_struct);
        if let EntityKind::Process(process) = &mut ctx.arena.get_mut(id).kind {
            process.args_struct = Some(args_struct);
        }
    }

    if record.variables.is_empty() && record.arguments.is_empty() {
        // An empty subclass publishes no members over the wire
        // interface, so keep one hidden variable.
        let mut test_var = VariableRecord::typed("testVar", "t_bool")
            .with_comment("Placeholder so the inherited interface stays exposed");
        test_var.qualifiers = vec![Qualifier::OpcUaDeactivate];
        let var = build_variable(ctx, id, &test_var, file_id)?;
        push_group(ctx, id, Direction::Local, var);
    }

    if !record.arguments.is_empty() {
        let mut set_record = VariableRecord::typed("set", &args_name)
            .with_comment("Arguments to be set, before requesting the process");
        set_record.qualifiers = vec![Qualifier::OpcUaActivate];
        let set_var = build_variable(ctx, id, &set_record, file_id)?;
        push_group(ctx, id, Direction::In, set_var);

        let mut get_record = VariableRecord::typed("get", &args_name)
            .with_comment("Arguments in use by the process, if the request was accepted");
        get_record.qualifiers = vec![Qualifier::OpcUaActivate, Qualifier::OpcUaAccessRead];
        let get_var = build_variable(ctx, id, &get_record, file_id)?;
        push_group(ctx, id, Direction::Out, get_var);
    }

    synth_admission::synthesize(ctx, id, &record.arguments, file_id)?;

    ctx.mark_resolved(id);
    Ok(id)
}
