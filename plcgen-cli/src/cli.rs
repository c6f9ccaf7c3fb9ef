//! Implements the command line behavior.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use plcgen_builder::{BuildContext, Scheduler};
use plcgen_dsl::arena::EntityId;
use plcgen_dsl::diagnostic::Diagnostic;
use plcgen_dsl::export;
use plcgen_loader::DirectorySource;

/// Builds and validates every model document under the input directory.
pub fn check(input: &Path) -> Result<(), String> {
    build_models(input)?;
    println!("OK");
    Ok(())
}

/// Builds the models and writes one resolved model file per document.
pub fn export(input: &Path, output: &Path) -> Result<(), String> {
    let (ctx, libraries) = build_models(input)?;

    for (name, library) in libraries {
        let value = export::export(&ctx.arena, library);
        let text = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;

        let out_path = output.join(model_file_name(&name));
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        info!("writing output file {:?}", out_path);
        fs::write(&out_path, text).map_err(|e| e.to_string())?;
    }

    println!("OK");
    Ok(())
}

fn model_file_name(document: &str) -> PathBuf {
    let stem = document.strip_suffix(".json").unwrap_or(document);
    PathBuf::from(format!("{}.model.json", stem))
}

fn build_models(input: &Path) -> Result<(BuildContext, Vec<(String, EntityId)>), String> {
    let source = DirectorySource::new(input).map_err(handle_diagnostic)?;
    let mut ctx = BuildContext::new().map_err(handle_diagnostic)?;
    let mut scheduler = Scheduler::new(&source);
    scheduler.run(&mut ctx).map_err(handle_diagnostic)?;
    let libraries = scheduler.libraries().to_vec();
    Ok((ctx, libraries))
}

/// Prints the diagnostic to stderr and reduces it to the error result.
fn handle_diagnostic(diagnostic: Diagnostic) -> String {
    eprintln!("error[{}]: {}", diagnostic.code, diagnostic.description());
    eprintln!("  --> {}", format_label(&diagnostic.primary));
    for label in &diagnostic.secondary {
        eprintln!("      {}", format_label(label));
    }
    format!("error {}", diagnostic.code)
}

fn format_label(label: &plcgen_dsl::diagnostic::Label) -> String {
    match &label.path {
        Some(path) => format!("{}: {}: {}", label.file_id, path, label.message),
        None => format!("{}: {}", label.file_id, label.message),
    }
}
