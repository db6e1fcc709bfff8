use std::fs;

use anyhow::{Context, Result};
use comfy_table::Table;
use primgen_model::TypeRegistry;
use primgen_resolve::ResolutionReport;
use tracing::info;

use primgen_cli::pipeline::{self, PipelineOptions};

use crate::cli::{InputArgs, ResolveArgs, TemplateArgs};
use crate::summary::apply_table_style;

pub fn run_types() -> Result<()> {
    let registry = TypeRegistry::with_primitives();
    let mut table = Table::new();
    table.set_header(vec!["#", "Type"]);
    apply_table_style(&mut table);
    for (position, ty) in registry.iter().enumerate() {
        table.add_row(vec![position.to_string(), ty.path().to_string()]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_resolve(args: &ResolveArgs) -> Result<ResolutionReport> {
    pipeline::resolve(&options(&args.input))
}

pub fn run_check(args: &InputArgs) -> Result<Vec<String>> {
    pipeline::check(&options(args))
}

pub fn run_template(args: &TemplateArgs) -> Result<()> {
    let tree = pipeline::template(&options(&args.input))?;
    let text = serde_json::to_string_pretty(&tree).context("serialize template")?;
    match &args.output {
        Some(path) => {
            fs::write(path, format!("{text}\n"))
                .with_context(|| format!("write template {}", path.display()))?;
            info!(path = %path.display(), "wrote settings template");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn options(args: &InputArgs) -> PipelineOptions {
    let mut options = PipelineOptions::new(&args.graph)
        .with_types(args.types.iter().cloned())
        .with_fallback(args.fallback.into());
    if let Some(settings) = &args.settings {
        options = options.with_settings(settings);
    }
    options
}
