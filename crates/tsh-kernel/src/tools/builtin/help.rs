//! help — List builtins.

use async_trait::async_trait;

use crate::tools::{ExecContext, ParamSchema, Tool, ToolArgs, ToolSchema};
use tsh_types::ExecResult;

/// Help tool: show builtin usage from the registered schemas.
pub struct Help;

#[async_trait]
impl Tool for Help {
    fn name(&self) -> &str {
        "help"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("help", "List builtins, or describe one")
            .param(ParamSchema::optional("name", "Builtin to describe"))
    }

    async fn execute(&self, args: ToolArgs, ctx: &mut ExecContext) -> ExecResult {
        match args.get_positional(0) {
            None => {
                let width = ctx
                    .tool_schemas
                    .iter()
                    .map(|s| s.usage().len())
                    .max()
                    .unwrap_or(0);
                let mut result = ExecResult::success("");
                result.append_lines(
                    ctx.tool_schemas
                        .iter()
                        .map(|s| format!("{:<width$}  {}", s.usage(), s.description)),
                );
                result.append_lines(["NAME=VALUE  Set an environment variable".to_string()]);
                result
            }
            Some(name) => match ctx.tool_schemas.iter().find(|s| s.name == name) {
                Some(schema) => ExecResult::success(describe(schema)),
                None => ExecResult::failure(1, format!("help: {name}: no such builtin")),
            },
        }
    }
}

fn describe(schema: &ToolSchema) -> String {
    let mut out = format!("{}\n\nUsage: {}\n", schema.description, schema.usage());
    if !schema.params.is_empty() {
        out.push_str("\nArguments:\n");
        for param in &schema.params {
            out.push_str(&format!("  {:<8}  {}\n", param.name, param.description));
        }
    }
    if !schema.examples.is_empty() {
        out.push_str("\nExamples:\n");
        for example in &schema.examples {
            out.push_str(&format!("  {:<24}  # {}\n", example.code, example.description));
        }
    }
    out
}
