//! Table rendering for CLI output

use super::{ColorTheme, StatusIcon};
use crate::domain::stack::{Stack, StackResource};
use crate::infrastructure::cloudformation::TemplateSummary;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    fn table(header: Vec<&str>) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(
                header
                    .into_iter()
                    .map(|h| Cell::new(h).set_alignment(CellAlignment::Left))
                    .collect::<Vec<_>>(),
            );
        table
    }

    /// Render status, parameters, tags and outputs of a stack
    pub fn render_stack_status(&self, stack: &Stack) -> String {
        let mut output = String::new();

        let status_color = self.theme.get_status_color(&stack.stack_status);
        let mut summary = Self::table(vec!["STACK", "STATUS", "CREATED"]);
        summary.add_row(vec![
            Cell::new(&stack.stack_name),
            Cell::new(format!(
                "{} {}",
                StatusIcon::get_status_icon(&stack.stack_status),
                stack.stack_status
            ))
            .fg(status_color),
            Cell::new(
                stack
                    .creation_time
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
        output.push_str(&summary.to_string());
        output.push('\n');

        if let Some(ref reason) = stack.stack_status_reason {
            output.push_str(&format!("Reason: {}\n", reason.bright_black()));
        }

        if !stack.parameters.is_empty() {
            let mut params = Self::table(vec!["PARAMETER", "VALUE"]);
            for p in stack.parameters.canonical().iter() {
                params.add_row(vec![Cell::new(&p.key), Cell::new(&p.value)]);
            }
            output.push_str(&section("Parameters", stack.parameters.0.len()));
            output.push_str(&params.to_string());
            output.push('\n');
        }

        if !stack.tags.is_empty() {
            let mut tags = Self::table(vec!["TAG", "VALUE"]);
            for t in &stack.tags {
                tags.add_row(vec![Cell::new(&t.key), Cell::new(&t.value)]);
            }
            output.push_str(&section("Tags", stack.tags.len()));
            output.push_str(&tags.to_string());
            output.push('\n');
        }

        if !stack.outputs.is_empty() {
            let mut outputs = Self::table(vec!["OUTPUT", "VALUE", "EXPORT"]);
            for o in &stack.outputs {
                outputs.add_row(vec![
                    Cell::new(&o.key),
                    Cell::new(&o.value),
                    Cell::new(o.export_name.as_deref().unwrap_or("")),
                ]);
            }
            output.push_str(&section("Outputs", stack.outputs.len()));
            output.push_str(&outputs.to_string());
            output.push('\n');
        }

        output
    }

    /// Render physical ids and types of a stack's resources
    pub fn render_resources(&self, stack_name: &str, resources: &[StackResource]) -> String {
        if resources.is_empty() {
            return format!("No resources found for stack {}", stack_name);
        }

        let mut table = Self::table(vec!["LOGICAL ID", "PHYSICAL ID", "TYPE", "STATUS"]);
        for r in resources {
            table.add_row(vec![
                Cell::new(&r.logical_resource_id),
                Cell::new(r.physical_resource_id.as_deref().unwrap_or("-")),
                Cell::new(&r.resource_type),
                Cell::new(&r.resource_status).fg(self.theme.get_status_color(&r.resource_status)),
            ]);
        }

        let mut output = section(stack_name, resources.len());
        output.push_str(&table.to_string());
        output
    }

    /// Render the result of a template validation
    pub fn render_template_summary(&self, summary: &TemplateSummary) -> String {
        let mut output = String::new();
        if let Some(ref description) = summary.description {
            output.push_str(&format!("Description: {}\n", description));
        }
        if !summary.capabilities.is_empty() {
            output.push_str(&format!(
                "{} Requires capabilities: {}\n",
                StatusIcon::WARNING.yellow(),
                summary.capabilities.join(", ")
            ));
        }
        if !summary.parameters.is_empty() {
            let mut table = Self::table(vec!["PARAMETER", "DEFAULT", "DESCRIPTION"]);
            for p in &summary.parameters {
                table.add_row(vec![
                    Cell::new(&p.parameter_key),
                    Cell::new(p.default_value.as_deref().unwrap_or("")),
                    Cell::new(p.description.as_deref().unwrap_or("")),
                ]);
            }
            output.push_str(&table.to_string());
            output.push('\n');
        }
        output
    }
}

fn section(title: &str, count: usize) -> String {
    format!(
        "╭─ {} {} ─╮\n",
        title,
        format!("[{}]", count).bright_black()
    )
}
