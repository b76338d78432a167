//! Stack lifecycle commands

use crate::cli::display::{render_diff, EventPrinter, StatusIcon, TableRenderer};
use crate::domain::config::StackctlConf;
use crate::domain::stack::modifiers::{parse_modifier_value, Modifiers};
use crate::domain::stack::naming::{stack_name_from_arg, NamingResolver, ResolvedStack};
use crate::domain::stack::{DiffReport, StackOrchestrator, StackStatus, TailTarget, UpdateOutcome};
use crate::shared::error::StackError;
use clap::{Args, Parser};
use colored::Colorize;
use std::future::Future;

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Path to a stackctl TOML configuration file
    /// If not specified, uses STACKCTL_CONF_FILE or built-in defaults
    #[arg(long, global = true)]
    pub config_file: Option<String>,

    /// AWS region (overrides the configuration file)
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// AWS CLI profile (overrides the configuration file)
    #[arg(long, global = true)]
    pub profile: Option<String>,
}

impl GlobalArgs {
    fn orchestrator(&self) -> anyhow::Result<StackOrchestrator> {
        let conf = StackctlConf::load(self.config_file.as_deref())?
            .with_overrides(self.region.clone(), self.profile.clone());
        Ok(StackOrchestrator::new(&conf))
    }
}

/// Stack reference plus optional explicit template and parameters files
#[derive(Args, Debug, Clone)]
pub struct StackArgs {
    /// Stack name, or a template path whose basename names the stack
    pub stack: String,

    /// Template file (default: <stack>.json, then <stack without its -env suffix>.json)
    pub template: Option<String>,

    /// Parameters file (default: <token>-params-<env>.json next to the template, if present)
    pub params: Option<String>,
}

impl StackArgs {
    /// Resolve template and parameters files by convention.
    pub fn resolve(&self, usage: &str) -> anyhow::Result<ResolvedStack> {
        let resolved = NamingResolver::new()
            .resolve(
                &self.stack,
                self.template.as_deref(),
                self.params.as_deref(),
            )
            .map_err(|e| match e {
                StackError::Usage(_) => usage_error(usage),
                other => other,
            })?;
        Ok(resolved)
    }
}

/// `--capabilities=` / `--role-arn=` options
#[derive(Args, Debug, Clone, Default)]
pub struct ModifierArgs {
    /// Capabilities to acknowledge, comma separated (e.g. CAPABILITY_IAM)
    #[arg(long, value_parser = parse_modifier_value)]
    pub capabilities: Option<String>,

    /// IAM role CloudFormation assumes for the operation
    #[arg(long, value_parser = parse_modifier_value)]
    pub role_arn: Option<String>,
}

impl From<&ModifierArgs> for Modifiers {
    fn from(args: &ModifierArgs) -> Self {
        Modifiers::new(args.capabilities.clone(), args.role_arn.clone())
    }
}

#[derive(Parser, Debug, Clone)]
#[command(args_override_self = true)]
pub struct CreateCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    #[command(flatten)]
    pub modifiers: ModifierArgs,
}

#[derive(Parser, Debug, Clone)]
#[command(args_override_self = true)]
pub struct UpdateCommand {
    #[command(flatten)]
    pub stack: StackArgs,

    /// Capabilities to acknowledge; defaults to those of the deployed stack
    #[arg(long, value_parser = parse_modifier_value)]
    pub capabilities: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// Stacks to delete, one after another
    #[arg(required = true, allow_hyphen_values = true)]
    pub stacks: Vec<String>,
}

#[derive(Parser, Debug, Clone)]
#[command(args_override_self = true)]
pub struct RecreateCommand {
    /// Stack to delete and create again from its deployed template
    pub stack: String,

    #[command(flatten)]
    pub modifiers: ModifierArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct TailCommand {
    /// Stack whose running operation to follow
    #[arg(allow_hyphen_values = true)]
    pub stack: String,
}

#[derive(Parser, Debug, Clone)]
pub struct DiffCommand {
    #[command(flatten)]
    pub stack: StackArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub stack: StackArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusCommand {
    /// Stack to describe
    #[arg(allow_hyphen_values = true)]
    pub stack: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ResourcesCommand {
    /// Stack whose resources to list
    #[arg(allow_hyphen_values = true)]
    pub stack: String,
}

impl CreateCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let stack = self.stack.resolve(
            "stackctl create <stack> [template] [params] [--capabilities=..] [--role-arn=..]",
        )?;
        let modifiers = Modifiers::from(&self.modifiers);
        let orchestrator = global.orchestrator()?;

        let mut printer = EventPrinter::new();
        let status =
            until_interrupted(orchestrator.create(&stack, &modifiers, &mut printer)).await?;
        finish(&stack.name, &status)
    }
}

impl UpdateCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let stack = self
            .stack
            .resolve("stackctl update <stack> [template] [params] [--capabilities=..]")?;
        let modifiers = Modifiers::new(self.capabilities.clone(), None);
        let orchestrator = global.orchestrator()?;

        let mut printer = EventPrinter::new();
        match until_interrupted(orchestrator.update(&stack, &modifiers, &mut printer)).await? {
            UpdateOutcome::Finished(status) => finish(&stack.name, &status),
            UpdateOutcome::NoChanges => {
                println!(
                    "{} Stack {} is already up to date, nothing to do",
                    StatusIcon::SUCCESS.green(),
                    stack.name
                );
                Ok(())
            }
        }
    }
}

impl DeleteCommand {
    /// Stack names with any modifier tokens dropped; delete takes none.
    pub fn stack_names(&self) -> anyhow::Result<Vec<String>> {
        let (_, tokens) = Modifiers::split_tokens(&self.stacks);
        if tokens.is_empty() {
            return Err(usage_error("stackctl delete <stack>...").into());
        }
        tokens
            .iter()
            .map(|token| stack_name_from_arg(token).map_err(anyhow::Error::from))
            .collect()
    }

    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let names = self.stack_names()?;
        let orchestrator = global.orchestrator()?;

        for name in &names {
            let mut printer = EventPrinter::new();
            let status = until_interrupted(orchestrator.delete(name, &mut printer)).await?;
            finish(name, &status)?;
        }
        Ok(())
    }
}

impl RecreateCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let name = stack_name_from_arg(&self.stack)
            .map_err(|_| usage_error("stackctl recreate <stack> [--role-arn=..]"))?;
        let modifiers = Modifiers::from(&self.modifiers);
        let orchestrator = global.orchestrator()?;

        let mut printer = EventPrinter::new();
        let status =
            until_interrupted(orchestrator.recreate(&name, &modifiers, &mut printer)).await?;
        finish(&name, &status)
    }
}

impl TailCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let name = single_stack(&self.stack, "stackctl tail <stack>")?;
        let orchestrator = global.orchestrator()?;

        let mut printer = EventPrinter::new();
        let status =
            until_interrupted(orchestrator.tail(&TailTarget::by_name(&name), &mut printer)).await?;
        finish(&name, &status)
    }
}

impl DiffCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let stack = self
            .stack
            .resolve("stackctl diff <stack> [template] [params]")?;
        let orchestrator = global.orchestrator()?;

        let diff = orchestrator.diff(&stack).await?;
        print_report("Template", &diff.template);
        print_report("Parameters", &diff.parameters);
        Ok(())
    }
}

impl ValidateCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let stack = self
            .stack
            .resolve("stackctl validate <stack> [template]")?;
        let orchestrator = global.orchestrator()?;

        let summary = orchestrator.validate(&stack).await?;
        println!(
            "{} Template for {} is valid",
            StatusIcon::SUCCESS.green(),
            stack.name
        );
        print!("{}", TableRenderer::new().render_template_summary(&summary));
        Ok(())
    }
}

impl StatusCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let name = single_stack(&self.stack, "stackctl status <stack>")?;
        let orchestrator = global.orchestrator()?;

        let stack = orchestrator.describe(&name).await?;
        print!("{}", TableRenderer::new().render_stack_status(&stack));
        Ok(())
    }
}

impl ResourcesCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        let name = single_stack(&self.stack, "stackctl resources <stack>")?;
        let orchestrator = global.orchestrator()?;

        let resources = orchestrator.resources(&name).await?;
        println!("{}", TableRenderer::new().render_resources(&name, &resources));
        Ok(())
    }
}

fn usage_error(usage: &str) -> StackError {
    StackError::usage(format!("no stack argument provided\n\n  Usage: {}", usage))
}

/// A lone stack argument; a modifier token in its place means no stack.
fn single_stack(arg: &str, usage: &str) -> anyhow::Result<String> {
    let (_, tokens) = Modifiers::split_tokens([arg]);
    let token = tokens.first().ok_or_else(|| usage_error(usage))?;
    Ok(stack_name_from_arg(token).map_err(|_| usage_error(usage))?)
}

/// Run `operation`, stopping cleanly on Ctrl-C. Dropping the future drops
/// any scratch directory it owns.
async fn until_interrupted<T>(
    operation: impl Future<Output = Result<T, StackError>>,
) -> Result<T, StackError> {
    tokio::select! {
        result = operation => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n{} Interrupted, stopped polling", StatusIcon::WARNING.yellow());
            Err(StackError::Interrupted)
        }
    }
}

/// Print the final status; failures and rollbacks exit nonzero.
fn finish(stack: &str, status: &StackStatus) -> anyhow::Result<()> {
    if status.is_failure() {
        return Err(StackError::OperationFailed {
            name: stack.to_string(),
            status: status.to_string(),
        }
        .into());
    }
    println!(
        "{} Stack {} finished: {}",
        StatusIcon::SUCCESS.green(),
        stack,
        status.to_string().green()
    );
    Ok(())
}

fn print_report(title: &str, report: &DiffReport) {
    match report {
        DiffReport::Identical => println!(
            "{} {}: no difference between deployed and local",
            StatusIcon::SUCCESS.green(),
            title
        ),
        DiffReport::Changed(diff) => {
            println!("{} {} differs:", StatusIcon::WARNING.yellow(), title);
            println!("{}", render_diff(diff));
        }
        DiffReport::Skipped(reason) => {
            println!("{} {}: {}", StatusIcon::UNKNOWN.bright_black(), title, reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_args(stack: &str, template: Option<&str>) -> StackArgs {
        StackArgs {
            stack: stack.to_string(),
            template: template.map(str::to_string),
            params: None,
        }
    }

    #[test]
    fn test_resolve_rejects_modifier_as_stack() {
        let args = stack_args("--role-arn=arn:aws:iam::1:role/x", None);
        let err = args.resolve("stackctl create <stack>").unwrap_err();
        assert!(err.to_string().contains("no stack argument provided"));
    }

    #[test]
    fn test_resolve_ignores_modifier_as_template() {
        let args = stack_args("web-prod", Some("--capabilities=CAPABILITY_NAMED_IAM"));
        let stack = args.resolve("stackctl create <stack>").unwrap();
        assert_eq!(stack.name, "web-prod");
        assert!(stack.template.is_none());
    }

    #[test]
    fn test_delete_drops_modifier_tokens() {
        let cmd = DeleteCommand {
            stacks: vec!["web-prod".to_string(), "--role-arn=arn:x".to_string()],
        };
        assert_eq!(cmd.stack_names().unwrap(), vec!["web-prod"]);

        let cmd = DeleteCommand {
            stacks: vec!["--role-arn=arn:x".to_string()],
        };
        let err = cmd.stack_names().unwrap_err();
        assert!(err.to_string().contains("no stack argument provided"));
    }

    #[test]
    fn test_single_stack_rejects_modifier() {
        assert_eq!(single_stack("web-prod", "stackctl tail <stack>").unwrap(), "web-prod");
        let err = single_stack("--capabilities=X", "stackctl tail <stack>").unwrap_err();
        assert!(err.to_string().contains("no stack argument provided"));
    }

    #[test]
    fn test_finish_maps_failure_status_to_error() {
        assert!(finish("web", &StackStatus::CreateComplete).is_ok());
        assert!(finish("web", &StackStatus::RollbackComplete).is_err());
    }
}
