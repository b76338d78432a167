// CLI command definitions

use super::stack::{
    CreateCommand, DeleteCommand, DiffCommand, GlobalArgs, RecreateCommand, ResourcesCommand,
    StatusCommand, TailCommand, UpdateCommand, ValidateCommand,
};
use clap::Parser;

/// Exit status for any command line that fails to parse
pub const USAGE_EXIT_CODE: i32 = 1;

#[derive(Parser, Debug)]
#[command(
    name = "stackctl",
    version,
    about = "Convention-driven CloudFormation stack lifecycle tool",
    long_about = "Create, update, delete and tail CloudFormation stacks, resolving <stack> to <token>.json and <token>-params-<env>.json by naming convention"
)]
pub struct CliArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    /// Help and version requests exit 0; every other parse error is a usage error.
    pub fn exit_code(err: &clap::Error) -> i32 {
        if err.use_stderr() {
            USAGE_EXIT_CODE
        } else {
            0
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create a stack from its template (rollback disabled) and tail its events
    Create(CreateCommand),

    /// Update a stack from its template and tail its events
    Update(UpdateCommand),

    /// Delete one or more stacks and tail their events
    Delete(DeleteCommand),

    /// Delete a stack and create it again from its deployed template
    Recreate(RecreateCommand),

    /// Follow the events of an operation already in progress
    Tail(TailCommand),

    /// Compare local template and parameters with the deployed stack
    Diff(DiffCommand),

    /// Check a template locally and with CloudFormation
    Validate(ValidateCommand),

    /// Show stack status, parameters, tags and outputs
    Status(StatusCommand),

    /// List the resources managed by a stack
    Resources(ResourcesCommand),
}

impl Commands {
    pub async fn execute(&self, global: &GlobalArgs) -> anyhow::Result<()> {
        match self {
            Commands::Create(cmd) => cmd.execute(global).await,
            Commands::Update(cmd) => cmd.execute(global).await,
            Commands::Delete(cmd) => cmd.execute(global).await,
            Commands::Recreate(cmd) => cmd.execute(global).await,
            Commands::Tail(cmd) => cmd.execute(global).await,
            Commands::Diff(cmd) => cmd.execute(global).await,
            Commands::Validate(cmd) => cmd.execute(global).await,
            Commands::Status(cmd) => cmd.execute(global).await,
            Commands::Resources(cmd) => cmd.execute(global).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_create_with_modifiers() {
        let args = CliArgs::try_parse_from([
            "stackctl",
            "create",
            "web-prod",
            "--capabilities=CAPABILITY_IAM=ignored",
            "--role-arn=arn:one",
            "--role-arn=arn:two",
        ])
        .unwrap();
        match args.command {
            Commands::Create(cmd) => {
                assert_eq!(cmd.stack.stack, "web-prod");
                assert_eq!(cmd.modifiers.capabilities.as_deref(), Some("CAPABILITY_IAM"));
                assert_eq!(cmd.modifiers.role_arn.as_deref(), Some("arn:two"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_delete_many() {
        let args =
            CliArgs::try_parse_from(["stackctl", "--region", "eu-west-1", "delete", "a", "b"])
                .unwrap();
        assert_eq!(args.global.region.as_deref(), Some("eu-west-1"));
        match args.command {
            Commands::Delete(cmd) => assert_eq!(cmd.stacks, vec!["a", "b"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_delete_requires_a_stack() {
        let err = CliArgs::try_parse_from(["stackctl", "delete"]).unwrap_err();
        assert_eq!(CliArgs::exit_code(&err), 1);
    }

    #[test]
    fn test_modifier_in_place_of_stack_exits_one() {
        let err = CliArgs::try_parse_from(["stackctl", "create", "--capabilities=X"]).unwrap_err();
        assert_eq!(CliArgs::exit_code(&err), 1);

        let err = CliArgs::try_parse_from(["stackctl", "recreate", "--role-arn=x"]).unwrap_err();
        assert_eq!(CliArgs::exit_code(&err), 1);
    }

    #[test]
    fn test_help_and_version_exit_zero() {
        let err = CliArgs::try_parse_from(["stackctl", "--help"]).unwrap_err();
        assert_eq!(CliArgs::exit_code(&err), 0);
        let err = CliArgs::try_parse_from(["stackctl", "--version"]).unwrap_err();
        assert_eq!(CliArgs::exit_code(&err), 0);
    }

    #[test]
    fn test_modifier_as_sole_stack_reaches_usage_check() {
        let args = CliArgs::try_parse_from(["stackctl", "delete", "--role-arn=x"]).unwrap();
        match args.command {
            Commands::Delete(cmd) => {
                let err = cmd.stack_names().unwrap_err();
                assert!(err.to_string().contains("no stack argument provided"));
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let args = CliArgs::try_parse_from(["stackctl", "tail", "--capabilities=X"]).unwrap();
        match args.command {
            Commands::Tail(cmd) => assert_eq!(cmd.stack, "--capabilities=X"),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
