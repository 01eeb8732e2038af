//! Schema pull: refresh the local schema from the live database by running
//! the configured introspection tool.

use crate::config::SchemaConfig;
use crate::exec;
use anyhow::{bail, Context, Result};

/// Run the schema-pull tool. Prefers a non-interactive flag when config
/// says the tool supports one; otherwise pipes the configured confirmation
/// keystrokes to stdin. The stdin path is a workaround for tools that only
/// offer interactive prompts, kept as a fallback on purpose.
pub async fn pull_schema(cfg: &SchemaConfig) -> Result<String> {
    let (tool, args) = split_command(&cfg.command)?;

    let output = match &cfg.non_interactive_flag {
        Some(flag) => {
            let mut args = args.to_vec();
            args.push(flag.clone());
            exec::run(tool, &args)
                .await
                .context("schema pull failed")?
        }
        None => {
            tracing::debug!("no non-interactive flag configured, feeding confirmations to stdin");
            exec::run_with_stdin(tool, args, cfg.confirm_input.as_bytes())
                .await
                .context("schema pull failed")?
        }
    };

    tracing::info!("schema pull completed via {tool}");
    Ok(output.stdout)
}

/// Split a configured command line into program and arguments.
fn split_command(command: &[String]) -> Result<(&str, &[String])> {
    match command.split_first() {
        Some((tool, args)) if !tool.is_empty() => Ok((tool, args)),
        _ => bail!("schema.command must name a program"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_command_separates_program_and_args() {
        let command = vec![
            "drizzle-kit".to_string(),
            "pull".to_string(),
            "--config".to_string(),
            "drizzle.config.ts".to_string(),
        ];
        let (tool, args) = split_command(&command).unwrap();
        assert_eq!(tool, "drizzle-kit");
        assert_eq!(args, ["pull", "--config", "drizzle.config.ts"]);
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(split_command(&[]).is_err());
        assert!(split_command(&[String::new()]).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fallback_feeds_confirmation_to_stdin() {
        let cfg = SchemaConfig {
            command: vec!["sh".to_string(), "-c".to_string(), "read x && echo got-$x".to_string()],
            non_interactive_flag: None,
            confirm_input: "y\n".to_string(),
        };
        let stdout = pull_schema(&cfg).await.unwrap();
        assert_eq!(stdout.trim(), "got-y");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn flag_path_appends_the_flag() {
        // `sh -c 'echo "$0"' --yes` prints the first positional after -c's script.
        let cfg = SchemaConfig {
            command: vec!["sh".to_string(), "-c".to_string(), "echo flag=$0".to_string()],
            non_interactive_flag: Some("--yes".to_string()),
            confirm_input: String::new(),
        };
        let stdout = pull_schema(&cfg).await.unwrap();
        assert_eq!(stdout.trim(), "flag=--yes");
    }
}
