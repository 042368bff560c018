use anyhow::Result;
use colored::Colorize;
use log::info;

use super::CommandContext;
use crate::cli::commands::CheckCommand;
use crate::metadata::{LintSeverity, has_errors, lint_fields};

pub async fn check_command(ctx: &CommandContext, cmd: CheckCommand) -> Result<()> {
    info!("Checking metadata for form: {}", cmd.form);

    let fields = ctx.load_form(&cmd.form).await?;
    let findings = lint_fields(&fields, &ctx.config.engine);

    if findings.is_empty() {
        println!("{} {} ({} fields)", "✓".green(), cmd.form.bold(), fields.len());
        return Ok(());
    }

    for finding in &findings {
        let severity = match finding.severity {
            LintSeverity::Error => "error".red().bold(),
            LintSeverity::Warning => "warning".yellow().bold(),
        };
        println!("{}: {}: {}", severity, finding.field.cyan(), finding.message);
    }

    if has_errors(&findings) {
        anyhow::bail!("Metadata for form '{}' has errors", cmd.form);
    }

    Ok(())
}
