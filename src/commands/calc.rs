use anyhow::{Context, Result};
use log::info;

use super::{CommandContext, read_form_data};
use crate::cli::commands::CalcCommand;

/// Evaluate a formula and print its JSON value
///
/// Unlike the engine, which maps failures to an absent value, the CLI reports
/// why a formula could not be evaluated.
pub async fn calc_command(ctx: &CommandContext, cmd: CalcCommand) -> Result<()> {
    info!("Evaluating formula: {}", cmd.formula);

    let form_data = read_form_data(&cmd.data).await?;
    let value = ctx
        .rules
        .logic()
        .formula_evaluator()
        .try_evaluate(&cmd.formula, &form_data)
        .with_context(|| format!("Failed to evaluate formula: {}", cmd.formula))?;

    println!("{}", value);
    Ok(())
}
