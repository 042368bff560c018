use anyhow::Result;
use log::info;

use super::{CommandContext, read_form_data};
use crate::cli::commands::StateCommand;
use crate::metadata::FormEvaluation;

/// Field states, visible fields and calculated values for a form
pub async fn evaluate_state(ctx: &CommandContext, form: &str, data: &str) -> Result<FormEvaluation> {
    let fields = ctx.load_form(form).await?;
    let form_data = read_form_data(data).await?;
    Ok(ctx.rules.evaluate(&fields, &form_data))
}

pub async fn state_command(ctx: &CommandContext, cmd: StateCommand) -> Result<()> {
    info!("Evaluating state for form: {}", cmd.form);

    let evaluation = evaluate_state(ctx, &cmd.form, &cmd.data).await?;
    println!("{}", serde_json::to_string_pretty(&evaluation)?);

    Ok(())
}
