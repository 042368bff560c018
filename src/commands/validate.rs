use anyhow::Result;
use log::info;

use super::{CommandContext, read_form_data};
use crate::cli::commands::ValidateCommand;
use crate::metadata::ValidationResult;

/// Validate form data against a form
///
/// By default only what the user could see is validated, with conditional
/// requiredness applied. `all` runs every field through the record schema.
pub async fn validate_data(ctx: &CommandContext, form: &str, data: &str, all: bool) -> Result<ValidationResult> {
    let fields = ctx.load_form(form).await?;
    let form_data = read_form_data(data).await?;

    let result = if all {
        ctx.rules.validation().validate_form_data(&fields, &form_data)
    } else {
        ctx.rules.validate_submission(&fields, &form_data)
    };
    Ok(result)
}

pub async fn validate_command(ctx: &CommandContext, cmd: ValidateCommand) -> Result<()> {
    info!("Validating data for form: {} (all fields: {})", cmd.form, cmd.all);

    let result = validate_data(ctx, &cmd.form, &cmd.data, cmd.all).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.valid {
        anyhow::bail!("Form data is invalid ({} error(s))", result.errors.len());
    }

    Ok(())
}
