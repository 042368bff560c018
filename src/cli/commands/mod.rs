use clap::Args;

#[derive(Args)]
pub struct StateCommand {
    /// Form id
    #[arg(short, long)]
    pub form: String,
    /// Form data as inline JSON or a path to a JSON file
    #[arg(short, long, default_value = "{}")]
    pub data: String,
}

#[derive(Args)]
pub struct CalcCommand {
    /// Formula text, e.g. "price * quantity"
    pub formula: String,
    /// Form data as inline JSON or a path to a JSON file
    #[arg(short, long, default_value = "{}")]
    pub data: String,
}

#[derive(Args)]
pub struct ValidateCommand {
    /// Form id
    #[arg(short, long)]
    pub form: String,
    /// Form data as inline JSON or a path to a JSON file
    #[arg(short, long, default_value = "{}")]
    pub data: String,
    /// Validate every field, ignoring visibility and conditional requiredness
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CheckCommand {
    /// Form id
    #[arg(short, long)]
    pub form: String,
}
