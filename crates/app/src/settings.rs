use clap::Parser;
use forms::{Currency, FormKind, Sanitizer, SchemaContext, TrimPolicy};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/formcheck.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub level: String,
    pub currency: Currency,
    /// Allowed transaction categories; empty accepts any.
    pub categories: Vec<String>,
    pub password_min_length: usize,
    pub sanitize_on_change: bool,
    pub trim_policy: TrimPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            currency: Currency::default(),
            categories: Vec::new(),
            password_min_length: forms::fields::DEFAULT_PASSWORD_MIN_LENGTH,
            sanitize_on_change: true,
            trim_policy: TrimPolicy::default(),
        }
    }
}

impl Settings {
    pub fn schema_context(&self) -> SchemaContext {
        SchemaContext::new(self.categories.clone(), self.currency)
            .password_min_length(self.password_min_length)
    }

    pub fn sanitizer(&self) -> Sanitizer {
        Sanitizer::new(self.trim_policy)
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "formcheck",
    about = "Validate and sanitize a JSON form record",
    disable_version_flag = true
)]
pub struct Args {
    /// Form the record belongs to (login, register, transaction, ...).
    #[arg(long)]
    pub form: FormKind,
    /// JSON object to check; `-` reads standard input.
    #[arg(long, default_value = "-")]
    pub input: String,
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override log level.
    #[arg(long)]
    level: Option<String>,
}

pub fn load() -> Result<(Args, Settings)> {
    let args = Args::parse();
    let settings = resolve(&args)?;
    Ok((args, settings))
}

fn resolve(args: &Args) -> Result<Settings> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(
        config::Environment::with_prefix("FORMCHECK")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("categories"),
    );
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(level) = &args.level {
        settings.level = level.clone();
    }

    Ok(settings)
}
