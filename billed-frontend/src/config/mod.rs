use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub logging: LoggingSettings,
    #[serde(default)]
    pub new_bill: NewBillSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LoggingSettings {
    /// Fallback filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines with file/line metadata instead of the compact format.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct NewBillSettings {
    /// Receipt extensions accepted by the file input, lower-case, without the dot.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Percentage used when the pct field is empty, zero or not a number.
    #[serde(default = "default_pct")]
    pub default_pct: i64,
    /// Alert shown when a receipt with a disallowed extension is selected.
    #[serde(default = "default_invalid_file_message")]
    pub invalid_file_message: String,
}

fn default_allowed_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
}

fn default_pct() -> i64 {
    20
}

fn default_invalid_file_message() -> String {
    "Seuls les formats jpg, jpeg et png sont pris en compte.".to_string()
}

impl Default for NewBillSettings {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            default_pct: default_pct(),
            invalid_file_message: default_invalid_file_message(),
        }
    }
}

impl NewBillSettings {
    /// Case-insensitive check on the text after the last `.` of `file_name`.
    ///
    /// A name without a dot is checked as a whole.
    pub fn accepts(&self, file_name: &str) -> bool {
        let extension = file_name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;

    // Check if we're already in billed-frontend directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("billed-frontend") {
        base_path.join("config")
    } else {
        base_path.join("billed-frontend").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
