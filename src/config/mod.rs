pub mod parser;
pub mod settings;

pub use parser::{ConfigFormat, ConfigParser};
pub use settings::Settings;
