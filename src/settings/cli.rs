use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "amity", about = "User accounts and friend relationships")]
pub struct Cli {
    /// Path to a settings file (TOML)
    #[arg(long)]
    pub settings: Option<String>,
}
