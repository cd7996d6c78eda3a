use crate::config::toml_config::AppConfig;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "shop-qr")]
#[command(about = "Manage shops and products, and generate product verification QR codes")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "shop-qr.toml")]
    pub config: String,

    /// Override api.base_url from the config file
    #[arg(long)]
    pub api_url: Option<String>,

    /// Override output.directory from the config file
    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate a QR code PNG for any payload
    Generate(GenerateArgs),

    /// Shop records
    Shops {
        #[command(subcommand)]
        command: ShopCommand,
    },

    /// Product listings of one shop
    Products {
        #[command(subcommand)]
        command: ProductCommand,
    },
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Text to encode, usually a verification URL
    pub payload: String,

    /// Image URL or path drawn in the center of the code
    #[arg(long)]
    pub image: Option<String>,

    #[arg(long)]
    pub size: Option<u32>,

    /// Foreground colour, e.g. #000000
    #[arg(long)]
    pub dark: Option<String>,

    /// Background colour, e.g. #FFFFFF
    #[arg(long)]
    pub light: Option<String>,

    /// File name inside the output directory
    #[arg(short, long, default_value = "qr-code.png")]
    pub output: String,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ShopCommand {
    List,
    Delete { id: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ProductCommand {
    /// List products, generating QR codes for those still missing one
    List { shop_id: String },
    /// Regenerate and store the QR code of one product
    Qr { shop_id: String, product_id: String },
    /// Save every stored product QR code as PNG files
    Export { shop_id: String },
    Delete { id: String },
}

impl CliConfig {
    /// 命令列參數優先於設定檔
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(api_url) = &self.api_url {
            config.api.base_url = api_url.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output.directory = output_dir.clone();
        }
        if let Command::Generate(args) = &self.command {
            if let Some(size) = args.size {
                config.qr.size = size;
            }
            if let Some(dark) = &args.dark {
                config.qr.dark = dark.clone();
            }
            if let Some(light) = &args.light {
                config.qr.light = light.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_overrides_qr_settings() {
        let cli = CliConfig::parse_from([
            "shop-qr",
            "--api-url",
            "https://api.shop.example",
            "generate",
            "https://verify.example.com/abc123",
            "--size",
            "320",
            "--dark",
            "#222222",
        ]);
        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.api.base_url, "https://api.shop.example");
        assert_eq!(config.qr.size, 320);
        assert_eq!(config.qr.dark, "#222222");
        assert_eq!(config.qr.light, "#FFFFFF");
    }

    #[test]
    fn test_parse_product_commands() {
        let cli = CliConfig::parse_from(["shop-qr", "products", "qr", "s1", "p9"]);
        match cli.command {
            Command::Products {
                command: ProductCommand::Qr { shop_id, product_id },
            } => {
                assert_eq!(shop_id, "s1");
                assert_eq!(product_id, "p9");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
