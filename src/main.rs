use clap::Parser;
use shop_qr::config::cli::{Command, GenerateArgs, ProductCommand, ShopCommand};
use shop_qr::core::overlay::HttpImageSource;
use shop_qr::core::{ConfigProvider, Storage};
use shop_qr::utils::error::ErrorSeverity;
use shop_qr::utils::{logger, validation::Validate};
use shop_qr::{
    AdminError, ApiClient, AppConfig, CliConfig, LocalStorage, ProductCatalog, QrCompositor,
    Result, Session, ShopDirectory,
};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let mut config = match AppConfig::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    logger::init_cli_logger(
        cli.verbose,
        config.log_format(),
        config.logging.level.as_deref(),
    );

    tracing::info!("Starting shop-qr CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(command: Command, config: AppConfig) -> Result<()> {
    match command {
        Command::Generate(args) => generate(args, &config).await,
        Command::Shops { command } => {
            let client = signed_in_client(&config).await?;
            shops(command, ShopDirectory::new(client)).await
        }
        Command::Products { command } => {
            let client = signed_in_client(&config).await?;
            products(command, client, config).await
        }
    }
}

async fn generate(args: GenerateArgs, config: &AppConfig) -> Result<()> {
    // 命令列可以直接指定本機圖片
    let compositor =
        QrCompositor::with_source(HttpImageSource::new(config.timeout())?.with_local_files());
    let image = compositor
        .compose(&args.payload, args.image.as_deref(), &config.qr_options())
        .await?;

    let storage = LocalStorage::new(config.output_directory());
    storage.write_file(&args.output, image.as_png()).await?;

    let path = storage.base_path().join(&args.output);
    tracing::info!("✅ QR code generated ({}x{})", image.width(), image.height());
    println!("📁 Output saved to: {}", path.display());
    Ok(())
}

async fn signed_in_client(config: &AppConfig) -> Result<ApiClient> {
    let (email, password) = config
        .credentials()
        .ok_or_else(|| AdminError::MissingFieldError {
            field: "api.email / api.password".to_string(),
        })?;

    let client = ApiClient::new(&config.api.base_url, Session::new(), config.timeout())?;
    client.signin(email, password).await?;
    Ok(client)
}

async fn shops(command: ShopCommand, directory: ShopDirectory) -> Result<()> {
    match command {
        ShopCommand::List => {
            let shops = directory.list().await?;
            if shops.is_empty() {
                println!("No shops yet");
            }
            for shop in shops {
                println!("{}\t{}\t{}", shop.id, shop.name, shop.contact_email);
            }
        }
        ShopCommand::Delete { id } => {
            directory.delete(&id).await?;
            println!("✅ Deleted shop {}", id);
        }
    }
    Ok(())
}

async fn products(command: ProductCommand, client: ApiClient, config: AppConfig) -> Result<()> {
    let compositor = QrCompositor::new(config.timeout())?;
    let output_directory = config.output.directory.clone();
    let catalog = ProductCatalog::new(client.clone(), compositor, config);

    match command {
        ProductCommand::List { shop_id } => {
            let (shop, products) = catalog.load_shop(&shop_id).await?;
            println!("{} ({} products)", shop.name, products.len());
            for product in products {
                let qr = if product.qr_code.as_deref().is_some_and(|q| !q.is_empty()) {
                    "QR"
                } else {
                    "-"
                };
                println!("{}\t{}\t{}\t{}", product.id, product.name, product.price, qr);
            }
        }
        ProductCommand::Qr {
            shop_id,
            product_id,
        } => {
            let product = client
                .list_products(&shop_id)
                .await?
                .into_iter()
                .find(|product| product.id == product_id)
                .ok_or_else(|| AdminError::NotFound {
                    resource: "Product".to_string(),
                    id: product_id.clone(),
                })?;
            let product = catalog.regenerate_qr(product).await?;
            println!("✅ QR code stored for {}", product.name);
        }
        ProductCommand::Export { shop_id } => {
            let (_, products) = catalog.load_shop(&shop_id).await?;
            let storage = LocalStorage::new(output_directory);
            let mut exported = 0;
            for product in &products {
                if catalog.export_qr(product, &storage).await {
                    exported += 1;
                }
            }
            println!(
                "📁 Exported {} of {} QR codes to {}",
                exported,
                products.len(),
                storage.base_path().display()
            );
        }
        ProductCommand::Delete { id } => {
            catalog.delete_product(&id).await?;
            println!("✅ Deleted product {}", id);
        }
    }
    Ok(())
}
