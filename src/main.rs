use clap::Parser;
use megaoptim::utils::logger;
use megaoptim::{CliArgs, MegaOptim, MegaOptimError, ServiceResponse};
use std::process::ExitCode;

fn report(response: &ServiceResponse) -> ExitCode {
    match response {
        ServiceResponse::Ok { result } => {
            for (key, image) in result {
                println!("✅ [{}] Total saved: {}%", key, image.saved_percent);
                println!("📁 [{}] Download url: {}", key, image.url);
            }
            ExitCode::SUCCESS
        }
        ServiceResponse::Processing { process_id } => {
            // 設定了 callback_url 或等待逾時，結果需由回呼端點或再次查詢取得
            println!("⏳ Still processing (process id: {})", process_id);
            ExitCode::SUCCESS
        }
        ServiceResponse::Error { errors } => {
            for error in errors {
                eprintln!("❌ {}", error);
            }
            ExitCode::from(1)
        }
        ServiceResponse::Other { status, body } => {
            eprintln!("❌ Unexpected status '{}': {}", status, body);
            ExitCode::from(1)
        }
    }
}

async fn run(args: CliArgs) -> Result<ServiceResponse, MegaOptimError> {
    args.validate_timeout()?;
    let config = args.client_config()?;
    tracing::debug!("Client config: {:?}", config);

    let options = args.options()?;
    let client = MegaOptim::new(config)?;
    client.optimize(args.resource(), &options, args.timeout).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbosity());
    tracing::info!("Starting megaoptim CLI");

    match run(args).await {
        Ok(response) => report(&response),
        Err(e) => {
            tracing::error!("❌ {}", e);
            eprintln!("❌ {}", e);
            ExitCode::from(2)
        }
    }
}
