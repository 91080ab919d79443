mod cli;

use alacforge::{config, server, state::JobRequest};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting alacforge server");
    tracing::info!("Input directory: {:?}", config.paths.input_dir);
    tracing::info!("Output directory: {:?}", config.paths.output_dir);

    let ffmpeg = config.tools.ffmpeg_program();
    if let Err(e) = alacforge_av::require_tool(&ffmpeg.to_string_lossy()) {
        tracing::warn!("{}; every conversion will fail until it is installed", e);
    }

    let ctx = server::AppContext::from_config(config)?;
    server::start_server(ctx).await
}

async fn convert(
    paths: Vec<String>,
    sample_rate: Option<u32>,
    config_path: Option<&std::path::Path>,
) -> Result<()> {
    let request = JobRequest { paths, sample_rate };
    request.validate()?;

    let config = config::load_config_or_default(config_path)?;
    let ctx = server::AppContext::from_config(config)?;

    let record = ctx
        .runner
        .run(request)
        .await
        .ok_or_else(|| anyhow::anyhow!("Job disappeared from the registry"))?;

    for line in &record.log {
        println!("{}", line);
    }
    println!();
    println!("Converted: {}", record.succeeded());
    println!("Failed: {}", record.errors.len());
    for file in &record.errors {
        println!("  {}", file);
    }

    if !record.errors.is_empty() {
        anyhow::bail!("{} of {} files failed", record.errors.len(), record.total);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "alacforge=trace,alacforge_av=debug,tower_http=debug".to_string()
        } else {
            "alacforge=info,alacforge_av=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Convert { paths, sample_rate } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert(paths, sample_rate, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("alacforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ffmpeg = config.tools.ffmpeg_program();

    println!("Checking external tools...\n");

    let tools = alacforge_av::check_tools(&ffmpeg.to_string_lossy());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);
        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }
        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }
        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("ffmpeg is missing. Install it (with ALAC support) to convert files.");
    }

    Ok(())
}

fn validate_config(path: Option<&std::path::Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, searching default locations");
            config::load_config_or_default(None)?
        }
    };

    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Input directory: {}", config.paths.input_dir.display());
    println!("  Output directory: {}", config.paths.output_dir.display());
    println!("  ffmpeg: {}", config.tools.ffmpeg_program().display());
    if let Some(ref dir) = config.server.static_dir {
        println!("  Static files: {}", dir.display());
    }

    Ok(())
}
