use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_daxmodel::{
    get_model, ConnectionInfo, ExtractOptions, ExtractorInfo, FolderConnector, StatisticsProviders,
};

#[derive(Parser)]
#[command(name = "rust-daxmodel")]
#[command(author, version, about = "Extract metadata from tabular semantic models")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the metadata of one database as JSON
    Extract {
        /// Server address (a folder of .bim files)
        #[arg(short, long, requires = "database", conflicts_with = "connection_string")]
        server: Option<String>,

        /// Database name on the server
        #[arg(short, long, requires = "server")]
        database: Option<String>,

        /// Connection string naming the database in Initial Catalog
        #[arg(short, long)]
        connection_string: Option<String>,

        /// Name of the calling application
        #[arg(long, requires = "app_version")]
        app_name: Option<String>,

        /// Version of the calling application
        #[arg(long, requires = "app_name")]
        app_version: Option<String>,

        /// Do not query the data for statistics
        #[arg(long)]
        no_data_statistics: bool,

        /// Rows sampled per column (0 disables sampling)
        #[arg(long, default_value_t = 0)]
        sample_rows: usize,

        /// Also analyze DirectQuery tables
        #[arg(long)]
        analyze_direct_query: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::from_default_env().add_directive(format!("rust_daxmodel={level}").parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            server,
            database,
            connection_string,
            app_name,
            app_version,
            no_data_statistics,
            sample_rows,
            analyze_direct_query,
            output,
            verbose,
        } => {
            init_tracing(verbose)?;

            let connection = match (server, database, connection_string) {
                (Some(server), Some(database), None) => ConnectionInfo::Server { server, database },
                (None, None, Some(connection_string)) => {
                    ConnectionInfo::ConnectionString(connection_string)
                }
                _ => bail!("specify either --server with --database, or --connection-string"),
            };

            let application = match (app_name, app_version) {
                (Some(name), Some(version)) => Some(ExtractorInfo::new(name, version)),
                _ => None,
            };

            let options = ExtractOptions {
                read_statistics_from_data: !no_data_statistics,
                sample_rows,
                analyze_direct_query,
            };

            let model = get_model(
                &FolderConnector,
                &connection,
                application.as_ref(),
                &options,
                &StatisticsProviders::none(),
            )?;

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    let mut writer = BufWriter::new(file);
                    serde_json::to_writer_pretty(&mut writer, &model)?;
                    writer.flush()?;
                }
                None => {
                    let mut writer = io::stdout().lock();
                    serde_json::to_writer_pretty(&mut writer, &model)?;
                    writeln!(writer)?;
                }
            }
        }
    }

    Ok(())
}
