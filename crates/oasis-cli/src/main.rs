//! RD-OASIS CLI - Command line interface for browsing and running algorithms.

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use oasis_client::ApiClient;
use oasis_core::{
    AlgorithmId, AlgorithmRun, DatasetId, ImageId, LogSlice, NewAlgorithm, NewDataset, NewImage,
    PageRequest, RouteTable, TaskId,
};

mod config;
mod edit;
mod navigate;
mod render;

use config::Config;
use edit::{AlgorithmEdit, DatasetEdit, ImageEdit};
use navigate::Navigator;

/// RD-OASIS CLI - Algorithm service client
#[derive(Parser)]
#[command(name = "oasis")]
#[command(about = "CLI for the RD-OASIS algorithm service", long_about = None)]
struct Cli {
    /// Base URL of the REST API
    #[arg(short, long, env = "OASIS_API_URL", default_value = "http://localhost:8000/api")]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Page size for list commands
    #[arg(short, long, default_value = "25")]
    limit: u32,

    /// Print raw JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a page path (e.g. "/" or "/algorithm/42")
    Open {
        /// Page path
        path: String,
    },

    /// List container images
    Images,

    /// Register a container image
    #[command(name = "create-image")]
    CreateImage {
        #[command(flatten)]
        fields: ImageEdit,
    },

    /// Change a container image
    #[command(name = "update-image")]
    UpdateImage {
        /// Image ID
        id: u64,

        #[command(flatten)]
        edit: ImageEdit,
    },

    /// Delete a container image
    #[command(name = "delete-image")]
    DeleteImage {
        /// Image ID
        id: u64,
    },

    /// List algorithms
    Algorithms {
        /// Only algorithms using this image
        #[arg(long)]
        image: Option<u64>,
    },

    /// Show an algorithm
    Algorithm {
        /// Algorithm ID
        id: u64,
    },

    /// Register an algorithm (--name, --command and --image are required)
    #[command(name = "create-algorithm")]
    CreateAlgorithm {
        #[command(flatten)]
        fields: AlgorithmEdit,
    },

    /// Change an algorithm
    #[command(name = "update-algorithm")]
    UpdateAlgorithm {
        /// Algorithm ID
        id: u64,

        #[command(flatten)]
        edit: AlgorithmEdit,
    },

    /// Delete an algorithm
    #[command(name = "delete-algorithm")]
    DeleteAlgorithm {
        /// Algorithm ID
        id: u64,
    },

    /// Run an algorithm on a dataset
    Run {
        /// Algorithm ID
        id: u64,

        /// Input dataset ID
        #[arg(short, long)]
        dataset: u64,
    },

    /// List algorithm tasks
    Tasks {
        /// Only tasks of this algorithm
        #[arg(long)]
        algorithm: Option<u64>,
    },

    /// Show a task
    Task {
        /// Task ID
        id: u64,
    },

    /// Print task logs
    Logs {
        /// Task ID
        id: u64,

        /// Only the first N lines
        #[arg(long, conflicts_with = "tail", value_parser = clap::value_parser!(u32).range(1..))]
        head: Option<u32>,

        /// Only the last N lines
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        tail: Option<u32>,
    },

    /// List input or output files of a task
    #[command(name = "task-files")]
    TaskFiles {
        /// Task ID
        id: u64,

        /// Show the input dataset instead of the output
        #[arg(long)]
        input: bool,
    },

    /// List datasets
    Datasets {
        /// Include datasets produced as task output
        #[arg(long)]
        include_output: bool,
    },

    /// Show a dataset
    Dataset {
        /// Dataset ID
        id: u64,
    },

    /// Create a dataset (--name is required)
    #[command(name = "create-dataset")]
    CreateDataset {
        #[command(flatten)]
        fields: DatasetEdit,
    },

    /// Change a dataset
    #[command(name = "update-dataset")]
    UpdateDataset {
        /// Dataset ID
        id: u64,

        #[command(flatten)]
        edit: DatasetEdit,
    },

    /// Delete a dataset
    #[command(name = "delete-dataset")]
    DeleteDataset {
        /// Dataset ID
        id: u64,
    },

    /// List files of a dataset
    #[command(name = "dataset-files")]
    DatasetFiles {
        /// Dataset ID
        id: u64,
    },

    /// Browse the folders and files of a dataset
    #[command(name = "dataset-tree")]
    DatasetTree {
        /// Dataset ID
        id: u64,

        /// Folder to list (e.g. "a/b")
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// Check that the API is reachable
    Health,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        std::process::exit(1);
    }
}

/// Targets match by prefix, so `oasis` also covers `oasis_core` and `oasis_client`.
fn log_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("oasis={level}")
}

fn init_tracing(verbose: bool) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = log_directive(verbose).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::new(cli.api_url, cli.timeout_secs, cli.limit, cli.json);
    let client = ApiClient::from_config(&config.client)?;
    let page = PageRequest::first(config.page_limit);

    info!(api = %client.base_url(), "Using RD-OASIS API");

    match cli.command {
        Commands::Open { path } => {
            let routes = RouteTable::standard();
            let nav = Navigator::new(&routes, &client, config.page_limit);
            let loaded = nav.open(&path).await?;

            if config.json {
                render::print_json(&loaded)?;
            } else {
                render::print_page(&loaded, |alg| nav.algorithm_path(alg.id()).ok());
            }
        }
        Commands::Images => {
            let images = client.list_images(page).await?;
            if config.json {
                render::print_json(&images)?;
            } else {
                render::print_images(&images);
            }
        }
        Commands::CreateImage { fields } => {
            let image = client.create_image(&fields.create()?).await?;
            info!(image = %image.id(), name = %image.name, "Image registered");
            print_record(config.json, &image, render::print_image)?;
        }
        Commands::UpdateImage { id, edit } => {
            let id = ImageId::new(id);
            let current = client.get_image(id).await?;
            let image = client
                .update_image(id, &edit.apply(NewImage::from(&current)))
                .await?;
            info!(image = %id, "Image updated");
            print_record(config.json, &image, render::print_image)?;
        }
        Commands::DeleteImage { id } => {
            client.delete_image(ImageId::new(id)).await?;
            info!(image = id, "Image deleted");
        }
        Commands::Algorithms { image } => {
            let algorithms = client.list_algorithms(image.map(ImageId::new), page).await?;
            if config.json {
                render::print_json(&algorithms)?;
            } else {
                render::print_algorithms(&algorithms);
            }
        }
        Commands::Algorithm { id } => {
            let algorithm = client.get_algorithm(AlgorithmId::new(id)).await?;
            if config.json {
                render::print_json(&algorithm)?;
            } else {
                let image = navigate::load_image(&client, algorithm.docker_image).await;
                render::print_algorithm(&algorithm, image.as_ref());
            }
        }
        Commands::CreateAlgorithm { fields } => {
            let algorithm = client.create_algorithm(&fields.create()?).await?;
            info!(algorithm = %algorithm.id(), name = %algorithm.name, "Algorithm registered");
            print_record(config.json, &algorithm, |alg| render::print_algorithm(alg, None))?;
        }
        Commands::UpdateAlgorithm { id, edit } => {
            let id = AlgorithmId::new(id);
            let current = client.get_algorithm(id).await?;
            let algorithm = client
                .update_algorithm(id, &edit.apply(NewAlgorithm::from(&current)))
                .await?;
            info!(algorithm = %id, "Algorithm updated");
            print_record(config.json, &algorithm, |alg| render::print_algorithm(alg, None))?;
        }
        Commands::DeleteAlgorithm { id } => {
            client.delete_algorithm(AlgorithmId::new(id)).await?;
            info!(algorithm = id, "Algorithm deleted");
        }
        Commands::Run { id, dataset } => {
            let run = AlgorithmRun {
                input_dataset: DatasetId::new(dataset),
            };
            let task = client.run_algorithm(AlgorithmId::new(id), &run).await?;
            info!(task = %task.id(), algorithm = id, dataset, "Task started");

            if config.json {
                render::print_json(&task)?;
            } else {
                println!("Task started:");
                render::print_task(&task);
            }
        }
        Commands::Tasks { algorithm } => {
            let tasks = client.list_tasks(algorithm.map(AlgorithmId::new), page).await?;
            if config.json {
                render::print_json(&tasks)?;
            } else {
                render::print_tasks(&tasks);
            }
        }
        Commands::Task { id } => {
            let task = client.get_task(TaskId::new(id)).await?;
            if config.json {
                render::print_json(&task)?;
            } else {
                render::print_task(&task);
            }
        }
        Commands::Logs { id, head, tail } => {
            let slice = match (head, tail) {
                (_, Some(n)) => LogSlice::Tail(n),
                (Some(n), None) => LogSlice::Head(n),
                (None, None) => LogSlice::All,
            };
            let logs = client.task_logs(TaskId::new(id), slice).await?;
            print!("{logs}");
            if !logs.ends_with('\n') {
                println!();
            }
        }
        Commands::TaskFiles { id, input } => {
            let files = if input {
                client.task_input(TaskId::new(id), page).await?
            } else {
                client.task_output(TaskId::new(id), page).await?
            };
            if config.json {
                render::print_json(&files)?;
            } else {
                render::print_files(&files);
            }
        }
        Commands::Datasets { include_output } => {
            let datasets = client.list_datasets(include_output, page).await?;
            if config.json {
                render::print_json(&datasets)?;
            } else {
                render::print_datasets(&datasets);
            }
        }
        Commands::Dataset { id } => {
            let dataset = client.get_dataset(DatasetId::new(id)).await?;
            if config.json {
                render::print_json(&dataset)?;
            } else {
                render::print_dataset(&dataset);
            }
        }
        Commands::CreateDataset { fields } => {
            let dataset = client.create_dataset(&fields.create()?).await?;
            info!(dataset = %dataset.id(), name = %dataset.name, "Dataset created");
            print_record(config.json, &dataset, render::print_dataset)?;
        }
        Commands::UpdateDataset { id, edit } => {
            let id = DatasetId::new(id);
            let current = client.get_dataset(id).await?;
            let dataset = client
                .update_dataset(id, &edit.apply(NewDataset::from(&current)))
                .await?;
            info!(dataset = %id, "Dataset updated");
            print_record(config.json, &dataset, render::print_dataset)?;
        }
        Commands::DeleteDataset { id } => {
            client.delete_dataset(DatasetId::new(id)).await?;
            info!(dataset = id, "Dataset deleted");
        }
        Commands::DatasetTree { id, prefix } => {
            let tree = client.dataset_tree(DatasetId::new(id), &prefix).await?;
            if config.json {
                render::print_json(&tree)?;
            } else {
                render::print_tree(&prefix, &tree);
            }
        }
        Commands::DatasetFiles { id } => {
            let files = client.dataset_files(DatasetId::new(id), page).await?;
            if config.json {
                render::print_json(&files)?;
            } else {
                render::print_files(&files);
            }
        }
        Commands::Health => {
            let healthy = client.health().await?;
            println!("{}", if healthy { "ok" } else { "unhealthy" });
            if !healthy {
                return Err("API answered with an error status".into());
            }
        }
    }

    Ok(())
}

/// Print one record as JSON or with its text printer.
fn print_record<T: serde::Serialize>(
    json: bool,
    record: &T,
    text: impl Fn(&T),
) -> Result<(), serde_json::Error> {
    if json {
        render::print_json(record)
    } else {
        text(record);
        Ok(())
    }
}
