use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use cloudscale::api::auth::{API_URL_ENV, TOKEN_ENV};
use cloudscale::config::{parse_base_url, Config};
use cloudscale::metadata::{MetadataClient, DEFAULT_METADATA_URL};
use cloudscale::metrics::BucketMetricsRequest;
use cloudscale::model::{TagMap, SERVER_RUNNING};
use cloudscale::resource::{
    custom_image_import_is_finished, load_balancer_is_running, server_is,
};
use cloudscale::{
    with_name_filter, with_tag_filter, CancellationToken, Client, Deletable, ListOption,
    ResourceKind, Retrievable, Service, WaitOptions,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Command line client for the cloudscale.ch API
#[derive(Parser, Debug)]
#[command(name = "cloudscale", version = cloudscale::VERSION, about, long_about = None)]
struct Args {
    /// API token (overrides the config file)
    #[arg(long, global = true, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// API endpoint
    #[arg(long, global = true, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a collection
    List {
        kind: Kind,
        /// Only resources carrying this tag (`key=value` or `key`)
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
        /// Only resources with this exact name
        #[arg(long)]
        name: Option<String>,
        /// Parent pool, required for pool members
        #[arg(long)]
        pool: Option<String>,
    },
    /// Show one resource
    Get {
        kind: Kind,
        id: String,
        #[arg(long)]
        pool: Option<String>,
    },
    /// Delete one resource
    Delete {
        kind: Kind,
        id: String,
        #[arg(long)]
        pool: Option<String>,
    },
    /// Block until a resource reaches a state
    Wait {
        #[command(subcommand)]
        target: WaitTarget,
    },
    /// Server power actions
    Server {
        #[command(subcommand)]
        action: ServerCommand,
    },
    /// Usage metrics
    Metrics {
        #[command(subcommand)]
        query: MetricsCommand,
    },
    /// Query the instance metadata service (only works on a server)
    Metadata {
        /// Print the raw user data instead
        #[arg(long)]
        user_data: bool,
        #[arg(long, default_value = DEFAULT_METADATA_URL)]
        url: String,
    },
    /// Edit the persisted configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Servers,
    ServerGroups,
    Volumes,
    CustomImages,
    CustomImageImports,
    Networks,
    Subnets,
    FloatingIps,
    LoadBalancers,
    LoadBalancerFlavors,
    LoadBalancerPools,
    PoolMembers,
    LoadBalancerListeners,
    LoadBalancerHealthMonitors,
    ObjectsUsers,
    Regions,
    Flavors,
    Images,
}

#[derive(Subcommand, Debug)]
enum WaitTarget {
    /// Wait for a server status
    Server {
        id: String,
        #[arg(long, default_value = SERVER_RUNNING)]
        status: String,
        /// Give up after this many seconds
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },
    /// Wait for a load balancer to be running
    LoadBalancer {
        id: String,
        #[arg(long, default_value_t = 600)]
        timeout: u64,
    },
    /// Wait for a custom image import to finish
    Import {
        id: String,
        #[arg(long, default_value_t = 3600)]
        timeout: u64,
    },
}

#[derive(Subcommand, Debug)]
enum ServerCommand {
    Start { id: String },
    Stop { id: String },
    Reboot { id: String },
}

#[derive(Subcommand, Debug)]
enum MetricsCommand {
    /// Object storage usage per bucket
    Buckets {
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        #[arg(long = "bucket")]
        buckets: Vec<String>,
        #[arg(long = "objects-user")]
        objects_users: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Persist the API endpoint
    SetUrl { url: String },
    /// Persist the API token
    SetToken { token: String },
    /// Print the config file location and settings
    Show,
}

fn parse_tag(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw.split_once('=').unwrap_or((raw, ""));
    if key.is_empty() {
        return Err("tag key must not be empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = match (EnvFilter::try_from_default_env(), level.directive()) {
        (Ok(filter), _) => filter,
        (Err(_), Some(directive)) => EnvFilter::new(directive),
        (Err(_), None) => return Ok(None),
    };

    let (writer, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {:?}", path))?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("cloudscale {} started with log level: {:?}", cloudscale::VERSION, level);

    Ok(Some(guard))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Cancel the token on Ctrl-C.
fn cancel_on_interrupt() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling wait");
            child.cancel();
        }
    });
    token
}

fn wait_options(timeout: u64) -> WaitOptions {
    WaitOptions::default().with_max_elapsed(Some(Duration::from_secs(timeout)))
}

fn require_pool(pool: Option<&str>) -> Result<&str> {
    pool.context("pool members need --pool <pool-uuid>")
}

async fn list_kind<K: ResourceKind + Serialize>(
    service: Service<K>,
    options: &[ListOption],
) -> Result<()> {
    print_json(&service.list(options).await?)
}

async fn get_kind<K: Retrievable + Serialize>(service: Service<K>, id: &str) -> Result<()> {
    let resource = service
        .get(id)
        .await
        .with_context(|| format!("failed to get {} {}", K::NAME, id))?;
    print_json(&resource)
}

async fn delete_kind<K: Deletable>(service: Service<K>, id: &str) -> Result<()> {
    service
        .delete(id)
        .await
        .with_context(|| format!("failed to delete {} {}", K::NAME, id))?;
    eprintln!("Deleted {} {}", K::NAME, id);
    Ok(())
}

async fn list(client: &Client, kind: Kind, pool: Option<&str>, options: &[ListOption]) -> Result<()> {
    match kind {
        Kind::Servers => list_kind(client.servers(), options).await,
        Kind::ServerGroups => list_kind(client.server_groups(), options).await,
        Kind::Volumes => list_kind(client.volumes(), options).await,
        Kind::CustomImages => list_kind(client.custom_images(), options).await,
        Kind::CustomImageImports => list_kind(client.custom_image_imports(), options).await,
        Kind::Networks => list_kind(client.networks(), options).await,
        Kind::Subnets => list_kind(client.subnets(), options).await,
        Kind::FloatingIps => list_kind(client.floating_ips(), options).await,
        Kind::LoadBalancers => list_kind(client.load_balancers(), options).await,
        Kind::LoadBalancerFlavors => list_kind(client.load_balancer_flavors(), options).await,
        Kind::LoadBalancerPools => list_kind(client.load_balancer_pools(), options).await,
        Kind::PoolMembers => {
            let pool = require_pool(pool)?;
            list_kind(client.load_balancer_pool_members(pool)?, options).await
        }
        Kind::LoadBalancerListeners => list_kind(client.load_balancer_listeners(), options).await,
        Kind::LoadBalancerHealthMonitors => {
            list_kind(client.load_balancer_health_monitors(), options).await
        }
        Kind::ObjectsUsers => list_kind(client.objects_users(), options).await,
        Kind::Regions => list_kind(client.regions(), options).await,
        Kind::Flavors => list_kind(client.flavors(), options).await,
        Kind::Images => list_kind(client.images(), options).await,
    }
}

async fn get(client: &Client, kind: Kind, id: &str, pool: Option<&str>) -> Result<()> {
    match kind {
        Kind::Servers => get_kind(client.servers(), id).await,
        Kind::ServerGroups => get_kind(client.server_groups(), id).await,
        Kind::Volumes => get_kind(client.volumes(), id).await,
        Kind::CustomImages => get_kind(client.custom_images(), id).await,
        Kind::CustomImageImports => get_kind(client.custom_image_imports(), id).await,
        Kind::Networks => get_kind(client.networks(), id).await,
        Kind::Subnets => get_kind(client.subnets(), id).await,
        Kind::FloatingIps => get_kind(client.floating_ips(), id).await,
        Kind::LoadBalancers => get_kind(client.load_balancers(), id).await,
        Kind::LoadBalancerPools => get_kind(client.load_balancer_pools(), id).await,
        Kind::PoolMembers => {
            let pool = require_pool(pool)?;
            get_kind(client.load_balancer_pool_members(pool)?, id).await
        }
        Kind::LoadBalancerListeners => get_kind(client.load_balancer_listeners(), id).await,
        Kind::LoadBalancerHealthMonitors => {
            get_kind(client.load_balancer_health_monitors(), id).await
        }
        Kind::ObjectsUsers => get_kind(client.objects_users(), id).await,
        Kind::LoadBalancerFlavors | Kind::Regions | Kind::Flavors | Kind::Images => {
            bail!("{:?} can only be listed", kind)
        }
    }
}

async fn delete(client: &Client, kind: Kind, id: &str, pool: Option<&str>) -> Result<()> {
    match kind {
        Kind::Servers => delete_kind(client.servers(), id).await,
        Kind::ServerGroups => delete_kind(client.server_groups(), id).await,
        Kind::Volumes => delete_kind(client.volumes(), id).await,
        Kind::CustomImages => delete_kind(client.custom_images(), id).await,
        Kind::Networks => delete_kind(client.networks(), id).await,
        Kind::Subnets => delete_kind(client.subnets(), id).await,
        Kind::FloatingIps => delete_kind(client.floating_ips(), id).await,
        Kind::LoadBalancers => delete_kind(client.load_balancers(), id).await,
        Kind::LoadBalancerPools => delete_kind(client.load_balancer_pools(), id).await,
        Kind::PoolMembers => {
            let pool = require_pool(pool)?;
            delete_kind(client.load_balancer_pool_members(pool)?, id).await
        }
        Kind::LoadBalancerListeners => delete_kind(client.load_balancer_listeners(), id).await,
        Kind::LoadBalancerHealthMonitors => {
            delete_kind(client.load_balancer_health_monitors(), id).await
        }
        Kind::ObjectsUsers => delete_kind(client.objects_users(), id).await,
        Kind::CustomImageImports
        | Kind::LoadBalancerFlavors
        | Kind::Regions
        | Kind::Flavors
        | Kind::Images => bail!("{:?} cannot be deleted", kind),
    }
}

async fn wait(client: &Client, target: WaitTarget) -> Result<()> {
    let cancel = cancel_on_interrupt();
    match target {
        WaitTarget::Server { id, status, timeout } => {
            let server = client
                .servers()
                .wait_for(&id, server_is(&status), &wait_options(timeout), &cancel)
                .await?;
            print_json(&server)
        }
        WaitTarget::LoadBalancer { id, timeout } => {
            let lb = client
                .load_balancers()
                .wait_for(&id, load_balancer_is_running(), &wait_options(timeout), &cancel)
                .await?;
            print_json(&lb)
        }
        WaitTarget::Import { id, timeout } => {
            let import = client
                .custom_image_imports()
                .wait_for(&id, custom_image_import_is_finished(), &wait_options(timeout), &cancel)
                .await?;
            print_json(&import)
        }
    }
}

async fn server_action(client: &Client, action: ServerCommand) -> Result<()> {
    let servers = client.servers();
    match action {
        ServerCommand::Start { id } => servers.start(&id).await?,
        ServerCommand::Stop { id } => servers.stop(&id).await?,
        ServerCommand::Reboot { id } => servers.reboot(&id).await?,
    }
    Ok(())
}

async fn metadata(url: &str, user_data: bool) -> Result<()> {
    let client = MetadataClient::with_url(url)?;
    if user_data {
        print!("{}", client.user_data().await?);
        Ok(())
    } else {
        print_json(&client.metadata().await?)
    }
}

fn configure(action: ConfigCommand) -> Result<()> {
    let mut config = Config::load();
    match action {
        ConfigCommand::SetUrl { url } => {
            let url = parse_base_url(&url)?;
            config.api_url = Some(url.to_string());
            config.save()?;
        }
        ConfigCommand::SetToken { token } => {
            cloudscale::ApiToken::new(token.as_str())?;
            config.token = Some(token.trim().to_string());
            config.save()?;
        }
        ConfigCommand::Show => {
            println!("path:    {:?}", Config::config_path());
            println!("api_url: {}", config.effective_api_url(None));
            println!(
                "token:   {}",
                if config.token.is_some() { "set" } else { "not set" }
            );
        }
    }
    Ok(())
}

fn client(args: &Args) -> Result<Client> {
    let config = Config::load()
        .client_config(args.token.as_deref(), args.api_url.as_deref())
        .context("failed to configure API client")?;
    Ok(Client::new(config)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_ref())?;

    match args.command {
        Command::Metadata { ref url, user_data } => return metadata(url, user_data).await,
        Command::Config { action } => return configure(action),
        _ => {}
    }

    let client = client(&args)?;
    match args.command {
        Command::List {
            kind,
            tags,
            name,
            pool,
        } => {
            let mut options = Vec::new();
            if !tags.is_empty() {
                options.push(with_tag_filter(&tags.into_iter().collect::<TagMap>()));
            }
            if let Some(name) = name {
                options.push(with_name_filter(name));
            }
            list(&client, kind, pool.as_deref(), &options).await
        }
        Command::Get { kind, id, pool } => get(&client, kind, &id, pool.as_deref()).await,
        Command::Delete { kind, id, pool } => delete(&client, kind, &id, pool.as_deref()).await,
        Command::Wait { target } => wait(&client, target).await,
        Command::Server { action } => server_action(&client, action).await,
        Command::Metrics {
            query:
                MetricsCommand::Buckets {
                    start,
                    end,
                    buckets,
                    objects_users,
                },
        } => {
            let mut request = BucketMetricsRequest::new(start, end);
            request.bucket_names = buckets;
            request.objects_user_ids = objects_users;
            print_json(&client.bucket_metrics(&request).await?)
        }
        Command::Metadata { .. } | Command::Config { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag("env=prod").unwrap(), ("env".into(), "prod".into()));
        assert_eq!(parse_tag("backup").unwrap(), ("backup".into(), "".into()));
        assert_eq!(parse_tag("a=b=c").unwrap(), ("a".into(), "b=c".into()));
        assert!(parse_tag("=x").is_err());
    }

    #[test]
    fn test_args_parse_list_with_filters() {
        let args = Args::try_parse_from([
            "cloudscale", "list", "servers", "--tag", "env=prod", "--name", "db-1",
        ])
        .unwrap();
        match args.command {
            Command::List { kind, tags, name, .. } => {
                assert_eq!(kind, Kind::Servers);
                assert_eq!(tags, vec![("env".to_string(), "prod".to_string())]);
                assert_eq!(name.as_deref(), Some("db-1"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    fn arg_env(command: &clap::Command, id: &str) -> Option<String> {
        command
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .and_then(|arg| arg.get_env())
            .map(|env| env.to_string_lossy().into_owned())
    }

    #[test]
    fn test_connection_flags_fall_back_to_environment() {
        use clap::CommandFactory;

        let command = Args::command();
        assert_eq!(arg_env(&command, "token").as_deref(), Some("CLOUDSCALE_API_TOKEN"));
        assert_eq!(arg_env(&command, "api_url").as_deref(), Some("CLOUDSCALE_API_URL"));

        let args = Args::try_parse_from([
            "cloudscale", "--token", "from-flag", "--api-url", "http://localhost:1", "list", "servers",
        ])
        .unwrap();
        assert_eq!(args.token.as_deref(), Some("from-flag"));
        assert_eq!(args.api_url.as_deref(), Some("http://localhost:1"));
    }

    #[test]
    fn test_args_parse_wait_defaults() {
        let args = Args::try_parse_from(["cloudscale", "wait", "server", "abc"]).unwrap();
        match args.command {
            Command::Wait {
                target: WaitTarget::Server { id, status, timeout },
            } => {
                assert_eq!(id, "abc");
                assert_eq!(status, "running");
                assert_eq!(timeout, 300);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
