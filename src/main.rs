use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use fleetctl::api::{ApiResponse, CachedApiClient, HttpClient, SessionFile, StaticToken};
use fleetctl::cache::{CacheLayer, MemoryStorage, SWEEP_INTERVAL};
use fleetctl::config::Config;
use fleetctl::logging;
use fleetctl::resources::{find_resource, resource_names, RESOURCES};

#[derive(Parser, Debug)]
#[command(name = "fleetctl")]
#[command(about = "Command-line client for the fleet management API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/fleetctl/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Bypass the response cache
  #[arg(long, global = true)]
  no_cache: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// GET an API path
  Get {
    path: String,
    /// Query parameter as key=value (value parsed as JSON when possible)
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,
  },
  /// List a fleet resource (vehicles, drivers, contracts, ...)
  List {
    resource: String,
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,
  },
  /// POST a JSON body
  Post {
    path: String,
    #[arg(short, long)]
    data: String,
  },
  /// PUT a JSON body
  Put {
    path: String,
    #[arg(short, long)]
    data: String,
  },
  /// DELETE an API path
  Delete { path: String },
  /// Poll an API path, showing when answers come from the cache
  Watch {
    path: String,
    /// Seconds between requests
    #[arg(long, default_value_t = 30)]
    every: u64,
    /// Stop after this many requests
    #[arg(long)]
    count: Option<u64>,
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,
  },
  /// Show the known resources
  Resources,
}

type Client = CachedApiClient<HttpClient>;

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = logging::init()?;

  if let Command::Resources = args.command {
    print_resources();
    return Ok(());
  }

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let client = build_client(&config, args.no_cache)?;

  // Housekeeping for the lifetime of the process
  let _sweeper = client.cache().spawn_sweeper(SWEEP_INTERVAL);

  run(&client, args.command).await
}

fn build_client(config: &Config, no_cache: bool) -> Result<Client> {
  let transport = HttpClient::new(&config.api)?;

  let cache = if no_cache || !config.cache.enabled {
    info!("response cache disabled");
    CacheLayer::disabled()
  } else {
    CacheLayer::new(MemoryStorage::new())
  };

  let client = match (Config::get_api_token(), &config.api.session_file) {
    (Some(token), _) => CachedApiClient::new(transport, cache, StaticToken::new(token)),
    (None, Some(path)) => CachedApiClient::new(transport, cache, SessionFile::new(path)),
    (None, None) => CachedApiClient::new(transport, cache, SessionFile::open_default()?),
  };

  Ok(client)
}

async fn run(client: &Client, command: Command) -> Result<()> {
  match command {
    Command::Get { path, params } => {
      let response = client.get(&path, build_params(params)).await?;
      print_response(&response)
    }
    Command::List { resource, params } => {
      let resource = find_resource(&resource).ok_or_else(|| {
        eyre!(
          "Unknown resource '{}'. Known resources: {}",
          resource,
          resource_names().join(", ")
        )
      })?;
      let response = client.get(resource.path, build_params(params)).await?;
      print_response(&response)
    }
    Command::Post { path, data } => {
      let response = client.post(&path, parse_body(&data)?).await?;
      print_response(&response)
    }
    Command::Put { path, data } => {
      let response = client.put(&path, parse_body(&data)?).await?;
      print_response(&response)
    }
    Command::Delete { path } => {
      let response = client.delete(&path).await?;
      print_response(&response)
    }
    Command::Watch {
      path,
      every,
      count,
      params,
    } => watch(client, &path, every, count, build_params(params)).await,
    Command::Resources => {
      print_resources();
      Ok(())
    }
  }
}

async fn watch(
  client: &Client,
  path: &str,
  every: u64,
  count: Option<u64>,
  params: Option<Value>,
) -> Result<()> {
  let mut ticker = tokio::time::interval(Duration::from_secs(every.max(1)));
  let mut fetched = 0u64;

  loop {
    tokio::select! {
      _ = ticker.tick() => {}
      _ = tokio::signal::ctrl_c() => break,
    }

    let response = client.get(path, params.clone()).await?;
    print_response(&response)?;

    fetched += 1;
    if count.is_some_and(|limit| fetched >= limit) {
      break;
    }
  }

  Ok(())
}

fn print_response(response: &ApiResponse) -> Result<()> {
  if response.from_cache {
    eprintln!("{} (served from cache)", response.status);
  } else {
    eprintln!("{}", response.status);
  }
  println!("{}", serde_json::to_string_pretty(&response.data)?);
  Ok(())
}

fn print_resources() {
  for resource in RESOURCES {
    println!(
      "{:<10} {:<16} {:<22} {}",
      resource.name,
      resource.aliases.join(","),
      resource.path,
      resource.description
    );
  }
}

/// Parse a `key=value` query parameter.
fn parse_param(input: &str) -> std::result::Result<(String, Value), String> {
  let (key, value) = input
    .split_once('=')
    .ok_or_else(|| format!("expected key=value, got '{}'", input))?;

  if key.is_empty() {
    return Err(format!("missing parameter name in '{}'", input));
  }

  let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
  Ok((key.to_string(), value))
}

/// No parameters on the command line means no params at all, not an empty object.
fn build_params(pairs: Vec<(String, Value)>) -> Option<Value> {
  if pairs.is_empty() {
    return None;
  }
  Some(Value::Object(pairs.into_iter().collect::<Map<String, Value>>()))
}

fn parse_body(data: &str) -> Result<Value> {
  serde_json::from_str(data).map_err(|e| eyre!("Invalid JSON body: {}", e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_parse_param_json_and_string_values() {
    assert_eq!(parse_param("page=2").unwrap(), ("page".to_string(), json!(2)));
    assert_eq!(
      parse_param("status=active").unwrap(),
      ("status".to_string(), json!("active"))
    );
    assert_eq!(parse_param("q=a=b").unwrap(), ("q".to_string(), json!("a=b")));
  }

  #[test]
  fn test_parse_param_rejects_malformed() {
    assert!(parse_param("page").is_err());
    assert!(parse_param("=2").is_err());
  }

  #[test]
  fn test_build_params() {
    assert_eq!(build_params(Vec::new()), None);
    assert_eq!(
      build_params(vec![("page".to_string(), json!(1))]),
      Some(json!({"page": 1}))
    );
  }

  #[test]
  fn test_args_parse_list_with_params() {
    let args =
      Args::try_parse_from(["fleetctl", "--no-cache", "list", "vehicles", "-p", "page=3"]).unwrap();

    assert!(args.no_cache);
    match args.command {
      Command::List { resource, params } => {
        assert_eq!(resource, "vehicles");
        assert_eq!(params, vec![("page".to_string(), json!(3))]);
      }
      other => panic!("unexpected command {:?}", other),
    }
  }

  #[test]
  fn test_args_parse_watch_defaults() {
    let args = Args::try_parse_from(["fleetctl", "watch", "/api/dashboard"]).unwrap();
    match args.command {
      Command::Watch { every, count, .. } => {
        assert_eq!(every, 30);
        assert_eq!(count, None);
      }
      other => panic!("unexpected command {:?}", other),
    }
  }

  #[test]
  fn test_parse_body() {
    assert_eq!(parse_body(r#"{"plate":"AB-1"}"#).unwrap(), json!({"plate": "AB-1"}));
    assert!(parse_body("{oops").is_err());
  }
}
