//! Petstore Schema CLI
//!
//! Inspect the registry, resolve concrete paths, lint the declarations,
//! check JSON documents against endpoint shapes and assemble request URLs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser, Subcommand};
use petstore_schemas::conformance::{check_request_body, check_response};
use petstore_schemas::{
    petstore, Endpoint, HttpMethod, ParamValue, PetstoreConfig, SchemaError, SchemaRegistry,
};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "petstore-schema")]
#[command(about = "Inspect and exercise the Petstore schema registry")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show API metadata and the catalog fingerprint
    Info {
        /// Fail unless the API version satisfies this requirement (e.g. "^1.0")
        #[arg(long)]
        require: Option<String>,
    },

    /// List record shapes
    Records,

    /// Show the fields of one record
    Record {
        name: String,
    },

    /// List every endpoint
    Endpoints,

    /// Show one endpoint declaration
    Show {
        method: HttpMethod,
        path: String,
    },

    /// Find the endpoint serving a concrete path
    Resolve {
        method: HttpMethod,
        /// Concrete request path (e.g. /pet/42)
        path: String,
    },

    /// Report authoring inconsistencies
    Lint {
        /// Exit non-zero on warnings too
        #[arg(long)]
        deny_warnings: bool,
    },

    /// Check a JSON document against an endpoint's request or response shape
    #[command(group(ArgGroup::new("document").required(true).args(["request", "response"])))]
    Check {
        method: HttpMethod,
        path: String,
        /// JSON file holding a request body
        #[arg(long)]
        request: Option<PathBuf>,
        /// JSON file holding a response body
        #[arg(long)]
        response: Option<PathBuf>,
    },

    /// Assemble the URL, headers and body for a request
    Url {
        method: HttpMethod,
        path: String,
        /// Path parameter (name=value)
        #[arg(short = 'p', long = "path-param", value_parser = parse_pair)]
        path_params: Vec<(String, String)>,
        /// Query parameter (name=value, repeat for sequences)
        #[arg(short, long, value_parser = parse_pair)]
        query: Vec<(String, String)>,
        /// Header parameter (name=value)
        #[arg(short = 'H', long, value_parser = parse_pair)]
        header: Vec<(String, String)>,
        /// JSON file holding the request body
        #[arg(long)]
        body: Option<PathBuf>,
        /// Base URL (defaults to client.base_url from configuration)
        #[arg(long)]
        base: Option<String>,
    },
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", s))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = PetstoreConfig::load_from(cli.config.as_deref())?;
    let registry = petstore()?;

    match cli.command {
        Commands::Info { require } => {
            let info = registry.info();
            println!("📋 {} {}", info.title, info.version);
            println!("   Records:     {}", registry.records().len());
            println!("   Paths:       {}", registry.paths().len());
            println!("   Endpoints:   {}", registry.endpoint_count());
            println!("   Fingerprint: {}", registry.fingerprint()?);

            if let Some(requirement) = require {
                if registry.satisfies_str(&requirement)? {
                    println!("✅ {} satisfies {}", info.version, requirement);
                } else {
                    println!("❌ {} does not satisfy {}", info.version, requirement);
                    std::process::exit(1);
                }
            }
            Ok(())
        }

        Commands::Records => {
            println!("📦 {} record(s)", registry.records().len());
            for shape in registry.records() {
                let required = shape.required_fields();
                if required.is_empty() {
                    println!("  {} ({} fields)", shape.name, shape.fields.len());
                } else {
                    println!(
                        "  {} ({} fields, required: {})",
                        shape.name,
                        shape.fields.len(),
                        required.join(", ")
                    );
                }
            }
            Ok(())
        }

        Commands::Record { name } => {
            let shape = registry.require_record(&name)?;
            println!("📦 {}", shape.name);
            for field in &shape.fields {
                let marker = if field.required { "required" } else { "optional" };
                match &field.description {
                    Some(description) => println!(
                        "  {:<12} {:<12} {:<9} {}",
                        field.name, field.type_ref.to_string(), marker, description
                    ),
                    None => println!("  {:<12} {:<12} {}", field.name, field.type_ref.to_string(), marker),
                }
            }
            Ok(())
        }

        Commands::Endpoints => {
            println!("🔗 {} endpoint(s)", registry.endpoint_count());
            for endpoint in registry.endpoints() {
                println!(
                    "  {:<7} {:<28} {}",
                    endpoint.method.as_str(),
                    endpoint.path.as_str(),
                    endpoint.operation_id.as_deref().unwrap_or("-")
                );
            }
            Ok(())
        }

        Commands::Show { method, path } => {
            let endpoint = registry.endpoint(&path, method)?;
            print_endpoint(endpoint);
            Ok(())
        }

        Commands::Resolve { method, path } => {
            let Some(matched) = registry.resolve(&path, method) else {
                bail!("no {} endpoint matches '{}'", method, path);
            };
            println!("✅ {} {} → {}", method, path, matched.endpoint);
            for (name, value) in &matched.path_params {
                println!("   {} = {}", name, value);
            }
            Ok(())
        }

        Commands::Lint { deny_warnings } => {
            let result = config.lint.linter().lint(&registry);
            let deny = deny_warnings || config.lint.deny_warnings;

            for finding in &result.errors {
                println!("❌ [{}] {}: {}", finding.code, finding.subject, finding.message);
            }
            for finding in &result.warnings {
                println!("⚠️  [{}] {}: {}", finding.code, finding.subject, finding.message);
            }

            println!();
            println!(
                "{} error(s), {} warning(s)",
                result.errors.len(),
                result.warnings.len()
            );
            if !result.is_clean() || (deny && result.has_warnings()) {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Check {
            method,
            path,
            request,
            response,
        } => {
            let endpoint = registry.endpoint(&path, method)?;
            let outcome = match (request, response) {
                (Some(file), _) => check_request_body(&registry, endpoint, Some(&read_json(&file)?)),
                (None, Some(file)) => check_response(&registry, endpoint, Some(&read_json(&file)?)),
                (None, None) => bail!("one of --request or --response is required"),
            };

            match outcome {
                Ok(()) => {
                    println!("✅ Document conforms to {}", endpoint);
                    Ok(())
                }
                Err(SchemaError::ShapeMismatch { context, violations }) => {
                    println!("❌ {} violation(s) in {}", violations.len(), context);
                    for violation in &violations {
                        println!("   └─ {}", violation);
                    }
                    std::process::exit(1);
                }
                Err(e) => Err(e.into()),
            }
        }

        Commands::Url {
            method,
            path,
            path_params,
            query,
            header,
            body,
            base,
        } => {
            let base = match base {
                Some(base) => Url::parse(&base).with_context(|| format!("invalid base URL '{}'", base))?,
                None => config.base_url()?,
            };
            print_prepared(&registry, method, &path, path_params, query, header, body.as_deref(), &base)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn print_prepared(
    registry: &SchemaRegistry,
    method: HttpMethod,
    path: &str,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    header: Vec<(String, String)>,
    body: Option<&Path>,
    base: &Url,
) -> anyhow::Result<()> {
    let mut builder = registry.request(path, method)?;

    for (name, value) in path_params {
        builder = builder.path_param(&name, value);
    }

    // Repeated keys become one sequence value
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in query {
        grouped.entry(name).or_default().push(value);
    }
    for (name, mut values) in grouped {
        builder = if values.len() == 1 {
            builder.query(&name, values.remove(0))
        } else {
            builder.query(&name, ParamValue::List(values))
        };
    }

    for (name, value) in header {
        builder = builder.header(&name, value);
    }

    if let Some(file) = body {
        builder = builder.json_body(read_json(file)?);
    }

    let prepared = builder.build()?;
    println!("{} {}", prepared.method, prepared.url(base)?);
    for (name, value) in &prepared.headers {
        println!("{}: {}", name, value);
    }
    if let Some(body) = &prepared.body {
        println!();
        println!("{}", serde_json::to_string_pretty(body)?);
    }
    Ok(())
}

fn print_endpoint(endpoint: &Endpoint) {
    println!("🔗 {}", endpoint);
    if let Some(id) = &endpoint.operation_id {
        println!("   Operation: {}", id);
    }
    if !endpoint.params.is_empty() {
        println!("   Parameters:");
        for param in &endpoint.params {
            let marker = if param.required { "required" } else { "optional" };
            println!(
                "     {:<8} {:<20} {:<10} {}{}",
                param.location.to_string(),
                param.name,
                param.type_ref.to_string(),
                marker,
                param
                    .description
                    .as_deref()
                    .map(|d| format!(" - {}", d))
                    .unwrap_or_default()
            );
        }
    }
    match &endpoint.request_body {
        Some(body) => println!("   Request body: {}", body),
        None => println!("   Request body: (none)"),
    }
    match &endpoint.response {
        Some(response) => println!("   Response: {}", response),
        None => println!("   Response: (undeclared, opaque)"),
    }
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} as JSON", path.display()))
}
