//! Vitals — command-line driver
//!
//! Sends one request through the patient or premium router in-process and
//! prints the status and JSON body, or serves either router over HTTP.
//! Stores, model and verifier are built from the TOML config.
//!
//! Usage:
//!   cargo run -p vitals-cli -- serve patient --addr 127.0.0.1:8000
//!   cargo run -p vitals-cli -- view
//!   cargo run -p vitals-cli -- sort bmi --order desc
//!   cargo run -p vitals-cli -- create '{"id":"P001","name":"Asha",...}'
//!   cargo run -p vitals-cli -- edit P001 '{"weight":64.5}'
//!   cargo run -p vitals-cli -- predict '{"age":30,...}'
//!   cargo run -p vitals-cli -- race --writers 8

use std::net::SocketAddr;
use std::path::PathBuf;
use std::thread;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tower::ServiceExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use vitals_api::{PatientApi, PremiumApi};
use vitals_config::ServiceConfig;
use vitals_contracts::{
    error::{VitalsError, VitalsResult},
    patient::{Collection, Gender, PatientAttributes, PatientRecord},
    update::{Patch, PatientUpdate},
};
use vitals_core::{traits::RecordStore, ConsistencyMode, PatientService};
use vitals_premium::ScorecardModel;
use vitals_store::{InMemoryStore, JsonFileStore};
use vitals_verify::SchemaVerifier;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Vitals — patient records and insurance premium prediction.
#[derive(Parser)]
#[command(
    name = "vitals",
    about = "Patient records and insurance premium prediction",
    long_about = "Drives the Vitals patient management and premium prediction APIs\n\
                  against a JSON patient file, printing each response as JSON."
)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Override `[store] path`.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Override `[store] consistency`.
    #[arg(long, global = true, value_enum)]
    consistency: Option<Mode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// GET /about
    About,
    /// GET /view: every stored patient.
    View,
    /// GET /patient/{id}
    Show { id: String },
    /// GET /sort: patients ordered by height, weight or bmi.
    Sort {
        by: String,
        #[arg(long)]
        order: Option<String>,
    },
    /// POST /create with a JSON body including `id`.
    Create { body: String },
    /// PUT /edit/{id} with a partial JSON body.
    Edit { id: String, body: String },
    /// DELETE /delete/{id}
    Delete { id: String },
    /// GET /health on the premium API.
    Health,
    /// POST /predict on the premium API.
    Predict { body: String },
    /// Serve the patient or premium API over HTTP until interrupted.
    Serve {
        #[arg(value_enum)]
        app: App,
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
    /// Race concurrent updates against an in-memory store in every
    /// consistency mode and report how many survive.
    Race {
        #[arg(long, default_value_t = 8)]
        writers: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum App {
    Patient,
    Premium,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    LastWriteWins,
    Serialized,
    Optimistic,
}

impl From<Mode> for ConsistencyMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::LastWriteWins => ConsistencyMode::LastWriteWins,
            Mode::Serialized => ConsistencyMode::Serialized,
            Mode::Optimistic => ConsistencyMode::Optimistic,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("vitals: {e}");
            std::process::exit(2);
        }
    }
}

/// Returns whether the request succeeded.
async fn run(cli: Cli) -> VitalsResult<bool> {
    let config = load_config(&cli)?;

    let (method, uri, body) = match cli.command {
        Command::Race { writers } => {
            race_all_modes(writers)?;
            return Ok(true);
        }
        Command::Serve { app, addr } => {
            let router = match app {
                App::Patient => patient_api(&config)?.router(),
                App::Premium => premium_api(&config)?.router(),
            };
            serve(router, addr).await?;
            return Ok(true);
        }
        Command::Health => {
            let router = premium_api(&config)?.router();
            return call(router, Method::GET, "/health".into(), None).await;
        }
        Command::Predict { body } => {
            let router = premium_api(&config)?.router();
            return call(router, Method::POST, "/predict".into(), Some(parse_json(&body)?)).await;
        }
        Command::About => (Method::GET, "/about".to_string(), None),
        Command::View => (Method::GET, "/view".to_string(), None),
        Command::Show { id } => (Method::GET, format!("/patient/{}", encode(&id)), None),
        Command::Sort { by, order } => {
            let uri = match order {
                Some(order) => format!("/sort?sort_by={}&order={}", encode(&by), encode(&order)),
                None => format!("/sort?sort_by={}", encode(&by)),
            };
            (Method::GET, uri, None)
        }
        Command::Create { body } => (Method::POST, "/create".to_string(), Some(parse_json(&body)?)),
        Command::Edit { id, body } => (
            Method::PUT,
            format!("/edit/{}", encode(&id)),
            Some(parse_json(&body)?),
        ),
        Command::Delete { id } => (Method::DELETE, format!("/delete/{}", encode(&id)), None),
    };

    call(patient_api(&config)?.router(), method, uri, body).await
}

// ── Wiring ────────────────────────────────────────────────────────────────────

fn load_config(cli: &Cli) -> VitalsResult<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(path) = &cli.store {
        config.store.path = path.clone();
    }
    if let Some(mode) = cli.consistency {
        config.store.consistency = mode.into();
    }
    debug!(
        store = %config.store.path.display(),
        consistency = ?config.store.consistency,
        "configuration loaded"
    );
    Ok(config)
}

fn patient_api(config: &ServiceConfig) -> VitalsResult<PatientApi> {
    let store = if config.store.create_if_missing {
        JsonFileStore::open_or_create(&config.store.path)?
    } else {
        JsonFileStore::open(&config.store.path)
    };
    let service = PatientService::new(Box::new(store), config.store.consistency);
    Ok(PatientApi::new(
        service,
        Box::new(SchemaVerifier::new()?),
        config.app.about.clone(),
    ))
}

fn premium_api(config: &ServiceConfig) -> VitalsResult<PremiumApi> {
    Ok(PremiumApi::from_config(
        Box::new(ScorecardModel::new(config.premium.model_version.clone())),
        Box::new(SchemaVerifier::new()?),
        &config.premium,
    ))
}

fn parse_json(raw: &str) -> VitalsResult<Value> {
    serde_json::from_str(raw)
        .map_err(|e| VitalsError::invalid("body", format!("not valid JSON: {e}")))
}

/// Percent-encode a path segment or query value.
fn encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                char::from(b).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

async fn serve(router: Router, addr: SocketAddr) -> VitalsResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| VitalsError::ConfigError {
            reason: format!("cannot bind {addr}: {e}"),
        })?;
    info!(%addr, "listening");
    println!("listening on http://{addr}");
    axum::serve(listener, router)
        .await
        .map_err(|e| VitalsError::ConfigError {
            reason: format!("server stopped: {e}"),
        })
}

/// Send one request through `router` in-process and print the response.
async fn call(
    router: Router,
    method: Method,
    uri: String,
    body: Option<Value>,
) -> VitalsResult<bool> {
    let builder = Request::builder().method(method).uri(&uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .map_err(|e| VitalsError::InvalidQuery {
        reason: format!("cannot build request for '{uri}': {e}"),
    })?;

    let response = match router.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| VitalsError::storage(format!("cannot read response body: {e}")))?;

    println!("{}", status.as_u16());
    if !bytes.is_empty() {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(json) => println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
            ),
            Err(_) => println!("{}", String::from_utf8_lossy(&bytes)),
        }
    }
    Ok(status.is_success())
}

// ── Race demo ─────────────────────────────────────────────────────────────────

fn race_all_modes(writers: usize) -> VitalsResult<()> {
    println!("{writers} concurrent updates, one per patient, all loading the same pre-state");
    println!();
    for mode in [
        ConsistencyMode::LastWriteWins,
        ConsistencyMode::Serialized,
        ConsistencyMode::Optimistic,
    ] {
        let (kept, conflicts) = race(mode, writers)?;
        println!("  {mode:?}: {kept}/{writers} kept, {conflicts} conflict(s)");
    }
    Ok(())
}

fn race(mode: ConsistencyMode, writers: usize) -> VitalsResult<(usize, usize)> {
    let ids: Vec<String> = (1..=writers).map(|n| format!("P{n:03}")).collect();
    let mut collection = Collection::new();
    for id in &ids {
        let record = PatientRecord::new(PatientAttributes {
            name: format!("Patient {id}"),
            city: "Nagpur".into(),
            age: 35,
            gender: Gender::Female,
            height: 1.62,
            weight: 61.0,
        })?;
        collection.insert(id.clone(), record);
    }

    let store = InMemoryStore::with_collection(collection);
    let service = PatientService::new(Box::new(store.clone()), mode);

    let results: Vec<VitalsResult<PatientRecord>> = thread::scope(|s| {
        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let service = &service;
                s.spawn(move || {
                    let payload = PatientUpdate {
                        city: Patch::Value(format!("Moved {id}")),
                        ..PatientUpdate::default()
                    };
                    service.update(id, &payload)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| {
                h.join()
                    .unwrap_or_else(|_| Err(VitalsError::storage("writer thread panicked")))
            })
            .collect()
    });

    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(VitalsError::Conflict { .. })))
        .count();
    let stored = store.read_all()?;
    let kept = ids
        .iter()
        .filter(|id| {
            stored
                .get(id.as_str())
                .is_some_and(|r| r.city() == format!("Moved {id}"))
        })
        .count();

    info!(mode = ?mode, writers, kept, conflicts, "race finished");
    Ok((kept, conflicts))
}
