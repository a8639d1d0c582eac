#[macro_use]
extern crate tracing;

use std::error::Error;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use anyhow::Context;
use rand::Rng;
use rustls::{Certificate, PrivateKey, ServerConfig};
use rustls_pemfile::{certs, pkcs8_private_keys};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;

use trackify_lib::auth::session::SessionAuth;
use trackify_lib::auth::RequireSession;
use trackify_lib::config::{Config, SSLConfig};
use trackify_lib::{auth, report, transaction};

const SERVICE_NAME: &str = "trackify-server";

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default());
    let tracing_guard = tracing::subscriber::set_default(subscriber);
    info!("tracing initialized");

    let config = match get_config_file() {
        Some(config_path) => {
            info!(path = %config_path.display(), "Loading config file");
            Config::from_file(config_path)?
        }
        None => {
            info!("No config file found, reading config from environment");
            Config::from_env()?
        }
    };

    let telemetry_layer = match &config.honeycomb_api_key {
        Some(api_key) => Some(trackify_lib::tracing::create_opentelemetry_layer(
            SERVICE_NAME,
            api_key,
        )?),
        None => None,
    };

    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default())
        .with(telemetry_layer);
    tracing::subscriber::set_global_default(subscriber).context("Unable to set up subscriber")?;
    drop(tracing_guard);

    let (transaction_repo, user_repo) =
        trackify_repo::rest_store::create_repos(&config.store.url, &config.store.key)?;

    let secret = match &config.session_secret {
        Some(secret) => secret.as_bytes().to_vec(),
        None => get_secret()?,
    };
    let session_auth = SessionAuth::from_secret(&secret);
    let signups_enabled = config.signups_enabled;
    if !signups_enabled {
        info!("Signups are disabled");
    }

    let server = HttpServer::new(move || {
        App::new()
            .app_data(Data::new(session_auth.clone()))
            .app_data(Data::new(transaction_repo.clone()))
            .app_data(Data::new(user_repo.clone()))
            .app_data(trackify_lib::error::form_config())
            .wrap(trackify_lib::tracing::create_middleware())
            .configure(auth::auth_service(signups_enabled))
            .configure(transaction::transaction_service)
            .configure(report::report_service)
            .service(transaction::transaction_api_service().wrap(RequireSession::api()))
    });
    let server = match config.ssl {
        None => {
            warn!(address = %config.bind_address, "Using http");
            server.bind(&config.bind_address)?
        }
        Some(ssl_config) => {
            info!(address = %config.bind_address, "Using https");
            server.bind_rustls(&config.bind_address, load_tls_config(ssl_config)?)?
        }
    };
    server.run().await?;

    Ok(())
}

fn load_tls_config(ssl_config: SSLConfig) -> Result<ServerConfig, anyhow::Error> {
    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth();

    let mut cert_file = BufReader::new(
        File::open(ssl_config.certificate_chain_file)
            .context("Error opening certificate chain file")?,
    );
    let mut key_file = BufReader::new(
        File::open(ssl_config.private_key_file).context("Error opening private key file")?,
    );

    let cert_chain = certs(&mut cert_file)
        .context("Unable to read certificate chain file")?
        .into_iter()
        .map(Certificate)
        .collect();
    let mut keys: Vec<PrivateKey> = pkcs8_private_keys(&mut key_file)
        .context("Unable to read private key file")?
        .into_iter()
        .map(PrivateKey)
        .collect();

    if keys.is_empty() {
        anyhow::bail!("No private key found in file");
    }

    config
        .with_single_cert(cert_chain, keys.remove(0))
        .context("Invalid certificate or key")
}

fn get_config_file() -> Option<PathBuf> {
    let config_current_dir = PathBuf::from("config.toml");
    if config_current_dir.exists() {
        return Some(config_current_dir);
    }
    if let Ok(config_env) = std::env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

fn get_state_dir() -> PathBuf {
    if let Ok(state_env) = std::env::var("STATE_DIRECTORY") {
        return PathBuf::from(state_env);
    }

    PathBuf::from("data")
}

/// Gets the session secret from file. If the file does not exist it will generate a new secret
/// and save it to the file
fn get_secret() -> Result<Vec<u8>, anyhow::Error> {
    let state_dir = get_state_dir();
    let secret_file = state_dir.join("secret");
    if secret_file.exists() {
        return fs::read(&secret_file).context("Unable to read secret file");
    }

    let mut rng = rand::thread_rng();
    let mut secret: [u8; 128] = [0; 128];
    rng.fill(&mut secret);

    fs::create_dir_all(&state_dir).context("Unable to create state directory")?;
    fs::write(&secret_file, secret).context("Unable to write secret file")?;
    info!(path = %secret_file.display(), "Generated new session secret");

    Ok(secret.to_vec())
}
