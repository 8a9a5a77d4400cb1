use figment::{Figment, providers::Env};

pub trait ContextProvider<Config> {
    fn new(config: Config) -> impl Future<Output = Self>;
}

/// Initialize the application context with configuration from environment
/// variables. The configuration is extracted using figment.
///
/// Logging is set up first so that configuration failures are reported
/// through the same JSON log stream as everything else.
///
/// # Arguments
/// None
///
/// # Returns
/// The application context with the configuration as specified by the
/// trait.
///
/// # Errors
/// If the configuration cannot be extracted from the environment
/// variables. Missing credentials fail here, before any pipeline work
/// begins.
///
pub async fn create_app_context<'a, A, Config: serde::Deserialize<'a>>()
-> Result<A, figment::Error>
where
    A: ContextProvider<Config>,
{
    tracing_subscriber::fmt()
        .json()
        // allow log level to be overridden by RUST_LOG env var
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        // keep log lines machine-readable when piped to a file.
        .with_ansi(false)
        // remove the name of the function from every log entry
        .with_target(false)
        .init();

    let figment = Figment::new().merge(Env::raw());

    let config: Config = figment.extract()?;

    let context = A::new(config).await;

    Ok(context)
}
