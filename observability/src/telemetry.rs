use crate::conf::{Tracing, ENVIRONMENT};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Install the global tracing subscriber.
///
/// Fails if a global subscriber has already been installed, or if the
/// configured filter directive cannot be parsed.
pub fn init_tracing(settings: &Tracing) -> anyhow::Result<()> {
    let env_filter = build_filter(settings)?;
    let subscriber = Registry::default().with(env_filter);

    // Simplest option to have conditional subscribers because of tracing-subscriber inability to
    // Clone
    if settings.json_logs() {
        tracing::subscriber::set_global_default(
            subscriber.with(layer().json().with_span_events(span_events())),
        )
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    } else {
        tracing::subscriber::set_global_default(
            subscriber.with(layer().with_span_events(span_events())),
        )
        .map_err(|e| anyhow::anyhow!("{e:?}"))?;
    };

    tracing::info!(
        "Tracing initialised for {} in environment {}",
        settings.service_name(),
        *ENVIRONMENT
    );
    Ok(())
}

fn build_filter(settings: &Tracing) -> anyhow::Result<EnvFilter> {
    match settings.filter() {
        Some(directive) => EnvFilter::try_new(directive)
            .map_err(|e| anyhow::anyhow!("invalid log filter {directive}: {e}")),
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(Tracing::default_filter()))
            .map_err(|e| anyhow::anyhow!("{e}")),
    }
}

fn span_events() -> FmtSpan {
    if ENVIRONMENT.reports_span_close() {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_is_parsed() {
        let settings = Tracing::builder()
            .service_name("fhevm_sdk")
            .filter("fhevm_sdk=debug,info")
            .build();
        assert!(build_filter(&settings).is_ok());
    }

    #[test]
    fn bad_filter_is_rejected() {
        let settings = Tracing::builder()
            .service_name("fhevm_sdk")
            .filter("fhevm_sdk=notalevel")
            .build();
        let err = build_filter(&settings).unwrap_err();
        assert!(err.to_string().contains("invalid log filter"));
    }
}
