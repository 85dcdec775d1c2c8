use app_config::{
    common::{DetailPageFailure, MissingMedia},
    Config,
};
use app_extractors::{
    common::{
        media::ScrapeResult,
        request::{FetchOptions, HttpFetcher},
    },
    error::ExtractorError,
    extractors::{DetailPagePolicy, ExtractOptions, NoMediaPolicy},
};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct OutputEntry {
    url: String,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Result(ScrapeResult),
    Error(String),
}

#[tokio::main]
async fn main() {
    app_logger::init();

    let config = Config::global();

    app_logger::debug!(config = ?*config, "Running with config");

    let fetch_options = request_options(config);
    let extract_options = extraction_options(config);
    let cli_config = config.cli();

    let urls = cli_config
        .entries_group
        .all()
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    app_logger::info!("Extracting {} urls", urls.len());
    let results = {
        let results = urls
            .into_iter()
            .map(|url| {
                let fetch_options = fetch_options.clone();

                async move {
                    let res = tokio::task::spawn_blocking({
                        let url = url.clone();
                        move || {
                            let fetcher = HttpFetcher::new(&fetch_options)?;
                            app_extractors::extract_info(&fetcher, &extract_options, &url)
                        }
                    })
                    .await
                    .unwrap_or_else(|e| Err(ExtractorError::Client(e.to_string())));

                    (url, res)
                }
            })
            .collect::<Vec<_>>();

        futures::future::join_all(results).await
    };

    let (extracted, failed) = app_helpers::results::split_results(
        results
            .iter()
            .map(|(url, res)| res.as_ref().map(|_| url).map_err(|e| (url, e))),
    );
    app_logger::info!(
        "Extraction completed: extracted {} urls, failed to extract {} urls",
        extracted.len(),
        failed.len()
    );
    for (url, e) in &failed {
        app_logger::error!("Failed to extract {url:?}: {e}");
    }
    let has_failures = !failed.is_empty();

    let output = results
        .into_iter()
        .map(|(url, res)| OutputEntry {
            url,
            outcome: match res {
                Ok(x) => Outcome::Result(x),
                Err(e) => Outcome::Error(e.to_string()),
            },
        })
        .collect::<Vec<_>>();

    let out = if cli_config.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };

    match out {
        Ok(out) => println!("{}", out),
        Err(e) => {
            app_logger::error!("Failed to serialize results: {e}");
            std::process::exit(1);
        }
    }

    if has_failures {
        std::process::exit(1);
    }
}

fn request_options(config: &Config) -> FetchOptions {
    let defaults = FetchOptions::default();

    FetchOptions {
        user_agent: config
            .request
            .user_agent
            .clone()
            .unwrap_or(defaults.user_agent),
        timeout: config.timeout(),
        cookie: config.request.cookie.clone(),
    }
}

const fn extraction_options(config: &Config) -> ExtractOptions {
    ExtractOptions {
        max_attempts: config.request.max_attempts,
        detail_page: match config.extract.detail_page_failure {
            DetailPageFailure::Skip => DetailPagePolicy::Skip,
            DetailPageFailure::Fail => DetailPagePolicy::Fail,
        },
        no_media: match config.extract.missing_media {
            MissingMedia::Placeholder => NoMediaPolicy::Placeholder,
            MissingMedia::Error => NoMediaPolicy::Error,
        },
    }
}
