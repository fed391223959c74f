use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schedcrawl::cache::{CacheConfig, CachedTimetable};
use schedcrawl::crawler::{CrawlConfig, CrawlReport, Crawler, TimetableProvider, build_network};
use schedcrawl::domain::{Network, Topology, today};
use schedcrawl::efa::{EfaClient, EfaConfig, MockTimetable};
use schedcrawl::output::{GtfsConfig, NetworkListing, TripStatistics, write_gtfs, write_json};
use schedcrawl::overpass::{
    OverpassClient, OverpassConfig, OverpassError, TopologyCache, TopologyCacheConfig,
    convert_topology,
};

/// Run settings read from `SCHEDCRAWL_*` environment variables.
struct Settings {
    efa: EfaConfig,
    overpass: OverpassConfig,
    output: PathBuf,
    gtfs_dir: Option<PathBuf>,
    topology_cache: Option<PathBuf>,
    mock: Option<PathBuf>,
    listing: bool,
}

impl Settings {
    fn from_env() -> Result<Self, Box<dyn Error>> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let mut efa = EfaConfig::new();
        if let Some(url) = var("SCHEDCRAWL_EFA_URL") {
            efa = efa.with_base_url(url);
        }
        let mut overpass = OverpassConfig::new();
        if let Some(url) = var("SCHEDCRAWL_OVERPASS_URL") {
            overpass = overpass.with_url(url);
        }
        if let Some(relation) = var("SCHEDCRAWL_RELATION") {
            overpass = overpass.with_relation(relation.parse()?);
        }

        Ok(Self {
            efa,
            overpass,
            output: var("SCHEDCRAWL_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("network.json")),
            gtfs_dir: var("SCHEDCRAWL_GTFS_DIR").map(PathBuf::from),
            topology_cache: var("SCHEDCRAWL_TOPOLOGY_CACHE").map(PathBuf::from),
            mock: var("SCHEDCRAWL_MOCK").map(PathBuf::from),
            listing: var("SCHEDCRAWL_LISTING").is_some(),
        })
    }
}

/// Topology from the disk cache if fresh, otherwise from Overpass.
async fn load_topology(settings: &Settings) -> Result<Topology, OverpassError> {
    let relation = settings.overpass.relation_id;
    let cache = settings
        .topology_cache
        .as_ref()
        .map(|path| TopologyCache::new(TopologyCacheConfig::new(path)));

    if let Some(topology) = cache.as_ref().and_then(|c| c.load(relation)) {
        info!(routes = topology.routes.len(), "using cached topology");
        return Ok(topology);
    }

    let client = OverpassClient::new(settings.overpass.clone())?;
    let response = client.fetch_response().await?;

    if let Some(cache) = &cache
        && let Err(e) = cache.save(relation, &response)
    {
        warn!(error = %e, "failed to save topology snapshot");
    }
    let topology = convert_topology(&response);
    info!(routes = topology.routes.len(), "fetched topology");
    Ok(topology)
}

async fn crawl<P: TimetableProvider>(
    provider: P,
    network: &mut Network,
    date: NaiveDate,
) -> CrawlReport {
    let provider = CachedTimetable::new(provider, &CacheConfig::default());
    let crawler = Crawler::new(&provider, CrawlConfig::default(), date);
    crawler.crawl(network).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "schedcrawl=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let topology = load_topology(&settings).await?;
    let mut network = build_network(&topology);
    println!(
        "Built network: {} lines, {} stations",
        network.line_count(),
        network.station_count()
    );

    let date = today();
    let report = match &settings.mock {
        Some(path) => {
            println!("Serving timetable from {}", path.display());
            crawl(MockTimetable::from_file(path)?, &mut network, date).await
        }
        None => crawl(EfaClient::new(settings.efa.clone())?, &mut network, date).await,
    };

    println!(
        "Crawled {} stations ({} failed): {} departures, {} trips",
        report.stations,
        report.failed_stations,
        network.departure_count(),
        network.trip_count()
    );

    write_json(&network, &settings.output)?;
    println!("Wrote {}", settings.output.display());

    if let Some(dir) = &settings.gtfs_dir {
        write_gtfs(&network, date, &GtfsConfig::default(), dir)?;
        println!("Wrote GTFS feed to {}", dir.display());
    }

    if settings.listing {
        println!();
        print!("{}", NetworkListing(&network));
    }
    println!();
    print!("{}", TripStatistics(&network));
    Ok(())
}
