use proxyscout::cli::Cli;
use proxyscout::core::discovery::{
    DiscoveryConfig, ExhaustiveReport, ProxyOrigin, ProxyScheme, ProxySelector, ProxyUrlResolver,
};
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();
    let resolver = ProxyUrlResolver::from_env();

    if cli.resolve && !cli.verify {
        print_resolved(&resolver, cli.json)?;
        return Ok(());
    }

    let config: DiscoveryConfig = cli.discovery_config()?;
    let selector = ProxySelector::new(config)?;

    if cli.verify {
        print_resolved(&resolver, cli.json)?;
        match selector.verify_configured(&resolver).await {
            Ok(attempt) => match &attempt.result {
                Ok(status) => println!(
                    "Verified: {} relayed the reference fetch (HTTP {})",
                    attempt.endpoint, status
                ),
                Err(failure) => println!("Not usable: {} ({})", attempt.endpoint, failure),
            },
            Err(e) => eprintln!("Warning: cannot verify configured proxy: {}", e),
        }
        return Ok(());
    }

    if cli.all {
        let report = selector.select_exhaustive().await;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        return Ok(());
    }

    let choice = selector.discover_or_resolve(&resolver).await;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&choice)?);
        return Ok(());
    }

    match &choice.origin {
        ProxyOrigin::Discovered(outcome) => {
            let scheme = outcome.scheme().map(|s| s.to_string()).unwrap_or_default();
            println!("Found {} proxy: {}", scheme, choice.url);
        }
        ProxyOrigin::Configured(source) => {
            println!("No usable local proxy found");
            println!("Using configured proxy: {} (from {})", choice.url, source);
        }
    }

    Ok(())
}

fn print_resolved(
    resolver: &ProxyUrlResolver,
    as_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let resolved = resolver.resolve_detailed();
    let proxies = resolver.derive_client_proxy_map();

    if as_json {
        let out = json!({ "resolved": resolved, "proxies": proxies });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Configured proxy: {} (from {})", resolved.url, resolved.source);
    for (scheme, url) in &proxies {
        println!("  {:<5} -> {}", scheme, url);
    }
    Ok(())
}

fn print_report(report: &ExhaustiveReport) {
    if report.open_ports.is_empty() {
        println!("No open ports in range on {}", report.host);
    } else {
        let open: Vec<String> = report.open_ports.iter().map(|p| p.to_string()).collect();
        println!("Open ports on {}: {}", report.host, open.join(", "));
    }

    for scheme in ProxyScheme::PROBE_ORDER {
        let endpoints = report.endpoints(scheme);
        if endpoints.is_empty() {
            println!("{} proxies: none", scheme);
            continue;
        }
        println!("{} proxies:", scheme);
        for endpoint in endpoints {
            println!("  {}", endpoint);
        }
    }

    if let Some(best) = report.best() {
        println!("Recommended: {}", best);
    }
}
