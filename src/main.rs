use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dnscached::cache::{Cache, Policy};
use dnscached::config::Config;
use dnscached::resolver::Resolver;
use dnscached::server::UdpListener;
use dnscached::transport::{Dispatcher, DohUpstream, Transport, UdpUpstream};
use dnscached::{admin, web};

/// Caching, forwarding DNS resolver daemon.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Directory served under /static by the HTML cache view.
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal startup error");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> dnscached::Result<()> {
    let config = Config::load(&args.config)?;
    let bind_addr = config.bind_addr()?;

    let policy = Policy::parse(&config.cache.policy).expect("validated at config load");
    let cache = Arc::new(Cache::new(
        config.cache.max_entries,
        config.cache.min_ttl,
        config.cache.flush_interval,
        policy,
    ));

    for entry in &config.entries {
        let rtype = match entry.rtype.as_str() {
            "A" => dnscached::dns::DnsType::A,
            "AAAA" => dnscached::dns::DnsType::Aaaa,
            _ => unreachable!("validated at config load"),
        };
        if !cache.insert_synthetic(&entry.key, &entry.value, rtype, entry.ttl) {
            info!(key = %entry.key, "refusing to seed cache entry from config");
        }
    }

    let mut transports = Vec::new();
    for url in &config.server.servers_https {
        transports.push(Transport::Doh(DohUpstream::new(url.clone())));
    }
    for addr in &config.server.servers {
        let addr = addr
            .parse()
            .map_err(|_| dnscached::DnsCachedError::UpstreamIo(format!("bad upstream address {addr:?}")))?;
        transports.push(Transport::Udp(UdpUpstream::new(addr)));
    }
    let dispatcher = Arc::new(Dispatcher::new(transports));

    let resolver = Arc::new(Resolver::new(cache.clone(), dispatcher));
    let listener = UdpListener::bind(bind_addr, resolver).await?;

    let (shutdown_tx, _) = broadcast::channel(1);

    let sweeper = cache.clone().spawn_sweeper(shutdown_tx.subscribe());

    let admin_addr: std::net::SocketAddr = config
        .server
        .admin_address
        .parse()
        .map_err(|_| dnscached::DnsCachedError::UpstreamIo("bad AdminAddress".to_string()))?;
    let admin_listener = tokio::net::TcpListener::bind(admin_addr).await?;
    let admin_router = admin::router(cache.clone());
    let admin_shutdown = shutdown_tx.subscribe();
    let admin_task = tokio::spawn(async move {
        info!(%admin_addr, "admin HTTP surface listening");
        axum::serve(admin_listener, admin_router)
            .with_graceful_shutdown(wait_for_shutdown(admin_shutdown))
            .await
    });

    let web_addr: std::net::SocketAddr = config
        .server
        .web_address
        .parse()
        .map_err(|_| dnscached::DnsCachedError::UpstreamIo("bad WebAddress".to_string()))?;
    let web_listener = tokio::net::TcpListener::bind(web_addr).await?;
    let static_dir = args.static_dir.display().to_string();
    let web_router = web::router(cache.clone(), &static_dir);
    let web_shutdown = shutdown_tx.subscribe();
    let web_task = tokio::spawn(async move {
        info!(%web_addr, "HTML cache view listening");
        axum::serve(web_listener, web_router)
            .with_graceful_shutdown(wait_for_shutdown(web_shutdown))
            .await
    });

    let udp_shutdown = shutdown_tx.subscribe();
    let udp_task = tokio::spawn(async move { listener.serve(udp_shutdown).await });

    wait_for_signal().await;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(());

    let _ = udp_task.await;
    let _ = admin_task.await;
    let _ = web_task.await;
    let _ = sweeper.await;

    Ok(())
}

async fn wait_for_shutdown(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
