#[macro_use]
extern crate tracing;

use clap::Parser;
use eyre::{
    OptionExt as _,
    Result,
};
use futures::StreamExt as _;
use ingress_dns::{
    dns::NameserverUpstream,
    handler::{
        IngressConfig,
        IngressHandler,
    },
    query::Query,
    resources::{
        IngressRecord,
        RecordType,
    },
    self_address::{
        LocalInterfaces,
        SelfAddress,
        ServiceAddresses,
        StaticAddresses,
    },
};
use k8s_openapi::api::networking::v1::Ingress;
use kube::{
    api::ListParams,
    runtime::{
        reflector::{
            self,
            Store,
        },
        watcher,
        WatchStreamExt as _,
    },
    Api,
};
use std::{
    net::{
        IpAddr,
        SocketAddr,
    },
    sync::Arc,
    time::Duration,
};

#[derive(Parser)]
#[command(version, about)]
enum Args {
    /// Answer a single query from the live cluster state and print the response
    Lookup(ArgsLookup),
    /// Print the Ingresses that can be answered for, as YAML
    Ingresses,
}

#[derive(Parser)]
struct ArgsLookup {
    #[clap(help = "Name to query, e.g. foo.example.org")]
    name: String,

    #[clap(long = "type", default_value = "A", help = "Query type: A or AAAA")]
    qtype: RecordType,

    #[clap(flatten)]
    plugin: ArgsPlugin,
}

#[derive(Parser)]
struct ArgsPlugin {
    #[clap(
        long = "zone",
        env = "INGRESS_DNS_ZONES",
        value_delimiter = ',',
        required = true,
        help = "Zones to answer for, may be repeated"
    )]
    zones: Vec<String>,

    #[clap(
        long,
        env = "INGRESS_DNS_TTL",
        default_value_t = IngressConfig::DEFAULT_TTL,
        help = "TTL of synthesized records in seconds"
    )]
    ttl: u32,

    #[clap(
        long,
        env = "INGRESS_DNS_UPSTREAM",
        help = "Nameserver and port used to resolve load balancer hostnames",
        default_value = "1.1.1.1:53"
    )]
    upstream: SocketAddr,

    #[clap(
        long,
        env = "INGRESS_DNS_UPSTREAM_TIMEOUT",
        help = "How long a query may wait for upstream answers",
        default_value = "2s",
        value_parser = humantime::parse_duration
    )]
    upstream_timeout: Duration,

    #[clap(
        long = "self-address",
        env = "INGRESS_DNS_SELF_ADDRESSES",
        value_delimiter = ',',
        help = "Addresses to answer ns1.dns.<zone> with. Defaults to the local interfaces"
    )]
    self_addresses: Vec<IpAddr>,

    #[clap(
        long,
        env = "INGRESS_DNS_SELF_SERVICE",
        help = "namespace/name of the Service exposing this server, used for ns1.dns.<zone>"
    )]
    self_service: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    match Args::parse() {
        Args::Lookup(args) => {
            run_lookup(args).await?;
        }
        Args::Ingresses => {
            let client = kube::Client::try_default().await?;
            let ingresses = Api::<Ingress>::all(client).list(&ListParams::default()).await?;
            let records = ingresses.iter().map(IngressRecord::from).collect::<Vec<_>>();
            print!("{}", serde_yaml::to_string(&records)?);
        }
    }

    Ok(())
}

async fn run_lookup(
    ArgsLookup {
        name,
        qtype,
        plugin,
    }: ArgsLookup,
) -> Result<()> {
    let client = kube::Client::try_default().await?;

    let self_address: Arc<dyn SelfAddress> = match (&plugin.self_service, plugin.self_addresses.is_empty()) {
        (Some(service), _) => {
            let (ns, name) = service
                .split_once('/')
                .ok_or_eyre("--self-service must be of the form namespace/name")?;
            Arc::new(ServiceAddresses::new(client.clone(), name, ns))
        }
        (None, false) => Arc::new(StaticAddresses(plugin.self_addresses.clone())),
        (None, true) => Arc::new(LocalInterfaces),
    };

    let index = ingress_store(client).await?;

    let handler = IngressHandler::new(
        IngressConfig::new(&plugin.zones, plugin.ttl),
        Arc::new(index),
        Arc::new(NameserverUpstream::new(plugin.upstream)),
        self_address,
    );

    let query = Query::new(&name, qtype).with_timeout(plugin.upstream_timeout);
    match handler.serve(&query).await {
        Some(response) => {
            println!(";; status: {}", response.rcode);
            for record in response.answer {
                println!("{record}");
            }
        }
        None => {
            println!(";; not authoritative for {}", query.name);
        }
    }

    Ok(())
}

/// Starts a reflector for all Ingresses and waits until its cache holds the initial listing.
async fn ingress_store(client: kube::Client) -> Result<Store<Ingress>> {
    let (reader, writer) = reflector::store();
    let stream = reflector::reflector(writer, watcher(Api::<Ingress>::all(client), watcher::Config::default()))
        .default_backoff()
        .applied_objects();

    tokio::spawn(stream.for_each(|event| async move {
        match event {
            Ok(ing) => trace!(name = ?ing.metadata.name, "ingress updated"),
            Err(err) => warn!("Ingress watch error: {err}"),
        }
    }));

    debug!("Waiting for ingress cache...");
    reader.wait_until_ready().await?;
    info!("Ingress cache ready with {} entries", reader.state().len());
    Ok(reader)
}
