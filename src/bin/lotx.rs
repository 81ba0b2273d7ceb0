use anyhow::Result;
use clap::Parser;
use loadnet::link::{hamming, LinkStreamConfig, LoadOutputStream};
use loadnet::modem::SpreadCode;
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(name = "lotx", version = "0.1.0", author = "Loadnet")]
#[clap(about = "Transmit a file over the loadnet CPU side channel.", long_about = None)]
struct LotxCli {
    /// The path to the file to transmit.
    #[arg(required = true)]
    source: PathBuf,
    /// The GPS C/A PRN used as the link spread code. Concurrent links on
    /// one host should pick distinct PRNs.
    #[clap(short, long, default_value = "1")]
    prn: usize,
    /// Protect the payload with Hamming(7,4) before framing (doubles the
    /// on-air time; the receiver must pass --fec too).
    #[clap(short, long, default_value = "false")]
    fec: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = LotxCli::parse();
    let mut payload = fs::read(&cli.source)?;
    if cli.fec {
        payload = hamming::encode(&payload);
    }

    let config = LinkStreamConfig::new(SpreadCode::gps_ca(cli.prn)?);
    let mut stream = LoadOutputStream::new(config);

    info!(
        "transmitting {} bytes from {} on prn {}",
        payload.len(),
        cli.source.display(),
        cli.prn
    );
    stream.write(&payload);
    info!("done");

    Ok(())
}
