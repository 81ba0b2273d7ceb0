use anyhow::Result;
use clap::Parser;
use loadnet::link::{hamming, LinkStreamConfig, LoadInputStream};
use loadnet::modem::SpreadCode;
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[clap(name = "lorx", version = "0.1.0", author = "Loadnet")]
#[clap(about = "Receive packets over the loadnet CPU side channel.", long_about = None)]
struct LorxCli {
    /// The GPS C/A PRN used as the link spread code.
    #[clap(short, long, default_value = "1")]
    prn: usize,
    /// Undo the transmitter's Hamming(7,4) payload protection.
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

    let cli = LorxCli::parse();
    let config = LinkStreamConfig::new(SpreadCode::gps_ca(cli.prn)?);
    let mut stream = LoadInputStream::new(config);

    info!("listening on prn {}", cli.prn);
    loop {
        let mut packet = stream.read();
        if cli.fec {
            packet = match hamming::decode(&packet) {
                Ok(decoded) => decoded,
                Err(error) => {
                    warn!("dropping packet: {}", error);
                    continue;
                }
            };
        }

        let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH)?;
        let path = format!("{}.bin", since_epoch.as_nanos());
        fs::write(&path, &packet)?;
        info!("recieved {} bytes -> {}", packet.len(), path);
    }
}
