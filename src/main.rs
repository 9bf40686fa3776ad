use clap::{Arg, Command};
use std::error::Error;
use std::path::PathBuf;

use queued_client::logging::init_tracing;
use queued_client::{util, Config, QueueClient};

fn cli() -> Command {
	Command::new("queued-client")
		.version(env!("CARGO_PKG_VERSION"))
		.about("Run one command against a queued server")
		.subcommand_required(true)
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.help("Config file (default ~/.config/queued/client.toml)"),
		)
		.arg(Arg::new("host").long("host").value_name("HOST").help("Server host"))
		.arg(
			Arg::new("port")
				.short('p')
				.long("port")
				.value_name("PORT")
				.value_parser(clap::value_parser!(u16))
				.help("Server port"),
		)
		.subcommand(
			Command::new("enqueue")
				.about("Put data on the queue")
				.arg(Arg::new("data").required(true)),
		)
		.subcommand(Command::new("dequeue").about("Take the oldest item off the queue"))
		.subcommand(Command::new("size").about("Print the number of queued items"))
		.subcommand(
			Command::new("has")
				.about("Check whether an item with this content is queued")
				.arg(Arg::new("data").required(true)),
		)
		.subcommand(
			Command::new("has-hash")
				.about("Check whether an item with this SHA-256 digest (hex) is queued")
				.arg(Arg::new("hash").required(true)),
		)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	let matches = cli().get_matches();

	let config_path = matches.get_one::<String>("config").map(PathBuf::from);
	let mut config = Config::load(config_path.as_deref())?;
	if let Some(host) = matches.get_one::<String>("host") {
		config.host = host.clone();
	}
	if let Some(port) = matches.get_one::<u16>("port") {
		config.port = *port;
	}
	config.validate()?;
	init_tracing(&config.log_level);

	let client = QueueClient::connect(&config).await?;
	let result = run(&client, &matches).await;
	client.close().await;
	result
}

async fn run(client: &QueueClient, matches: &clap::ArgMatches) -> Result<(), Box<dyn Error>> {
	match matches.subcommand() {
		Some(("enqueue", sub)) => {
			let data = sub.get_one::<String>("data").ok_or("enqueue: data argument required")?;
			client.enqueue(data.as_bytes()).await?;
			println!("OK");
		}
		Some(("dequeue", _)) => match client.dequeue().await? {
			Some(item) => println!("{}", String::from_utf8_lossy(&item)),
			None => println!("queue is empty"),
		},
		Some(("size", _)) => println!("{}", client.size().await?),
		Some(("has", sub)) => {
			let data = sub.get_one::<String>("data").ok_or("has: data argument required")?;
			println!("{}", client.has(data.as_bytes()).await?);
		}
		Some(("has-hash", sub)) => {
			let text = sub.get_one::<String>("hash").ok_or("has-hash: hash argument required")?;
			let hash = util::hash_from_hex(text)?;
			if hash.len() != util::HASH_SIZE {
				return Err(format!(
					"has-hash: expected {} bytes, got {}",
					util::HASH_SIZE,
					hash.len()
				)
				.into());
			}
			println!("{}", client.has_hash(&hash).await?);
		}
		_ => return Err("unknown command".into()),
	}
	Ok(())
}


// vim: ts=4
