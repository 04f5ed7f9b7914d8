//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
use log::{error, info};
use std::sync::Arc;

use pgstac_concurrenttest::config::{self, get_config, VERSION};
use pgstac_concurrenttest::errors::Error;
use pgstac_concurrenttest::server::Server;
use pgstac_concurrenttest::{cmd_args, fanout, logger};

#[tokio::main]
async fn main() {
    let args = cmd_args::parse();
    logger::init(&args);

    info!("Welcome to pgstac-concurrenttest {}", VERSION);

    if let Err(err) = run(args.config_file.as_deref()).await {
        error!("{}", err);
        // Don't wait for anything still in flight.
        std::process::exit(err.exit_code());
    }
}

async fn run(config_file: Option<&str>) -> Result<(), Error> {
    match config_file {
        Some(path) => config::parse(path).await?,
        None => {
            info!("No config file given, using built-in defaults");
            config::use_defaults()?;
        }
    };

    let config = get_config();
    config.show();

    let server = Arc::new(Server::connect(&config.database).await?);

    info!("Search query: {:?}", config.search.query);

    let summary = fanout::run(server.clone(), &config.search.query, config.search.workers).await?;
    summary.show();

    info!("Done with {}", server.address());

    Ok(())
}
