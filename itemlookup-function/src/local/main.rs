// Copyright (c) 2020-present, UMD Database Group.
//
// This program is free software: you can use, redistribute, and/or modify
// it under the terms of the GNU Affero General Public License, version 3
// or later ("AGPL"), as published by the Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.

//! Runs the item lookup against `DATABASE_URL`, reading one JSON request per
//! line from stdin and writing one JSON response per line to stdout.

use env_logger::Env;
use itemlookup::error::Result;
use itemlookup_function::launcher::Launcher;
use itemlookup_function::local::LocalLauncher;
use tokio::io::{stdin, stdout, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let launcher = LocalLauncher::new().await?;
    launcher.run(BufReader::new(stdin()), stdout()).await?;
    Ok(())
}
