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

//! Configuration settings that affect all crates in current system.

use humantime::parse_duration;
use ini::Ini;
use lazy_static::lazy_static;
use std::time::Duration;

lazy_static! {
    /// Global settings.
    pub static ref ITEMLOOKUP_CONF: Ini = Ini::load_from_str(include_str!("./config.toml"))
        .expect("embedded config.toml is valid INI");

    /// Maximum number of pooled database connections per execution environment.
    pub static ref ITEMLOOKUP_DB_MAX_CONNECTIONS: u32 = ITEMLOOKUP_CONF["database"]["max_connections"]
        .parse::<u32>()
        .expect("database.max_connections is an unsigned integer");
    /// How long a query waits for a pooled connection.
    pub static ref ITEMLOOKUP_DB_ACQUIRE_TIMEOUT: Duration = parse_duration(&ITEMLOOKUP_CONF["database"]["acquire_timeout"])
        .expect("database.acquire_timeout is a humantime duration");

    /// Service name reported to the tracer provider.
    pub static ref ITEMLOOKUP_SERVICE_NAME: String = ITEMLOOKUP_CONF["tracing"]["service"].to_string();
    /// Operation name of the per-invocation span.
    pub static ref ITEMLOOKUP_SPAN_OPERATION: String = ITEMLOOKUP_CONF["tracing"]["operation"].to_string();
    /// Resource name of the per-invocation span.
    pub static ref ITEMLOOKUP_SPAN_RESOURCE: String = ITEMLOOKUP_CONF["tracing"]["resource"].to_string();
    /// Span tag carrying the looked-up item id.
    pub static ref ITEMLOOKUP_ITEM_ID_TAG: String = ITEMLOOKUP_CONF["tracing"]["item_id_tag"].to_string();

    /// Log target of the correlation logger.
    pub static ref ITEMLOOKUP_LOG_TARGET: String = ITEMLOOKUP_CONF["logging"]["target"].to_string();
    /// Diagnostic context key holding the trace id.
    pub static ref ITEMLOOKUP_TRACE_ID_KEY: String = ITEMLOOKUP_CONF["logging"]["trace_id_key"].to_string();
    /// Diagnostic context key holding the span id.
    pub static ref ITEMLOOKUP_SPAN_ID_KEY: String = ITEMLOOKUP_CONF["logging"]["span_id_key"].to_string();
}
