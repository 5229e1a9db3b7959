//! The predefined variable table.
//!
//! Each entry records the variable's type and the phases in which it can be
//! read, written and unset, plus whether it carries the fuzzy string-view
//! capability (usable where a STRING is required despite its declared
//! type). The entries are curated from the Fastly variable surface; the
//! string-view set is explicit per entry, never inferred.

use crate::phase::Phase;
use crate::types::VclType;

const RECV: u16 = Phase::Recv as u16;
const HASH: u16 = Phase::Hash as u16;
const HIT: u16 = Phase::Hit as u16;
const MISS: u16 = Phase::Miss as u16;
const PASS: u16 = Phase::Pass as u16;
const FETCH: u16 = Phase::Fetch as u16;
const ERROR: u16 = Phase::Error as u16;
const DELIVER: u16 = Phase::Deliver as u16;
const LOG: u16 = Phase::Log as u16;

const ALL: u16 = RECV | HASH | HIT | MISS | PASS | FETCH | ERROR | DELIVER | LOG;
const BACKEND_REQ: u16 = MISS | PASS | FETCH;
const CLIENT_RESP: u16 = DELIVER | LOG;
const CACHED_OBJ: u16 = HIT | ERROR | DELIVER;
const NONE: u16 = 0;

/// A predefined variable.
#[derive(Debug, Clone, Copy)]
pub struct VariableEntry {
    /// Dotted variable name.
    pub name: &'static str,
    /// Declared type.
    pub ty: VclType,
    /// Phases the variable is readable in.
    pub get: u16,
    /// Phases the variable is writable in.
    pub set: u16,
    /// Phases the variable can be unset in.
    pub unset: u16,
    /// Fuzzy string-view capability.
    pub string_view: bool,
}

const fn read(name: &'static str, ty: VclType, get: u16) -> VariableEntry {
    VariableEntry {
        name,
        ty,
        get,
        set: NONE,
        unset: NONE,
        string_view: false,
    }
}

const fn read_write(name: &'static str, ty: VclType, get: u16, set: u16) -> VariableEntry {
    VariableEntry {
        name,
        ty,
        get,
        set,
        unset: NONE,
        string_view: false,
    }
}

const fn fuzzy(mut entry: VariableEntry) -> VariableEntry {
    entry.string_view = true;
    entry
}

/// An HTTP header family: every `<prefix>NAME` access is a STRING header
/// with these permissions.
#[derive(Debug, Clone, Copy)]
pub struct HeaderFamily {
    /// Variable prefix including the trailing dot (`req.http.`).
    pub prefix: &'static str,
    /// Phases the headers are readable in.
    pub get: u16,
    /// Phases the headers are writable in.
    pub set: u16,
    /// Phases the headers can be unset in.
    pub unset: u16,
}

/// The HTTP header wildcard families.
pub const HEADER_FAMILIES: &[HeaderFamily] = &[
    HeaderFamily {
        prefix: "req.http.",
        get: ALL,
        set: ALL,
        unset: ALL,
    },
    HeaderFamily {
        prefix: "bereq.http.",
        get: BACKEND_REQ,
        set: BACKEND_REQ,
        unset: BACKEND_REQ,
    },
    HeaderFamily {
        prefix: "beresp.http.",
        get: FETCH,
        set: FETCH,
        unset: FETCH,
    },
    HeaderFamily {
        prefix: "obj.http.",
        get: CACHED_OBJ,
        set: ERROR,
        unset: ERROR,
    },
    HeaderFamily {
        prefix: "resp.http.",
        get: CLIENT_RESP,
        set: CLIENT_RESP,
        unset: CLIENT_RESP,
    },
];

/// Valid bucket windows for `ratecounter.<name>.bucket.<window>`.
pub const BUCKET_DURATIONS: &[&str] = &["10s", "20s", "30s", "40s", "50s", "60s"];

/// The predefined variable entries.
pub const VARIABLES: &[VariableEntry] = &[
    // ----- request -----
    fuzzy(read_write("req.backend", VclType::Backend, ALL, ALL)),
    fuzzy(read("req.backend.healthy", VclType::Bool, ALL)),
    fuzzy(read("req.backend.is_cluster", VclType::Bool, ALL)),
    fuzzy(read("req.backend.is_origin", VclType::Bool, ALL)),
    fuzzy(read("req.backend.is_shield", VclType::Bool, ALL)),
    read("req.body", VclType::String, RECV | HASH | HIT | MISS | PASS | ERROR),
    read("req.body.base64", VclType::String, RECV | HASH | HIT | MISS | PASS | ERROR),
    read("req.digest", VclType::String, ALL),
    read_write("req.enable_range_on_pass", VclType::Bool, RECV, RECV),
    read_write("req.enable_segmented_caching", VclType::Bool, RECV, RECV),
    read_write("req.esi", VclType::Bool, RECV | FETCH | DELIVER | ERROR, RECV | FETCH | DELIVER | ERROR),
    read("req.esi_level", VclType::Integer, ALL),
    read_write("req.hash", VclType::String, HASH, HASH),
    read_write("req.hash_always_miss", VclType::Bool, RECV, RECV),
    read_write("req.hash_ignore_busy", VclType::Bool, RECV, RECV),
    read("req.is_background_fetch", VclType::Bool, ALL),
    read("req.is_clustering", VclType::Bool, ALL),
    read("req.is_esi_subreq", VclType::Bool, ALL),
    fuzzy(read("req.is_ipv6", VclType::Bool, ALL)),
    read("req.is_purge", VclType::Bool, ALL),
    fuzzy(read("req.is_ssl", VclType::Bool, ALL)),
    read_write("req.max_stale_if_error", VclType::Rtime, ALL, ALL),
    read_write("req.max_stale_while_revalidate", VclType::Rtime, ALL, ALL),
    read_write("req.method", VclType::String, ALL, ALL),
    read("req.postbody", VclType::String, RECV | HASH | HIT | MISS | PASS | ERROR),
    read("req.proto", VclType::String, ALL),
    read("req.protocol", VclType::String, ALL),
    read_write("req.request", VclType::String, ALL, ALL),
    fuzzy(read("req.restarts", VclType::Integer, ALL)),
    read("req.topurl", VclType::String, ALL),
    read_write("req.url", VclType::String, ALL, ALL),
    read("req.url.basename", VclType::String, ALL),
    read("req.url.dirname", VclType::String, ALL),
    read("req.url.ext", VclType::String, ALL),
    read("req.url.path", VclType::String, ALL),
    read("req.url.qs", VclType::String, ALL),
    read("req.vcl", VclType::String, ALL),
    read("req.vcl.generation", VclType::Integer, ALL),
    read("req.vcl.version", VclType::Integer, ALL),
    read("req.xid", VclType::String, ALL),
    // ----- backend request -----
    read_write("bereq.between_bytes_timeout", VclType::Rtime, BACKEND_REQ, MISS | PASS),
    read_write("bereq.connect_timeout", VclType::Rtime, BACKEND_REQ, MISS | PASS),
    read_write("bereq.first_byte_timeout", VclType::Rtime, BACKEND_REQ, MISS | PASS),
    read_write("bereq.method", VclType::String, BACKEND_REQ, MISS | PASS),
    read_write("bereq.request", VclType::String, BACKEND_REQ, MISS | PASS),
    read_write("bereq.url", VclType::String, BACKEND_REQ, MISS | PASS),
    read("bereq.url.basename", VclType::String, BACKEND_REQ),
    read("bereq.url.dirname", VclType::String, BACKEND_REQ),
    read("bereq.url.ext", VclType::String, BACKEND_REQ),
    read("bereq.url.path", VclType::String, BACKEND_REQ),
    read("bereq.url.qs", VclType::String, BACKEND_REQ),
    // ----- backend response -----
    read("beresp.backend.ip", VclType::Ip, FETCH),
    read("beresp.backend.name", VclType::String, FETCH),
    fuzzy(read("beresp.backend.port", VclType::Integer, FETCH)),
    read_write("beresp.cacheable", VclType::Bool, FETCH, FETCH),
    read_write("beresp.do_esi", VclType::Bool, FETCH, FETCH),
    read_write("beresp.do_stream", VclType::Bool, FETCH, FETCH),
    read_write("beresp.grace", VclType::Rtime, FETCH, FETCH),
    read_write("beresp.gzip", VclType::Bool, FETCH, FETCH),
    read_write("beresp.hipaa", VclType::Bool, FETCH, FETCH),
    read_write("beresp.pci", VclType::Bool, FETCH, FETCH),
    read_write("beresp.response", VclType::String, FETCH, FETCH),
    read_write("beresp.saintmode", VclType::Rtime, FETCH, FETCH),
    read_write("beresp.stale_if_error", VclType::Rtime, FETCH, FETCH),
    read_write("beresp.stale_while_revalidate", VclType::Rtime, FETCH, FETCH),
    read_write("beresp.status", VclType::Integer, FETCH, FETCH),
    read_write("beresp.ttl", VclType::Rtime, FETCH, FETCH),
    read("beresp.used_alternate_path_to_origin", VclType::Bool, FETCH),
    // ----- cached object -----
    read("obj.age", VclType::Rtime, CACHED_OBJ),
    read("obj.cacheable", VclType::Bool, HIT),
    read("obj.entered", VclType::Rtime, HIT),
    read("obj.grace", VclType::Rtime, HIT),
    fuzzy(read("obj.hits", VclType::Integer, HIT | DELIVER)),
    read("obj.is_pci", VclType::Bool, HIT),
    read("obj.lastuse", VclType::Rtime, HIT),
    read_write("obj.response", VclType::String, ERROR, ERROR),
    read("obj.stale_if_error", VclType::Rtime, HIT),
    read("obj.stale_while_revalidate", VclType::Rtime, HIT),
    read_write("obj.status", VclType::Integer, HIT | ERROR, ERROR),
    read_write("obj.ttl", VclType::Rtime, HIT, HIT),
    // ----- client response -----
    read("resp.body_size", VclType::Integer, CLIENT_RESP),
    read("resp.bytes_written", VclType::Integer, LOG),
    read("resp.completed", VclType::Bool, LOG),
    read("resp.is_locally_generated", VclType::Bool, CLIENT_RESP),
    read_write("resp.proto", VclType::String, CLIENT_RESP, DELIVER),
    read_write("resp.response", VclType::String, CLIENT_RESP, DELIVER),
    read_write("resp.status", VclType::Integer, CLIENT_RESP, DELIVER),
    read("resp.stale", VclType::Bool, CLIENT_RESP),
    read("resp.stale.is_error", VclType::Bool, CLIENT_RESP),
    read("resp.stale.is_revalidating", VclType::Bool, CLIENT_RESP),
    // ----- client -----
    read("client.as.name", VclType::String, ALL),
    fuzzy(read("client.as.number", VclType::Integer, ALL)),
    read("client.bot.name", VclType::String, ALL),
    read("client.bot.score", VclType::Integer, ALL),
    read("client.browser.name", VclType::String, ALL),
    read("client.browser.version", VclType::String, ALL),
    fuzzy(read("client.class.bot", VclType::Bool, ALL)),
    fuzzy(read("client.class.browser", VclType::Bool, ALL)),
    read("client.display.height", VclType::Integer, ALL),
    read("client.display.width", VclType::Integer, ALL),
    read("client.geo.area_code", VclType::Integer, ALL),
    read("client.geo.city", VclType::String, ALL),
    read("client.geo.city.ascii", VclType::String, ALL),
    read("client.geo.city.latin1", VclType::String, ALL),
    read("client.geo.city.utf8", VclType::String, ALL),
    read("client.geo.conn_speed", VclType::String, ALL),
    read("client.geo.continent_code", VclType::String, ALL),
    read("client.geo.country_code", VclType::String, ALL),
    read("client.geo.country_code3", VclType::String, ALL),
    read("client.geo.country_name", VclType::String, ALL),
    read("client.geo.country_name.ascii", VclType::String, ALL),
    read("client.geo.country_name.latin1", VclType::String, ALL),
    read("client.geo.country_name.utf8", VclType::String, ALL),
    read_write("client.geo.ip_override", VclType::String, ALL, ALL),
    fuzzy(read("client.geo.latitude", VclType::Float, ALL)),
    fuzzy(read("client.geo.longitude", VclType::Float, ALL)),
    read("client.geo.metro_code", VclType::Integer, ALL),
    read("client.geo.postal_code", VclType::String, ALL),
    read("client.geo.region", VclType::String, ALL),
    read("client.identified", VclType::Bool, ALL),
    read_write("client.identity", VclType::String, ALL, ALL),
    fuzzy(read("client.ip", VclType::Ip, ALL)),
    read("client.os.name", VclType::String, ALL),
    read("client.os.version", VclType::String, ALL),
    read("client.platform.ereader", VclType::Bool, ALL),
    read("client.platform.gameconsole", VclType::Bool, ALL),
    read("client.platform.hwtype", VclType::String, ALL),
    fuzzy(read("client.platform.mobile", VclType::Bool, ALL)),
    read("client.platform.smarttv", VclType::Bool, ALL),
    read("client.platform.tablet", VclType::Bool, ALL),
    read("client.platform.tvplayer", VclType::Bool, ALL),
    fuzzy(read("client.port", VclType::Integer, ALL)),
    read("client.requests", VclType::Integer, ALL),
    read_write("client.socket.cwnd", VclType::Integer, ALL, ALL),
    read("client.socket.nexthop", VclType::Ip, ALL),
    read("client.socket.pace", VclType::Integer, ALL),
    fuzzy(read("client.socket.ploss", VclType::Float, ALL)),
    read("client.socket.tcpi_advmss", VclType::Integer, ALL),
    read("client.socket.tcpi_rcv_mss", VclType::Integer, ALL),
    read("client.socket.tcpi_rtt", VclType::Integer, ALL),
    read("client.socket.tcpi_rttvar", VclType::Integer, ALL),
    read("client.socket.tcpi_snd_cwnd", VclType::Integer, ALL),
    // ----- server -----
    read("server.datacenter", VclType::String, ALL),
    read("server.hostname", VclType::String, ALL),
    read("server.identity", VclType::String, ALL),
    fuzzy(read("server.ip", VclType::Ip, ALL)),
    fuzzy(read("server.port", VclType::Integer, ALL)),
    read("server.region", VclType::String, ALL),
    // ----- fastly -----
    read("fastly.error", VclType::String, ERROR),
    read("fastly.ff.visits_this_service", VclType::Integer, ALL),
    read("fastly_info.h2.fingerprint", VclType::String, ALL),
    read("fastly_info.h2.is_push", VclType::Bool, ALL),
    read("fastly_info.h2.stream_id", VclType::Integer, ALL),
    read("fastly_info.is_cluster_edge", VclType::Bool, ALL),
    read("fastly_info.is_cluster_shield", VclType::Bool, ALL),
    fuzzy(read("fastly_info.is_h2", VclType::Bool, ALL)),
    fuzzy(read("fastly_info.is_h3", VclType::Bool, ALL)),
    read("fastly_info.state", VclType::String, ALL),
    // ----- tls -----
    read("tls.client.cipher", VclType::String, ALL),
    read("tls.client.ciphers_list", VclType::String, ALL),
    read("tls.client.ciphers_sha", VclType::String, ALL),
    read("tls.client.ja3_md5", VclType::String, ALL),
    read("tls.client.protocol", VclType::String, ALL),
    read("tls.client.servername", VclType::String, ALL),
    read("tls.client.tlsexts_list", VclType::String, ALL),
    read("tls.client.tlsexts_sha", VclType::String, ALL),
    // ----- time -----
    fuzzy(read("now", VclType::Time, ALL)),
    read("now.sec", VclType::String, ALL),
    read("time.elapsed", VclType::Rtime, ALL),
    read("time.elapsed.msec", VclType::String, ALL),
    read("time.elapsed.sec", VclType::String, ALL),
    read("time.elapsed.usec", VclType::String, ALL),
    read("time.end", VclType::Time, CLIENT_RESP),
    read("time.end.msec", VclType::String, CLIENT_RESP),
    read("time.end.sec", VclType::String, CLIENT_RESP),
    read("time.start", VclType::Time, ALL),
    read("time.start.msec", VclType::String, ALL),
    read("time.start.sec", VclType::String, ALL),
    read("time.to_first_byte", VclType::Rtime, CLIENT_RESP),
    // ----- workspace & stale -----
    read("stale.exists", VclType::Bool, FETCH | ERROR | DELIVER),
    read("workspace.bytes_free", VclType::Integer, ALL),
    read("workspace.bytes_total", VclType::Integer, ALL),
    read("workspace.overflowed", VclType::Bool, ALL),
];
