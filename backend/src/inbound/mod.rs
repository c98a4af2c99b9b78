//! Inbound adapters translating HTTP requests into domain port calls.
//!
//! Framework details (actix extractors, cookie sessions, JSON shapes) stay in
//! [`http`]; handlers only talk to the driving ports held in
//! [`http::state::HttpState`].

pub mod http;
