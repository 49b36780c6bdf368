//! `HistoryStore` implementations: a JSON flat file and a database room.

pub mod json;
pub mod room;
