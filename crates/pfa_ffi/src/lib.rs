//! Flutter-facing bindings for `pfa_core`.

pub mod api;
