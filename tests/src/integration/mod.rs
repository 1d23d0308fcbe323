//! Integration flows, one module per concern.

pub mod account_flows;
pub mod category_flows;
pub mod group_flows;
pub mod session_flows;
