//! Economy: PE balances, key point income, upkeep and logistics costs
//!
//! Generals earn, commanders spend. Balances never go negative.

pub mod deployment;
pub mod key_points;
pub mod treasury;
pub mod upkeep;

pub use deployment::{deploy_pending, PendingDeployment};
pub use key_points::{collect_key_point_income, KeyPointIncome};
pub use treasury::Treasury;
pub use upkeep::{charge_upkeep, reinforce_cost, resupply_cost, UpkeepReport};
