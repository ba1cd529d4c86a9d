pub mod catalog;
pub mod config;
pub mod domain;
pub mod phase;
pub mod pricing;

pub use catalog::{CatalogError, MaterialCatalog, ServiceCatalog};
pub use config::{AppConfig, ConfigError, LoadOptions};
pub use domain::bid::{BidLine, NoMatchLine, PricedBid, PricedLine};
pub use domain::bom::BomItem;
pub use domain::matching::{MatchOutput, MatchRecommendation, SkuCandidate, NO_MATCH_SENTINEL};
pub use domain::strategy::{ItemStrategy, PricingStrategy};
pub use phase::{Phase, PhaseMachine, Step, Transition, Verdict, DEFAULT_MAX_RETRIES};
pub use pricing::{compute_bid, PricingInputs};
