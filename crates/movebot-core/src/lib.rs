pub mod config;
pub mod error;
pub mod types;

pub use config::MovebotConfig;
pub use error::{MovebotError, Result};
pub use types::{
    BreakdownEntry, Button, ChannelCredentials, Estimate, Extra, GeoPoint, InputMediaItem,
    Language, LeadItem, Provider, ProviderEvent, RouteBand, RouteClassification, Stop, TimeWindow,
    VolumeCategory,
};
