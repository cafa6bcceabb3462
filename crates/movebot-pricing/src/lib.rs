pub mod catalog;
pub mod estimate;
pub mod extract;
pub mod route;
pub mod volume;

pub use catalog::{Catalog, CatalogItem};
pub use estimate::{compute_estimate, complexity_score, EstimateInput};
pub use extract::extract_items;
pub use route::{classify_route, find_locality, Locality};
pub use volume::{has_room_descriptor, infer_volume, infer_volume_from_rooms};
