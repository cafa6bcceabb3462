pub mod crew;
pub mod labels;
pub mod operator;

pub use crew::CrewLeadView;
pub use operator::{format_operator_message, OperatorFormat};
