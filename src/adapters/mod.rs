pub mod messaging;
pub mod recommendation;
