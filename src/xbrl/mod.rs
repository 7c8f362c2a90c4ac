pub mod context;
pub mod governance;
pub mod group;
pub mod index;
pub mod normalize;
pub mod period;
pub mod resolve;
