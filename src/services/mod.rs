pub mod ai;
pub mod conversation;
pub mod extractor;
pub mod merge;
pub mod normalize;
pub mod policy;
pub mod session;
pub mod validation;
