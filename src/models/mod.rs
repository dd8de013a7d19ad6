pub mod appointment;
pub mod conversation;
pub mod extraction;

pub use appointment::{Appointment, AppointmentStatus, Draft, Field};
pub use conversation::{ConversationState, DialogueStage};
pub use extraction::{ExtractedFields, Intent, LocalExtraction, ModelExtraction};
