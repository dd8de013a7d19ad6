use crate::config::AppConfig;
use crate::db::AppointmentStore;
use crate::services::ai::LlmProvider;
use crate::services::session::SessionStore;

pub struct AppState {
    pub config: AppConfig,
    pub llm: Box<dyn LlmProvider>,
    pub sessions: Box<dyn SessionStore>,
    pub appointments: Box<dyn AppointmentStore>,
}
