pub mod attendance;
pub mod chatbot;
pub mod dashboard;
pub mod face;
pub mod leave_request;
pub mod master_data;
pub mod user;
