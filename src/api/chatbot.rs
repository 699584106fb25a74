use crate::auth::auth::AuthUser;
use crate::services::openrouter::ChatClient;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ChatbotReq {
    #[schema(example = "How is my attendance percentage calculated?")]
    pub question: String,
}

/// Ask the AttendEase assistant
#[utoipa::path(
    post,
    path = "/api/v1/chatbot",
    request_body = ChatbotReq,
    responses(
        (status = 200, description = "Assistant answer"),
        (status = 400, description = "Empty question"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Assistant unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Chatbot"
)]
pub async fn ask(
    auth: AuthUser,
    chat: web::Data<ChatClient>,
    payload: web::Json<ChatbotReq>,
) -> actix_web::Result<impl Responder> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "A question is required"
        })));
    }

    match chat.ask(question).await {
        Ok(answer) => Ok(HttpResponse::Ok().json(serde_json::json!({ "answer": answer }))),
        Err(e) => {
            error!(error = %e, user_id = auth.user_id, "Chatbot request failed");
            Ok(HttpResponse::BadGateway().json(serde_json::json!({
                "message": "Assistant is unavailable right now"
            })))
        }
    }
}
